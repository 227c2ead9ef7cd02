pub mod account_service;
pub mod password_service;
pub mod sweet_service;
