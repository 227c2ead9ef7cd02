pub mod sweet_queries;
pub mod user_queries;
