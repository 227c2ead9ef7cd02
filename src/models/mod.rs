pub mod document;
mod requests;
mod sweet;
mod user;

pub use document::{CollectionMapping, Document, FieldMapping};
pub use requests::*;
pub use sweet::*;
pub use user::*;
