//! Database models and schema

pub mod document;
pub mod init;
pub mod models;

pub use document::*;
pub use init::*;
pub use models::*;
