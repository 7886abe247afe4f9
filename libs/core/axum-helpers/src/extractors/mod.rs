//! Custom extractors for Axum handlers.
//!
//! Each one routes its rejection through [`AppError`](crate::errors::AppError)
//! so malformed input gets the same problem payload as every other failure.

pub mod json;
pub mod query;
pub mod uuid_path;

pub use json::JsonBody;
pub use query::QueryParams;
pub use uuid_path::UuidPath;
