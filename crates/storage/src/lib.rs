//! Storage Layer
//!
//! SQLite persistence (via sqlx) for the append-only reading logs and the
//! alert log, using a repository over a shared connection pool.

mod repository;
mod rows;
mod schema;

pub use repository::{RecordCounts, Repository};

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("Record not found")]
    NotFound,
    #[error("Invalid stored value in {column}: {value}")]
    InvalidValue { column: &'static str, value: String },
}
