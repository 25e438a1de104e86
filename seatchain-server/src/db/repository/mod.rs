//! Repository Module
//!
//! Free async functions over `&SqlitePool`, one module per table.
//! Status transitions are single `UPDATE ... WHERE status = ...` statements
//! (compare-and-set); the affected-row count tells the caller whether it won
//! the transition. Nothing here talks to an external system.

pub mod application;
pub mod certificate;
pub mod event;
pub mod payment;
pub mod ticket;
pub mod user;

use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err
            && db_err.is_unique_violation()
        {
            return RepoError::Duplicate(db_err.message().to_string());
        }
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
