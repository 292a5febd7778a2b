//! Error types for the CrimeWatch store
//!
//! All errors use thiserror for structured error handling. These only
//! travel between the persistence backends and the store adapter; the
//! public store API degrades them to empty results or boolean statuses.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
