//! Domain-level error types.

use thiserror::Error;

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),
}

/// Mail dispatch errors.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("Invalid mail configuration: {0}")]
    Config(String),

    #[error("Mail transport failed: {0}")]
    Transport(String),
}
