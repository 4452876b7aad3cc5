//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`.
//! This crate contains the database repositories and mail backends.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external services, in-memory only
//! - `postgres` - PostgreSQL repositories via SeaORM
//! - `smtp` - SMTP mail delivery via lettre

pub mod database;
pub mod mail;

// Re-exports - In-Memory
pub use database::InMemoryBlog;
pub use mail::{ConsoleMailer, InMemoryMailer};

// Re-exports - Postgres
#[cfg(feature = "postgres")]
pub use database::{
    PostgresCommentRepository, PostgresPostRepository, PostgresTagRepository,
};

#[cfg(feature = "smtp")]
pub use mail::{SmtpConfig, SmtpMailer};
