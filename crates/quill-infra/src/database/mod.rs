//! Database access: connection management and repository implementations.

mod connections;
pub mod memory;

#[cfg(feature = "postgres")]
pub mod entity;

#[cfg(feature = "postgres")]
mod postgres_repo;

pub use connections::DatabaseConfig;
pub use memory::InMemoryBlog;

#[cfg(feature = "postgres")]
pub use connections::connect;

#[cfg(feature = "postgres")]
pub use postgres_repo::{
    PostgresCommentRepository, PostgresPostRepository, PostgresTagRepository,
};
