//! Cross-cutting HTTP concerns.

mod error;

pub use error::{AppError, AppResult};
