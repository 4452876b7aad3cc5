//! Error handling - maps application errors to HTML error pages.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use quill_core::error::{MailError, RepoError};

/// Application-level error type rendered as a plain HTML error page.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (title, detail) = match self {
            AppError::NotFound(detail) => ("Page not found", detail.clone()),
            AppError::BadRequest(detail) => ("Bad request", detail.clone()),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                ("Server error", "Something went wrong.".to_string())
            }
        };

        HttpResponse::build(self.status_code())
            .content_type("text/html; charset=utf-8")
            .body(format!(
                "<!DOCTYPE html><html><body><h1>{title}</h1><p>{detail}</p></body></html>"
            ))
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Connection(msg) => {
                tracing::error!("Database connection error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
            RepoError::Query(msg) => {
                tracing::error!("Database query error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
        }
    }
}

impl From<MailError> for AppError {
    fn from(err: MailError) -> Self {
        tracing::error!("Mail delivery failed: {}", err);
        AppError::Internal("Mail delivery failed".to_string())
    }
}

impl From<tera::Error> for AppError {
    fn from(err: tera::Error) -> Self {
        AppError::Internal(format!("Template error: {err}"))
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
