use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::error;

mod allocator;
mod api;
mod app;
pub mod asset;
pub mod auth;
mod community;
mod donation;
mod event;
pub mod form;
mod gallery;
pub mod kinds;
mod prashad;
pub mod record;
mod service;
pub mod setting;

pub use {app::*, service::*};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    DbErr(#[from] sea_orm::DbErr),
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Multipart(String),
    #[error(transparent)]
    Auth(#[from] auth::AuthError),
    #[error("{0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Duplicate(String),
    #[error("{0}")]
    InvalidTransition(String),
    #[error("{0}")]
    Rejected(String),
    #[error("{0}")]
    Message(String),
    #[error("{0}")]
    Str(&'static str),
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_)
            | Error::Duplicate(_)
            | Error::InvalidTransition(_)
            | Error::Rejected(_)
            | Error::Multipart(_)
            | Error::Json(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Auth(auth::AuthError::Forbidden) => StatusCode::FORBIDDEN,
            Error::Auth(_) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Creates full response for error.
    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = self.to_string(), "request failed");
            HttpResponse::build(status).json(json!({
                "success": false,
                "message": "Internal server error",
                "error": self.to_string()
            }))
        } else {
            HttpResponse::build(status).json(json!({
                "success": false,
                "message": self.to_string()
            }))
        }
    }
}

// MultipartError is not Send, keep only its message
impl From<actix_multipart::MultipartError> for Error {
    fn from(err: actix_multipart::MultipartError) -> Self {
        Error::Multipart(err.to_string())
    }
}

pub type Result<T, E = Error> = core::result::Result<T, E>;

pub fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
