use crate::services::{
    bucket_list_service::ServiceError, identity_store::IdentityError,
    persistence::PersistenceError, record_repository::RepositoryError,
};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// A lightweight wrapper for general errors that keeps the message local.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// Shortcut for 404 Not Found
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    /// Shortcut for 400 Bad Request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    /// Shortcut for 401 Unauthorized
    pub fn unauthenticated() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Please log in to continue")
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
            "status": self.status.as_u16()
        }));

        (self.status, body).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::BucketNotFound(_) => AppError::not_found(err.to_string()),
            RepositoryError::MissingField(_) => AppError::bad_request(err.to_string()),
            RepositoryError::LockPoisoned(_) => {
                tracing::error!("{}", err);
                AppError::internal(err.to_string())
            }
        }
    }
}

impl From<IdentityError> for AppError {
    fn from(err: IdentityError) -> Self {
        let status = match err {
            IdentityError::IdentifierTooShort | IdentityError::PasswordTooShort => {
                StatusCode::BAD_REQUEST
            }
            IdentityError::AlreadyExists => StatusCode::CONFLICT,
            IdentityError::UnknownAccount => StatusCode::NOT_FOUND,
            IdentityError::IncorrectPassword => StatusCode::UNAUTHORIZED,
            IdentityError::LockPoisoned(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        AppError::new(status, err.to_string())
    }
}

impl From<PersistenceError> for AppError {
    fn from(err: PersistenceError) -> Self {
        AppError::internal(err.to_string())
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Repository(err) => err.into(),
            ServiceError::Identity(err) => err.into(),
            ServiceError::Persistence(err) => err.into(),
        }
    }
}
