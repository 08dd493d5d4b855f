//! Error taxonomy for the authentication service
//!
//! Every rejection surfaces through the uniform envelope. The login path is
//! deliberately generic: unknown usernames and wrong passwords produce the
//! same `InvalidCredentials` response, and every token defect collapses into
//! `Unauthorized`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use common::envelope::ErrorBody;

/// Authentication service errors
#[derive(Error, Debug)]
pub enum AuthServiceError {
    /// Bad username or password; never reveals which
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Missing, malformed, expired, or forged token
    #[error("Unauthorized")]
    Unauthorized,

    /// Valid identity, insufficient role or permissions
    #[error("Insufficient permissions")]
    Forbidden { missing: Vec<String> },

    /// Login attempt limit exceeded
    #[error("Too many login attempts")]
    TooManyAttempts,

    /// Requested resource does not exist
    #[error("{0}")]
    NotFound(String),

    /// Request payload failed validation
    #[error("Validation failed")]
    Validation(Vec<String>),

    /// Internal server error; detail is logged, never echoed
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AuthServiceError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AuthServiceError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorBody::new("Invalid credentials"),
            ),
            AuthServiceError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, ErrorBody::new("Unauthorized"))
            }
            AuthServiceError::Forbidden { missing } => (
                StatusCode::FORBIDDEN,
                ErrorBody::with_errors("Insufficient permissions", missing),
            ),
            AuthServiceError::TooManyAttempts => (
                StatusCode::TOO_MANY_REQUESTS,
                ErrorBody::new("Too many login attempts, try again later"),
            ),
            AuthServiceError::NotFound(message) => (StatusCode::NOT_FOUND, ErrorBody::new(message)),
            AuthServiceError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                ErrorBody::with_errors("Validation failed", errors),
            ),
            AuthServiceError::Internal(e) => {
                error!("Internal error: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new("Internal server error"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
