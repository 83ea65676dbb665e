use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::auth::PasswordError;
use crate::repositories::RepositoryError;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("All fields must be filled")]
    MissingFields,
    #[error("Malformed request body: {0}")]
    MalformedBody(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Email already in use")]
    EmailAlreadyExists,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Missing authorization header")]
    MissingAuthHeader,
    #[error("Invalid authorization header format")]
    InvalidAuthHeaderFormat,
    #[error("Password validation failed: {0}")]
    PasswordValidation(PasswordError),
    #[error("Email validation failed: {0}")]
    EmailValidation(String),
    #[error("Password hashing error: {0}")]
    PasswordHashing(PasswordError),
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("Storage error: {0}")]
    Repository(#[from] RepositoryError),
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    /// Whether this error means the caller failed to prove an identity.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidToken
                | AuthError::TokenExpired
                | AuthError::MissingAuthHeader
                | AuthError::InvalidAuthHeaderFormat
        )
    }
}

impl From<JsonRejection> for AuthError {
    fn from(rejection: JsonRejection) -> Self {
        AuthError::MalformedBody(rejection.body_text())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AuthError::MissingFields => (StatusCode::BAD_REQUEST, "Missing fields"),
            AuthError::MalformedBody(_) => (StatusCode::BAD_REQUEST, "Malformed request body"),
            AuthError::InvalidCredentials => (StatusCode::BAD_REQUEST, "Invalid credentials"),
            AuthError::EmailAlreadyExists => (StatusCode::BAD_REQUEST, "Email already in use"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token"),
            AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "Token expired"),
            AuthError::MissingAuthHeader => (StatusCode::UNAUTHORIZED, "Missing authorization header"),
            AuthError::InvalidAuthHeaderFormat => (StatusCode::UNAUTHORIZED, "Invalid authorization header format"),
            AuthError::PasswordValidation(_) => (StatusCode::BAD_REQUEST, "Password validation failed"),
            AuthError::EmailValidation(_) => (StatusCode::BAD_REQUEST, "Email validation failed"),
            AuthError::PasswordHashing(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Password processing error"),
            AuthError::Jwt(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Token error"),
            AuthError::Repository(_) => (StatusCode::SERVICE_UNAVAILABLE, "Storage unavailable"),
            AuthError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "authentication request failed");
        }

        let body = Json(json!({
            "error": error_message,
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}
