//! Error taxonomy shared by every component and its HTTP rendering.

use axum::{
    Json,
    extract::rejection::{FormRejection, JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Coarse classification of an [`ApiError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Auth,
    Conflict,
    RateLimited,
    NotFound,
    Internal,
}

#[derive(Debug, Error)]
pub enum ApiError {
    // Validation
    #[error("The request could not be understood: {0}")]
    MalformedRequest(String),
    #[error("Your confirmation must match your password")]
    PasswordMismatch,
    #[error("The password you've selected is too short")]
    PasswordTooShort,
    #[error("Your username must be between {min} and {max} characters")]
    UsernameLength { min: usize, max: usize },
    #[error("Please provide a real email address")]
    InvalidEmail,
    #[error("This motto is too long")]
    MottoTooLong,

    // Auth
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Client authentication failed")]
    InvalidClient,
    #[error("Only the password grant is supported")]
    UnsupportedGrantType,
    #[error("Missing bearer token")]
    MissingToken,
    #[error("The access token is invalid or has expired")]
    InvalidToken,

    // Conflict
    #[error("The username you've chosen has been taken")]
    UsernameTaken,
    #[error("The email you've chosen has been taken")]
    EmailTaken,
    #[error("Too many accounts, try again soon!")]
    TooManyAccounts,

    #[error("You're doing too much, slow down!")]
    RateLimited,

    #[error("The requested resource couldn't be found")]
    NotFound,

    #[error("Something went wrong")]
    Internal,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::MalformedRequest(_)
            | ApiError::PasswordMismatch
            | ApiError::PasswordTooShort
            | ApiError::UsernameLength { .. }
            | ApiError::InvalidEmail
            | ApiError::MottoTooLong => ErrorKind::Validation,
            ApiError::InvalidCredentials
            | ApiError::InvalidClient
            | ApiError::UnsupportedGrantType
            | ApiError::MissingToken
            | ApiError::InvalidToken => ErrorKind::Auth,
            ApiError::UsernameTaken | ApiError::EmailTaken | ApiError::TooManyAccounts => {
                ErrorKind::Conflict
            }
            ApiError::RateLimited => ErrorKind::RateLimited,
            ApiError::NotFound => ErrorKind::NotFound,
            ApiError::Internal => ErrorKind::Internal,
        }
    }

    /// Stable machine-readable code rendered in the `error` field.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::MalformedRequest(_) => "invalid_request",
            ApiError::PasswordMismatch => "password_mismatch",
            ApiError::PasswordTooShort => "password_too_short",
            ApiError::UsernameLength { .. } => "invalid_username",
            ApiError::InvalidEmail => "invalid_email",
            ApiError::MottoTooLong => "motto_too_long",
            ApiError::InvalidCredentials => "invalid_credentials",
            ApiError::InvalidClient => "invalid_client",
            ApiError::UnsupportedGrantType => "unsupported_grant_type",
            ApiError::MissingToken => "missing_token",
            ApiError::InvalidToken => "invalid_token",
            ApiError::UsernameTaken => "username_taken",
            ApiError::EmailTaken => "email_taken",
            ApiError::TooManyAccounts => "too_many_accounts",
            ApiError::RateLimited => "rate_limited",
            ApiError::NotFound => "not_found",
            ApiError::Internal => "server_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match (self.kind(), self) {
            (_, ApiError::MalformedRequest(_) | ApiError::UnsupportedGrantType) => {
                StatusCode::BAD_REQUEST
            }
            (ErrorKind::Validation | ErrorKind::Conflict, _) => StatusCode::FORBIDDEN,
            (ErrorKind::Auth, _) => StatusCode::UNAUTHORIZED,
            (ErrorKind::RateLimited, _) => StatusCode::TOO_MANY_REQUESTS,
            (ErrorKind::NotFound, _) => StatusCode::NOT_FOUND,
            (ErrorKind::Internal, _) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Translate a failed player insert or update into the conflict the
    /// advisory pre-check would have reported. The unique index is the
    /// authoritative uniqueness check.
    pub fn from_write(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                unique_conflict(&detail).unwrap_or_else(|| err.into())
            }
            _ => err.into(),
        }
    }
}

/// Map a unique violation message onto the taken-field error.
///
/// Only the constraint name is inspected. MySQL echoes the rejected value
/// ahead of the key (`Duplicate entry 'emailfan' for key 'player.username'`),
/// Postgres names the constraint (`player_email_key`) and SQLite the column
/// (`player.email`).
fn unique_conflict(detail: &str) -> Option<ApiError> {
    let key = detail.rsplit_once(" for key ").map_or(detail, |(_, key)| key);
    if key.contains("email") {
        Some(ApiError::EmailTaken)
    } else if key.contains("username") {
        Some(ApiError::UsernameTaken)
    } else {
        None
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        tracing::error!(error = %err, "Database error");
        ApiError::Internal
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::MalformedRequest(rejection.body_text())
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        ApiError::MalformedRequest(rejection.body_text())
    }
}

/// JSON body of every error response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g. `invalid_token`, `rate_limited`)
    pub error: String,
    /// Human-readable message
    pub response_text: String,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        Self {
            error: err.code().to_string(),
            response_text: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorResponse::from(&self))).into_response()
    }
}
