//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Every failure a request can run into is one tagged variant, so call sites match on the
//! kind of error rather than on its message.
//!
//! `AppError` implements `actix_web::error::ResponseError` to turn application errors into
//! HTTP responses with JSON bodies. Client errors (validation, credentials, tokens) carry
//! their message to the caller. Persistence and internal failures are logged with their
//! detail and answered with a generic message.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use thiserror::Error;
use validator::ValidationErrors;

use crate::auth::token::TokenError;
use crate::repository::RepositoryError;

/// The specific rule a client request broke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationReason {
    /// No request payload was supplied at all.
    RequestNil,
    EmailRequired,
    EmailInvalidFormat,
    PasswordRequired,
    /// Fewer than 8 code points.
    PasswordTooShort,
    /// More than 128 code points.
    PasswordTooLong,
    RefreshTokenRequired,
    /// An identifier of `0` was supplied.
    InvalidId,
    /// A field rule on a todo payload, carrying the validator's message.
    Invalid(String),
}

impl ValidationReason {
    /// Stable machine-readable code for the reason.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationReason::RequestNil => "request-nil",
            ValidationReason::EmailRequired => "email-required",
            ValidationReason::EmailInvalidFormat => "email-invalid-format",
            ValidationReason::PasswordRequired => "password-required",
            ValidationReason::PasswordTooShort => "password-too-short",
            ValidationReason::PasswordTooLong => "password-too-long",
            ValidationReason::RefreshTokenRequired => "refresh-token-required",
            ValidationReason::InvalidId => "invalid-id",
            ValidationReason::Invalid(_) => "invalid-field",
        }
    }
}

impl fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ValidationReason::RequestNil => write!(f, "request body is required"),
            ValidationReason::EmailRequired => write!(f, "email is required"),
            ValidationReason::EmailInvalidFormat => write!(f, "invalid email format"),
            ValidationReason::PasswordRequired => write!(f, "password is required"),
            ValidationReason::PasswordTooShort => {
                write!(f, "password must be at least 8 characters long")
            }
            ValidationReason::PasswordTooLong => {
                write!(f, "password must be at most 128 characters long")
            }
            ValidationReason::RefreshTokenRequired => write!(f, "refresh token is required"),
            ValidationReason::InvalidId => write!(f, "invalid id"),
            ValidationReason::Invalid(msg) => write!(f, "{}", msg),
        }
    }
}

/// Represents all possible errors that can occur within the application.
#[derive(Debug, Error)]
pub enum AppError {
    /// Client input was malformed or outside policy (HTTP 400).
    #[error("Validation Error: {0}")]
    Validation(ValidationReason),
    /// The request body could not be decoded (HTTP 400).
    #[error("Bad Request: {0}")]
    BadRequest(String),
    /// Login failed. Deliberately the same for an unknown email and a wrong password (HTTP 401).
    #[error("invalid email or password")]
    InvalidCredentials,
    /// Any refresh-token validation failure, collapsed into one kind (HTTP 401).
    #[error("invalid or expired refresh token")]
    InvalidOrExpiredRefreshToken,
    /// Authentication is required or the access token was rejected (HTTP 401).
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    /// The API key gate refused the request (HTTP 403).
    #[error("Forbidden: {0}")]
    Forbidden(String),
    /// The requested resource does not exist for this caller (HTTP 404).
    #[error("Not Found: {0}")]
    NotFound(String),
    /// The storage collaborator failed (HTTP 500, detail is never sent to the client).
    #[error("Persistence Error: {0}")]
    Persistence(String),
    /// Startup configuration is missing or invalid. Fatal, never served.
    #[error("Configuration Error: {0}")]
    Configuration(String),
    /// Hashing, signing, or any other unexpected server-side failure (HTTP 500).
    #[error("Internal Server Error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials
            | AppError::InvalidOrExpiredRefreshToken
            | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Persistence(_) | AppError::Configuration(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = match self {
            AppError::Validation(reason) => json!({
                "error": reason.to_string(),
                "reason": reason.code(),
            }),
            AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg) => json!({ "error": msg }),
            AppError::InvalidCredentials | AppError::InvalidOrExpiredRefreshToken => {
                json!({ "error": self.to_string() })
            }
            AppError::Persistence(_) | AppError::Configuration(_) | AppError::Internal(_) => {
                log::error!("{}", self);
                json!({ "error": "Internal server error" })
            }
        };
        HttpResponse::build(status).json(body)
    }
}

/// `sqlx::Error::RowNotFound` becomes `NotFound`, everything else is a persistence failure.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => AppError::Persistence(error.to_string()),
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(error: RepositoryError) -> AppError {
        match error {
            RepositoryError::NotFound => AppError::NotFound("Record not found".into()),
            RepositoryError::DuplicateEmail => {
                AppError::Persistence("email already registered".into())
            }
            RepositoryError::Storage(msg) => AppError::Persistence(msg),
        }
    }
}

/// Field rule violations on todo payloads keep the validator's message.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::Validation(ValidationReason::Invalid(error.to_string()))
    }
}

/// A rejected token only ever tells the client that it was rejected.
impl From<TokenError> for AppError {
    fn from(error: TokenError) -> AppError {
        match error {
            TokenError::Signing(msg) => AppError::Internal(format!("token signing failed: {}", msg)),
            _ => AppError::Unauthorized("Invalid or expired token".into()),
        }
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::Internal(error.to_string())
    }
}
