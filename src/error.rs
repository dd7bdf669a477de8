//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Each variant is one outcome a caller can observe. Several deliberately collapse
//! distinct internal causes into a single outcome:
//!
//! - `InvalidCredentials` covers both "unknown email" and "wrong password".
//! - `Unauthenticated` covers a missing header, a malformed header, a forged,
//!   expired or not-yet-valid token.
//! - `NotFound` covers both "no such id" and "owned by somebody else".
//!
//! `AppError` implements `actix_web::error::ResponseError` so handlers can return it
//! directly; bodies are rendered through the envelope in `crate::response`.
//! `Internal` details are logged server-side and never echoed to the client.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::fmt;
use validator::ValidationErrors;

use crate::response::ApiResponse;
use crate::store::StoreError;

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Input failed validation (HTTP 422). Carries field-level detail.
    ValidationFailed(ValidationErrors),
    /// The request could not be decoded at all (HTTP 400).
    BadRequest(String),
    /// Registration with an email that is already taken (HTTP 409).
    EmailTaken,
    /// Login failed, for whatever reason (HTTP 401).
    InvalidCredentials,
    /// Missing or invalid bearer token (HTTP 401).
    Unauthenticated,
    /// The named resource does not exist for this caller (HTTP 404).
    NotFound(&'static str),
    /// Persistence, hashing or token encoding failure (HTTP 500).
    Internal(String),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationFailed(_) => "VALIDATION_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::EmailTaken => "CONFLICT",
            AppError::InvalidCredentials | AppError::Unauthenticated => "UNAUTHORIZED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// The message shown to clients. `Internal` detail is withheld.
    fn public_message(&self) -> String {
        match self {
            AppError::ValidationFailed(_) => "Validation failed".into(),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::EmailTaken => "Email already registered".into(),
            AppError::InvalidCredentials => "Invalid email or password".into(),
            AppError::Unauthenticated => "Invalid or missing authentication token".into(),
            AppError::NotFound(resource) => format!("{} not found", resource),
            AppError::Internal(_) => "An internal error occurred".into(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::ValidationFailed(errors) => write!(f, "Validation Error: {}", errors),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::EmailTaken => write!(f, "Conflict: email already registered"),
            AppError::InvalidCredentials => write!(f, "Unauthorized: invalid credentials"),
            AppError::Unauthenticated => write!(f, "Unauthorized: unauthenticated"),
            AppError::NotFound(resource) => write!(f, "Not Found: {}", resource),
            AppError::Internal(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Converts `AppError` variants into enveloped `HttpResponse` objects.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::EmailTaken => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::Internal(detail) = self {
            log::error!("internal error: {}", detail);
        }

        let details = match self {
            AppError::ValidationFailed(errors) => serde_json::to_value(errors).ok(),
            _ => None,
        };

        HttpResponse::build(self.status_code()).json(ApiResponse::failure(
            self.code(),
            self.public_message(),
            details,
        ))
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> AppError {
        AppError::ValidationFailed(errors)
    }
}

/// Store failures surface as `Internal`, except a unique-email violation, which
/// the only writer of that index (registration) reports as `EmailTaken`.
impl From<StoreError> for AppError {
    fn from(error: StoreError) -> AppError {
        match error {
            StoreError::UniqueViolation(_) => AppError::EmailTaken,
            StoreError::Database(msg) => AppError::Internal(format!("database: {}", msg)),
        }
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::Internal(format!("password hashing: {}", error))
    }
}
