//! Error types for the Xulambis server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::lending::LoanRuleViolation;

/// Stable error codes exposed to API clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    NotAuthorized = 2,
    DbFailure = 3,
    NoSuchRecord = 4,
    BadValue = 5,
    Duplicate = 6,
    DateInPast = 7,
    DateTooFarFuture = 8,
    InstanceUnavailable = 9,
    InstanceNotBorrowed = 10,
    BorrowLimitExceeded = 11,
    OverdueLimitExceeded = 12,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {message}")]
    Validation {
        /// Field the error is attached to, when it concerns a single field
        field: Option<&'static str>,
        message: String,
    },

    #[error("Conflict: {message}")]
    Conflict {
        field: Option<&'static str>,
        message: String,
    },

    #[error(transparent)]
    LoanRule(#[from] LoanRuleViolation),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Validation error attached to the operation as a whole
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation { field: None, message: message.into() }
    }

    /// Validation error attached to a single field
    pub fn field_validation(field: &'static str, message: impl Into<String>) -> Self {
        AppError::Validation { field: Some(field), message: message.into() }
    }

    /// Uniqueness conflict attached to a single field
    pub fn duplicate(field: &'static str, message: impl Into<String>) -> Self {
        AppError::Conflict { field: Some(field), message: message.into() }
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
    /// Present when the error concerns a single form field (e.g. `due_back`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, field, message) = match &self {
            AppError::Authentication(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthorized, None, msg.clone())
            }
            AppError::Authorization(msg) => {
                (StatusCode::FORBIDDEN, ErrorCode::NotAuthorized, None, msg.clone())
            }
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, ErrorCode::NoSuchRecord, None, msg.clone())
            }
            AppError::Validation { field, message } => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, *field, message.clone())
            }
            AppError::Conflict { field, message } => {
                (StatusCode::CONFLICT, ErrorCode::Duplicate, *field, message.clone())
            }
            AppError::LoanRule(violation) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                violation.code(),
                violation.field(),
                violation.to_string(),
            ),
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DbFailure,
                    None,
                    "Database error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    None,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
            field,
        });

        (status, body).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        // Surface the first field error; clients fix one form field at a time
        match errors.field_errors().into_iter().next() {
            Some((field, errs)) => {
                let message = errs
                    .first()
                    .and_then(|e| e.message.as_ref())
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for {}", field));
                AppError::Validation { field: Some(field), message }
            }
            None => AppError::validation("Invalid input"),
        }
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_mapping() {
        let cases = [
            (AppError::Authentication("bad token".into()), StatusCode::UNAUTHORIZED),
            (AppError::Authorization("not allowed".into()), StatusCode::FORBIDDEN),
            (AppError::NotFound("no such row".into()), StatusCode::NOT_FOUND),
            (AppError::validation("bad input"), StatusCode::BAD_REQUEST),
            (AppError::duplicate("isbn", "taken"), StatusCode::CONFLICT),
            (AppError::Database(sqlx::Error::RowNotFound), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn test_loan_rule_violations_map_to_unprocessable() {
        for violation in [
            LoanRuleViolation::DateInPast,
            LoanRuleViolation::DateTooFarFuture,
            LoanRuleViolation::InstanceUnavailable,
            LoanRuleViolation::InstanceNotBorrowed,
            LoanRuleViolation::BorrowLimitExceeded,
            LoanRuleViolation::OverdueLimitExceeded,
        ] {
            let response = AppError::from(violation).into_response();
            assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        }
    }

    #[test]
    fn test_validator_errors_become_field_validation() {
        let mut error = validator::ValidationError::new("length");
        error.message = Some("Username is required".into());
        let mut errors = validator::ValidationErrors::new();
        errors.add("username", error);

        match AppError::from(errors) {
            AppError::Validation { field, message } => {
                assert_eq!(field, Some("username"));
                assert_eq!(message, "Username is required");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
