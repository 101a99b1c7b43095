//! Error types for MangaForge services
//!
//! Provides a comprehensive error handling system with:
//! - Distinct error types for different failure modes
//! - HTTP status code mapping
//! - Structured error responses
//! - Error codes for client handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (1xxx)
    ValidationError,
    MissingField,
    InvalidFormat,
    PayloadTooLarge,

    // Authentication errors (2xxx)
    Unauthorized,
    InvalidToken,
    ExpiredToken,
    InvalidCredentials,

    // Authorization errors (3xxx)
    Forbidden,

    // Resource errors (4xxx)
    NotFound,
    MangaNotFound,
    ChapterNotFound,
    UserNotFound,

    // Conflict errors (5xxx)
    Conflict,
    DuplicateChapterNumber,
    DuplicateEmail,
    InvalidStateTransition,

    // Rate limiting (6xxx)
    RateLimited,

    // Database errors (7xxx)
    DatabaseError,
    ConnectionError,

    // Storage errors (8xxx)
    StorageError,

    // Internal errors (9xxx)
    InternalError,
    ConfigurationError,
    SerializationError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            // Validation (1xxx)
            ErrorCode::ValidationError => 1001,
            ErrorCode::MissingField => 1002,
            ErrorCode::InvalidFormat => 1003,
            ErrorCode::PayloadTooLarge => 1004,

            // Auth (2xxx)
            ErrorCode::Unauthorized => 2001,
            ErrorCode::InvalidToken => 2002,
            ErrorCode::ExpiredToken => 2003,
            ErrorCode::InvalidCredentials => 2004,

            // Authz (3xxx)
            ErrorCode::Forbidden => 3001,

            // Resources (4xxx)
            ErrorCode::NotFound => 4001,
            ErrorCode::MangaNotFound => 4002,
            ErrorCode::ChapterNotFound => 4003,
            ErrorCode::UserNotFound => 4004,

            // Conflicts (5xxx)
            ErrorCode::Conflict => 5001,
            ErrorCode::DuplicateChapterNumber => 5002,
            ErrorCode::DuplicateEmail => 5003,
            ErrorCode::InvalidStateTransition => 5004,

            // Rate limits (6xxx)
            ErrorCode::RateLimited => 6001,

            // Database (7xxx)
            ErrorCode::DatabaseError => 7001,
            ErrorCode::ConnectionError => 7002,

            // Storage (8xxx)
            ErrorCode::StorageError => 8001,

            // Internal (9xxx)
            ErrorCode::InternalError => 9001,
            ErrorCode::ConfigurationError => 9002,
            ErrorCode::SerializationError => 9003,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("Required field missing: {field}")]
    MissingField { field: String },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    // Authentication errors
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    ExpiredToken,

    #[error("Invalid email or password")]
    InvalidCredentials,

    // Authorization errors
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    // Resource errors
    #[error("Resource not found: {resource_type} '{id}'")]
    NotFound { resource_type: String, id: String },

    #[error("Manga not found: {slug}")]
    MangaNotFound { slug: String },

    #[error("Chapter not found: {id}")]
    ChapterNotFound { id: String },

    #[error("User not found: {id}")]
    UserNotFound { id: String },

    // Conflict errors
    #[error("Duplicate resource: {message}")]
    Duplicate { message: String },

    #[error("Chapter with number {number} already exists for this manga")]
    DuplicateChapterNumber { number: String },

    #[error("Email already registered: {email}")]
    DuplicateEmail { email: String },

    #[error("Invalid state transition: {message}")]
    InvalidStateTransition { message: String },

    // Rate limiting
    #[error("Rate limit exceeded")]
    RateLimited,

    // Database errors
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Database connection error: {message}")]
    DatabaseConnection { message: String },

    // Storage errors
    #[error("Storage error: {message}")]
    Storage { message: String },

    // Internal errors
    #[error("Internal server error: {message}")]
    Internal { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { .. } => ErrorCode::ValidationError,
            AppError::MissingField { .. } => ErrorCode::MissingField,
            AppError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
            AppError::Unauthorized { .. } => ErrorCode::Unauthorized,
            AppError::InvalidToken => ErrorCode::InvalidToken,
            AppError::ExpiredToken => ErrorCode::ExpiredToken,
            AppError::InvalidCredentials => ErrorCode::InvalidCredentials,
            AppError::Forbidden { .. } => ErrorCode::Forbidden,
            AppError::NotFound { .. } => ErrorCode::NotFound,
            AppError::MangaNotFound { .. } => ErrorCode::MangaNotFound,
            AppError::ChapterNotFound { .. } => ErrorCode::ChapterNotFound,
            AppError::UserNotFound { .. } => ErrorCode::UserNotFound,
            AppError::Duplicate { .. } => ErrorCode::Conflict,
            AppError::DuplicateChapterNumber { .. } => ErrorCode::DuplicateChapterNumber,
            AppError::DuplicateEmail { .. } => ErrorCode::DuplicateEmail,
            AppError::InvalidStateTransition { .. } => ErrorCode::InvalidStateTransition,
            AppError::RateLimited => ErrorCode::RateLimited,
            AppError::Database(_) => ErrorCode::DatabaseError,
            AppError::DatabaseConnection { .. } => ErrorCode::ConnectionError,
            AppError::Storage { .. } => ErrorCode::StorageError,
            AppError::Internal { .. } => ErrorCode::InternalError,
            AppError::Configuration { .. } => ErrorCode::ConfigurationError,
            AppError::Serialization(_) => ErrorCode::SerializationError,
            AppError::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::MissingField { .. } | AppError::InvalidFormat { .. } => {
                StatusCode::BAD_REQUEST
            }

            // 401 Unauthorized
            AppError::Unauthorized { .. }
            | AppError::InvalidToken
            | AppError::ExpiredToken
            | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,

            // 404 Not Found
            AppError::NotFound { .. }
            | AppError::MangaNotFound { .. }
            | AppError::ChapterNotFound { .. }
            | AppError::UserNotFound { .. } => StatusCode::NOT_FOUND,

            // 422 Unprocessable Entity
            // Conflicts require corrected input, not a retry of the same request
            AppError::Validation { .. }
            | AppError::Duplicate { .. }
            | AppError::DuplicateChapterNumber { .. }
            | AppError::DuplicateEmail { .. }
            | AppError::InvalidStateTransition { .. } => StatusCode::UNPROCESSABLE_ENTITY,

            // 429 Too Many Requests
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,

            // 500 Internal Server Error
            AppError::Database(_)
            | AppError::DatabaseConnection { .. }
            | AppError::Storage { .. }
            | AppError::Internal { .. }
            | AppError::Configuration { .. }
            | AppError::Serialization(_)
            | AppError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Check if this error is a client error
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

/// Structured error response, matching the `{success, message}` API envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    pub error_code: ErrorCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        // Internal detail stays in the logs; clients get a generic message
        let message = if self.is_server_error() {
            tracing::error!(
                error = %self,
                code = ?code,
                status = status.as_u16(),
                "Server error"
            );
            "Internal server error".to_string()
        } else {
            tracing::warn!(
                error = %self,
                code = ?code,
                status = status.as_u16(),
                "Client error"
            );
            self.to_string()
        };

        let field = match &self {
            AppError::Validation { field, .. } => field.clone(),
            AppError::MissingField { field } => Some(field.clone()),
            _ => None,
        };

        let body = ErrorResponse {
            success: false,
            message,
            error_code: code,
            field,
        };

        (status, Json(body)).into_response()
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_mapping() {
        let err = AppError::MangaNotFound {
            slug: "one-piece".into(),
        };
        assert_eq!(err.code(), ErrorCode::MangaNotFound);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_duplicate_chapter_number_is_unprocessable() {
        let err = AppError::DuplicateChapterNumber {
            number: "10.5".into(),
        };
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(err.is_client_error());
    }

    #[test]
    fn test_state_transition_error() {
        let err = AppError::InvalidStateTransition {
            message: "Chapter is already approved".into(),
        };
        assert_eq!(err.code(), ErrorCode::InvalidStateTransition);
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_server_error() {
        let err = AppError::Internal {
            message: "Something went wrong".into(),
        };
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.is_server_error());
    }
}
