//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Stockroom                              │
//! │                                                                         │
//! │  ValidationError ──► CoreError ──► DbError::Domain ──► ApiError ──► JSON│
//! │                                        │                                │
//! │  sqlx::Error ─────────────────────► DbError::QueryFailed ...           │
//! │                                        │   (logged, generic message)   │
//! │                                        ▼                                │
//! │                              { "code": "...", "message": "..." }       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Clients switch on `code`; `message` is for humans.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use stockroom_core::{CoreError, ValidationError};
use stockroom_db::DbError;

/// Error body returned by every failing endpoint:
/// ```json
/// { "code": "INSUFFICIENT_STOCK", "message": "Insufficient stock for Laptop: available 2, requested 5" }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Malformed identifier (400)
    InvalidReference,

    /// Input validation failed (422)
    ValidationError,

    /// Unique field already taken (409)
    Duplicate,

    /// Resource not found (404)
    NotFound,

    /// Not enough units to sell (409)
    InsufficientStock,

    /// Sale was cancelled before (409)
    AlreadyCancelled,

    /// Caller does not own the resource (403)
    Forbidden,

    /// Caller lacks the admin role (403)
    AdminRequired,

    /// No credentials, or wrong credentials (401)
    Unauthenticated,

    /// Token present but unusable (401)
    InvalidToken,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    pub fn http_status(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidReference => StatusCode::BAD_REQUEST,
            ErrorCode::ValidationError => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::Duplicate
            | ErrorCode::InsufficientStock
            | ErrorCode::AlreadyCancelled => StatusCode::CONFLICT,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Forbidden | ErrorCode::AdminRequired => StatusCode::FORBIDDEN,
            ErrorCode::Unauthenticated | ErrorCode::InvalidToken => StatusCode::UNAUTHORIZED,
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthenticated, message)
    }

    pub fn invalid_token(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::InvalidToken, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Domain(e) => e.into(),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::Duplicate,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            DbError::ConstraintViolation(message) => {
                tracing::error!("Constraint violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Value out of range")
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::PoolExhausted => {
                tracing::error!("Database pool exhausted");
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidReference(id) => ApiError::new(
                ErrorCode::InvalidReference,
                format!("Invalid identifier: {}", id),
            ),
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id),
            CoreError::SaleNotFound(id) => ApiError::not_found("Sale", &id),
            e @ CoreError::InsufficientStock { .. } => {
                ApiError::new(ErrorCode::InsufficientStock, e.to_string())
            }
            e @ CoreError::AlreadyCancelled(_) => {
                ApiError::new(ErrorCode::AlreadyCancelled, e.to_string())
            }
            CoreError::Forbidden(reason) => ApiError::new(ErrorCode::Forbidden, reason),
            CoreError::Unauthorized(reason) => ApiError::new(ErrorCode::AdminRequired, reason),
            CoreError::Validation(e @ ValidationError::Duplicate { .. }) => {
                ApiError::new(ErrorCode::Duplicate, e.to_string())
            }
            CoreError::Validation(e) => ApiError::new(ErrorCode::ValidationError, e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.http_status(), Json(self)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;
