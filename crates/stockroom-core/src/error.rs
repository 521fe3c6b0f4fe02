//! # Error Types
//!
//! Domain-specific error types for stockroom-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockroom-core errors (this file)                                     │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  stockroom-db errors (separate crate)                                  │
//! │  └── DbError          - Database failures, carries CoreError           │
//! │                                                                         │
//! │  HTTP API errors (in app)                                              │
//! │  └── ApiError         - What clients see (status + code + message)     │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product name, ID, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to exactly one client-facing error code

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They are surfaced to the caller as request failures, never retried.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An identifier is not in the accepted format.
    ///
    /// ## When This Occurs
    /// - Path segment like `/products/abc` instead of a UUID
    /// - A sale line references a malformed product id
    ///
    /// Raised before any store access.
    #[error("Invalid identifier: {0}")]
    InvalidReference(String),

    /// Product cannot be found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Sale cannot be found (or is outside the caller's scope).
    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    /// Insufficient stock to complete a sale line.
    ///
    /// ## User Workflow
    /// ```text
    /// POST /sales  { items: [{ Laptop, quantity: 5 }] }
    ///      │
    ///      ▼
    /// Conditional decrement: stock 3 >= 5? no
    ///      │
    ///      ▼
    /// InsufficientStock { product: "Laptop", available: 3, requested: 5 }
    /// ```
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// Sale was already cancelled; cancelling is one-way and happens once.
    #[error("Sale {0} is already cancelled")]
    AlreadyCancelled(String),

    /// The caller may not act on this record (ownership check failed).
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The caller's role is insufficient for the operation.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate value (e.g., email already registered).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
