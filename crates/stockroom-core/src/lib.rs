//! # stockroom-core: Pure Business Logic for Stockroom
//!
//! This crate holds the domain model of the inventory and point-of-sale
//! backend as pure types and functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    HTTP API (apps/api)                          │   │
//! │  │   Access Control Gate ──► products / sales / analytics routes  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ stockroom-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌─────────┐ ┌──────────┐ ┌─────────┐ ┌────────┐ │   │
//! │  │   │  types   │ │  money  │ │  access  │ │ period  │ │   id   │ │   │
//! │  │   │ Product  │ │  Money  │ │  Caller  │ │ Report  │ │RecordId│ │   │
//! │  │   │  Sale    │ │         │ │  Role    │ │ Periods │ │        │ │   │
//! │  │   └──────────┘ └─────────┘ └──────────┘ └─────────┘ └────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 stockroom-db (Database Layer)                   │   │
//! │  │       SQLite queries, migrations, Sales & Analytics engines     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, Customer, User, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`id`] - Validated record identifiers
//! - [`access`] - Caller identity and the role-based access policy
//! - [`period`] - Report period boundaries and lenient date parsing
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use stockroom_core::money::Money;
//!
//! let price = Money::from_cents(5000); // $50.00
//! let line_total = price.checked_multiply_quantity(4);
//! assert_eq!(line_total, Some(Money::from_cents(20000)));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod access;
pub mod error;
pub mod id;
pub mod money;
pub mod period;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use access::{Caller, Role, SalesScope};
pub use error::{CoreError, CoreResult, ValidationError};
pub use id::RecordId;
pub use money::Money;
pub use period::{DateRange, ReportPeriods};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Low-stock threshold applied when a product is created without one.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;

/// Default number of rows returned by the top-selling report.
pub const DEFAULT_TOP_SELLING_LIMIT: i64 = 10;

/// Largest `limit` accepted by the top-selling report.
pub const MAX_TOP_SELLING_LIMIT: i64 = 50;
