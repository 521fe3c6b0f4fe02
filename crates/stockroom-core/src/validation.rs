//! # Validation Module
//!
//! Input validation for Stockroom.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractor (axum Json / Query)                           │
//! │  ├── Shape checks (missing fields, wrong JSON types)                   │
//! │  └── Rejected before any handler runs                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Repository entry points (Rust)                               │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK (stock_quantity >= 0) constraints                │
//! │  └── UNIQUE (users.email)                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockroom_core::validation::{validate_product_name, validate_quantity};
//!
//! validate_product_name("Laptop").unwrap();
//! validate_quantity(5).unwrap();
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::{NewCustomer, NewProduct, NewSale, ProductUpdate};
use crate::{DEFAULT_TOP_SELLING_LIMIT, MAX_TOP_SELLING_LIMIT};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;
const MAX_CATEGORY_LEN: usize = 100;
const MAX_PERSON_NAME_LEN: usize = 100;
const MIN_PASSWORD_LEN: usize = 8;

// =============================================================================
// String Validators
// =============================================================================

fn validate_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - At most 200 characters
///
/// ## Example
/// ```rust
/// use stockroom_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Wireless Mouse").is_ok());
/// assert!(validate_product_name("   ").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    validate_text("name", name, MAX_NAME_LEN)
}

/// Validates a product category label (1-100 characters).
pub fn validate_category(category: &str) -> ValidationResult<()> {
    validate_text("category", category, MAX_CATEGORY_LEN)
}

/// Validates a user's or customer's display name (1-100 characters).
pub fn validate_person_name(name: &str) -> ValidationResult<()> {
    validate_text("name", name, MAX_PERSON_NAME_LEN)
}

/// The customer name on a sale is optional free text, at most 200 characters.
pub fn validate_customer_name(name: Option<&str>) -> ValidationResult<()> {
    match name {
        Some(name) if name.chars().count() > MAX_NAME_LEN => Err(ValidationError::TooLong {
            field: "customer_name".to_string(),
            max: MAX_NAME_LEN,
        }),
        _ => Ok(()),
    }
}

/// Canonical form of an email address: trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validates an email address.
///
/// ## Rules
/// - Exactly one `@`
/// - Non-empty local part
/// - Domain with at least one dot, not at either end
/// - No whitespace
///
/// ## Example
/// ```rust
/// use stockroom_core::validation::validate_email;
///
/// assert!(validate_email("admin@example.com").is_ok());
/// assert!(validate_email("admin.example.com").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();
    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: reason.to_string(),
    };

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    if email.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain whitespace"));
    }

    let (local, domain) = email
        .split_once('@')
        .ok_or_else(|| invalid("must contain '@'"))?;

    if local.is_empty() || domain.contains('@') {
        return Err(invalid("must contain exactly one '@' after a local part"));
    }

    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid("domain must look like example.com"));
    }

    Ok(())
}

/// Validates a plaintext password before hashing (at least 8 characters).
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

fn validate_non_negative(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a price in cents. Zero is allowed (free items).
///
/// ```rust
/// use stockroom_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(99999).is_ok());
/// assert!(validate_price_cents(0).is_ok());
/// assert!(validate_price_cents(-1).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    validate_non_negative("price_cents", cents)
}

pub fn validate_stock_quantity(qty: i64) -> ValidationResult<()> {
    validate_non_negative("stock_quantity", qty)
}

pub fn validate_low_stock_threshold(threshold: i64) -> ValidationResult<()> {
    validate_non_negative("low_stock_threshold", threshold)
}

/// Validates the quantity of a sale line.
///
/// ## User Workflow
/// ```text
/// POST /sales { items: [{ product_id, quantity: 0, ... }] }
///      │
///      ▼
/// validate_quantity(0) ← THIS FUNCTION
///      │
///      └── qty <= 0? → Error: "quantity must be positive"
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Resolves the `limit` of the top-selling report: default 10, 1..=50.
pub fn validate_top_limit(limit: Option<i64>) -> ValidationResult<i64> {
    let limit = limit.unwrap_or(DEFAULT_TOP_SELLING_LIMIT);

    if !(1..=MAX_TOP_SELLING_LIMIT).contains(&limit) {
        return Err(ValidationError::OutOfRange {
            field: "limit".to_string(),
            min: 1,
            max: MAX_TOP_SELLING_LIMIT,
        });
    }

    Ok(limit)
}

// =============================================================================
// Payload Validators
// =============================================================================

pub fn validate_new_product(product: &NewProduct) -> ValidationResult<()> {
    validate_product_name(&product.name)?;
    validate_category(&product.category)?;
    validate_price_cents(product.price_cents)?;
    if let Some(qty) = product.stock_quantity {
        validate_stock_quantity(qty)?;
    }
    if let Some(threshold) = product.low_stock_threshold {
        validate_low_stock_threshold(threshold)?;
    }
    Ok(())
}

/// Present fields follow the create rules; absent fields are not checked.
pub fn validate_product_update(update: &ProductUpdate) -> ValidationResult<()> {
    if let Some(name) = &update.name {
        validate_product_name(name)?;
    }
    if let Some(category) = &update.category {
        validate_category(category)?;
    }
    if let Some(price) = update.price_cents {
        validate_price_cents(price)?;
    }
    if let Some(qty) = update.stock_quantity {
        validate_stock_quantity(qty)?;
    }
    if let Some(threshold) = update.low_stock_threshold {
        validate_low_stock_threshold(threshold)?;
    }
    Ok(())
}

/// Shape checks for a new sale. Identifier parsing happens in the sales
/// engine so that it can report `InvalidReference`.
pub fn validate_new_sale(sale: &NewSale) -> ValidationResult<()> {
    if sale.items.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    for line in &sale.items {
        validate_quantity(line.quantity)?;
        validate_non_negative("price_at_sale_cents", line.price_at_sale_cents)?;
    }

    validate_customer_name(sale.customer_name.as_deref())
}

pub fn validate_new_customer(customer: &NewCustomer) -> ValidationResult<()> {
    validate_person_name(&customer.name)?;
    if let Some(email) = customer.email.as_deref().filter(|e| !e.trim().is_empty()) {
        validate_email(email)?;
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
