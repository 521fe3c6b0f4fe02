//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    0.1 + 0.2 = 0.30000000000000004                                      │
//! │                                                                         │
//! │  A sale total summed from float line items drifts over thousands of    │
//! │  sales, and revenue reports stop matching the receipts.                 │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    price_cents × quantity  → exact, checked for overflow               │
//! │    Σ line totals           → exact, checked for overflow               │
//! │    average                 → the ONLY rounding step, half up           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockroom_core::money::Money;
//!
//! let price = Money::from_cents(5000); // $50.00
//! let total = price.checked_multiply_quantity(4).unwrap(); // $200.00
//! assert_eq!(total.cents(), 20000);
//! assert_eq!(Money::from_cents(i64::MAX).checked_multiply_quantity(2), None);
//!
//! let avg = Money::average(Money::from_cents(1000), 3);
//! assert_eq!(avg.cents(), 333);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Where Money is Used
/// ```text
/// Product.price_cents ──► SaleItem.price_at_sale_cents (frozen at sale time)
///                                   │
///                                   ▼ × quantity, summed per sale
///                         Sale.total_amount_cents
///                                   │
///                                   ▼ summed / averaged per report
///                         Dashboard, SalesReport, DailyRevenue
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use stockroom_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Multiplies a unit price by a quantity, or `None` if the result does
    /// not fit in an `i64`.
    ///
    /// ## User Workflow
    /// ```text
    /// Line: Laptop @ $50.00
    /// Quantity: 4
    ///      │
    ///      ▼
    /// checked_multiply_quantity(4) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Line total: Some($200.00)
    /// ```
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// `self + other`, or `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Mean of `count` amounts whose sum is `total`, rounded half up to the
    /// nearest cent. Zero when `count` is zero.
    ///
    /// ```rust
    /// use stockroom_core::money::Money;
    ///
    /// assert_eq!(Money::average(Money::from_cents(5), 2).cents(), 3);   // 2.5 → 3
    /// assert_eq!(Money::average(Money::from_cents(999), 0).cents(), 0);
    /// ```
    pub fn average(total: Money, count: i64) -> Money {
        if count <= 0 {
            return Money::zero();
        }

        // i128 keeps 2 × total from overflowing on very large sums
        let total = total.0 as i128;
        let count = count as i128;
        let rounded = if total >= 0 {
            (2 * total + count) / (2 * count)
        } else {
            -((-2 * total + count) / (2 * count))
        };
        Money(rounded as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly display ("$10.99"). Clients format amounts themselves.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.dollars().abs(), self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
