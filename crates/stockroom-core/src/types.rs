//! # Domain Types
//!
//! Core domain types used throughout Stockroom.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │    SaleItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (RecordId)  │◄──┼─ items[] ───────┼──►│  product_id     │       │
//! │  │  price_cents    │   │  total_cents    │   │  quantity       │       │
//! │  │  stock_quantity │   │  employee_id    │   │  price_at_sale  │       │
//! │  │  low_stock_thr. │   │  status         │   │  (frozen)       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      User       │   │    Customer     │   │   SaleStatus    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  email (unique) │   │  name           │   │  Completed ──┐  │       │
//! │  │  role           │   │  email? phone?  │   │  Cancelled ◄─┘  │       │
//! │  │  password_hash  │   │  address?       │   │  (one-way)      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Request payloads (`NewProduct`, `ProductUpdate`, `NewSale`, ...) and the
//! analytics output shapes live here too, so the TypeScript bindings cover
//! the whole API surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::access::Role;
use crate::id::RecordId;
use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    #[cfg_attr(feature = "sqlx", sqlx(try_from = "String"))]
    pub id: RecordId,

    pub name: String,

    pub description: Option<String>,

    /// Price in cents.
    pub price_cents: i64,

    /// Free-form category label ("Electronics", "Beverages", ...).
    pub category: String,

    /// Units on hand. Never negative.
    pub stock_quantity: i64,

    /// At or below this level the product counts as low stock.
    pub low_stock_threshold: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {

    /// Low stock is inclusive: a product sitting exactly at its threshold
    /// is already low.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock_quantity <= self.low_stock_threshold
    }
}

/// Payload for creating a product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price_cents: i64,
    pub category: String,
    /// Defaults to 0.
    #[serde(default)]
    pub stock_quantity: Option<i64>,
    /// Defaults to [`crate::DEFAULT_LOW_STOCK_THRESHOLD`].
    #[serde(default)]
    pub low_stock_threshold: Option<i64>,
}

/// Partial product update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub category: Option<String>,
    pub stock_quantity: Option<i64>,
    pub low_stock_threshold: Option<i64>,
}

impl ProductUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price_cents.is_none()
            && self.category.is_none()
            && self.stock_quantity.is_none()
            && self.low_stock_threshold.is_none()
    }
}

/// Catalog search filters. All optional, combined with AND.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct ProductFilter {
    /// Case-insensitive substring of name or description.
    pub q: Option<String>,
    /// Exact category match.
    pub category: Option<String>,
    pub min_price_cents: Option<i64>,
    pub max_price_cents: Option<i64>,
    /// When true, only products at or below their threshold.
    pub low_stock: Option<bool>,
}

// =============================================================================
// Sale Status
// =============================================================================

/// Lifecycle of a sale. `Completed → Cancelled` is the only transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum SaleStatus {
    #[default]
    Completed,
    Cancelled,
}

impl SaleStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Completed => "completed",
            SaleStatus::Cancelled => "cancelled",
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// One line of a sale.
/// `price_at_sale_cents` is frozen at sale time so historical totals never
/// follow later catalog price changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleItem {
    #[cfg_attr(feature = "sqlx", sqlx(try_from = "String"))]
    pub product_id: RecordId,
    pub quantity: i64,
    pub price_at_sale_cents: i64,
}

impl SaleItem {
    /// `price_at_sale × quantity`, or `None` if it overflows.
    #[inline]
    pub fn line_total(&self) -> Option<Money> {
        Money::from_cents(self.price_at_sale_cents).checked_multiply_quantity(self.quantity)
    }
}

/// A recorded sale. Immutable except for `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    #[cfg_attr(feature = "sqlx", sqlx(try_from = "String"))]
    pub id: RecordId,

    /// Lines in the order they were submitted. Loaded separately.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub items: Vec<SaleItem>,

    /// Σ price_at_sale × quantity, fixed at creation.
    pub total_amount_cents: i64,

    #[cfg_attr(feature = "sqlx", sqlx(try_from = "String"))]
    pub employee_id: RecordId,

    /// Free-text snapshot, not a reference to a customer record.
    pub customer_name: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    pub status: SaleStatus,
}

impl Sale {
    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.status == SaleStatus::Cancelled
    }
}

/// One requested line of a new sale. The product id is still raw text here
/// and is parsed by the sales engine.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleLineRequest {
    pub product_id: String,
    pub quantity: i64,
    pub price_at_sale_cents: i64,
}

/// Payload for creating a sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSale {
    pub items: Vec<SaleLineRequest>,
    #[serde(default)]
    pub customer_name: Option<String>,
}

// =============================================================================
// Customer
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    #[cfg_attr(feature = "sqlx", sqlx(try_from = "String"))]
    pub id: RecordId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewCustomer {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

// =============================================================================
// User
// =============================================================================

/// A user account. The password hash never leaves the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    #[cfg_attr(feature = "sqlx", sqlx(try_from = "String"))]
    pub id: RecordId,
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(skip_serializing)]
    #[ts(skip)]
    pub password_hash: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A user ready to be stored; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub role: Role,
    pub password_hash: String,
}

// =============================================================================
// Analytics Output
// =============================================================================

/// Headline numbers for the dashboard, scoped to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DashboardStats {
    pub total_products: i64,
    /// Only present for admins.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_customers: Option<i64>,
    pub total_sales: i64,
    pub total_revenue_cents: i64,
    pub low_stock_count: i64,
    pub today_sales: i64,
    pub today_revenue_cents: i64,
    pub week_sales: i64,
    pub month_sales: i64,
}

/// Completed-sales summary over an optional date range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesReport {
    pub total_sales_cents: i64,
    pub count: i64,
    pub average_sale_cents: i64,
}

impl SalesReport {
    pub fn from_totals(total: Money, count: i64) -> Self {
        SalesReport {
            total_sales_cents: total.cents(),
            count,
            average_sale_cents: Money::average(total, count).cents(),
        }
    }
}

/// Per-category inventory summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CategoryStats {
    pub category: String,
    pub count: i64,
    pub total_stock: i64,
    pub total_value_cents: i64,
}

/// A product ranked by units sold over completed sales.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TopSellingProduct {
    #[cfg_attr(feature = "sqlx", sqlx(try_from = "String"))]
    pub product_id: RecordId,
    pub name: String,
    pub category: String,
    pub total_quantity: i64,
    pub total_revenue_cents: i64,
    /// Number of sale lines that contributed.
    pub sale_count: i64,
}

/// Revenue for one UTC calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct DailyRevenue {
    /// `YYYY-MM-DD`
    pub date: String,
    pub revenue_cents: i64,
    pub count: i64,
}

/// Totals over every completed sale, shown on the customers page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerSalesSummary {
    pub total_sales_cents: i64,
    pub count: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================
