//! # Sale Repository
//!
//! The Sales Engine: validates and executes multi-line sales against catalog
//! stock, and cancels them with stock restoration.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. VALIDATE (no store access)                                         │
//! │     └── items non-empty, quantity > 0, price >= 0, ids parse           │
//! │                                                                         │
//! │  2. DECREMENT, line by line, in order                                  │
//! │     └── UPDATE products SET stock = stock - q                          │
//! │         WHERE id = ? AND stock >= q          ← one atomic statement    │
//! │         0 rows? → re-read: missing → NotFound                          │
//! │                             present → InsufficientStock                │
//! │                                                                         │
//! │  3. RECORD                                                             │
//! │     └── INSERT sales + sale_items → Sale { status: Completed }         │
//! │                                                                         │
//! │  4. (OPTIONAL) CANCEL                                                  │
//! │     └── Completed → Cancelled (once) + stock restored, one transaction │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Partial failure
//! No transaction spans step 2. When line 3 of 4 fails, lines 1 and 2 stay
//! decremented and no sale is recorded. The per-line conditional update is
//! what keeps two concurrent sales from overselling the same product.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::error::DbResult;
use stockroom_core::validation::validate_new_sale;
use stockroom_core::{
    Caller, CoreError, CoreResult, Money, NewSale, RecordId, Sale, SaleItem, SaleStatus,
    ValidationError,
};

const SALE_COLUMNS: &str =
    "id, total_amount_cents, employee_id, customer_name, created_at, status";

/// A line item joined with the sale it belongs to.
#[derive(sqlx::FromRow)]
struct SaleItemRow {
    sale_id: String,
    #[sqlx(flatten)]
    item: SaleItem,
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    // =========================================================================
    // Create
    // =========================================================================

    /// Records a sale made by `caller`.
    ///
    /// ## Errors
    /// * `Validation` - empty items, quantity <= 0, negative price, long customer
    ///   name, or a total that does not fit in an `i64` (checked before any stock moves)
    /// * `InvalidReference` - a product id is malformed (nothing is touched)
    /// * `ProductNotFound` / `InsufficientStock` - raised by the failing line;
    ///   earlier lines keep their decrement
    pub async fn create_sale(&self, caller: &Caller, request: &NewSale) -> DbResult<Sale> {
        validate_new_sale(request)?;

        let items = request
            .items
            .iter()
            .map(|line| {
                Ok(SaleItem {
                    product_id: RecordId::parse(&line.product_id)?,
                    quantity: line.quantity,
                    price_at_sale_cents: line.price_at_sale_cents,
                })
            })
            .collect::<CoreResult<Vec<_>>>()?;

        let total = items
            .iter()
            .try_fold(Money::zero(), |total, item| {
                item.line_total().and_then(|line| total.checked_add(line))
            })
            .ok_or_else(|| ValidationError::OutOfRange {
                field: "total_amount_cents".to_string(),
                min: 0,
                max: i64::MAX,
            })?;

        debug!(employee_id = %caller.id, lines = items.len(), "Creating sale");

        for item in &items {
            self.take_stock(item.product_id, item.quantity).await?;
        }

        let sale = Sale {
            id: RecordId::new(),
            items,
            total_amount_cents: total.cents(),
            employee_id: caller.id,
            customer_name: request.customer_name.clone(),
            created_at: Utc::now(),
            status: SaleStatus::Completed,
        };

        self.insert(&sale).await?;

        info!(
            sale_id = %sale.id,
            employee_id = %sale.employee_id,
            total = %sale.total_amount(),
            "Sale created"
        );
        Ok(sale)
    }

    /// Atomically removes `quantity` units from a product's stock.
    async fn take_stock(&self, product_id: RecordId, quantity: i64) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock_quantity = stock_quantity - ?2, updated_at = ?3
            WHERE id = ?1 AND stock_quantity >= ?2
            "#,
        )
        .bind(product_id.to_string())
        .bind(quantity)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        // The conditional update did nothing: find out why.
        let current: Option<(String, i64)> =
            sqlx::query_as("SELECT name, stock_quantity FROM products WHERE id = ?1")
                .bind(product_id.to_string())
                .fetch_optional(&self.pool)
                .await?;

        let err = match current {
            None => CoreError::ProductNotFound(product_id.to_string()),
            Some((name, available)) => {
                warn!(%product_id, available, requested = quantity, "Insufficient stock");
                CoreError::InsufficientStock {
                    product: name,
                    available,
                    requested: quantity,
                }
            }
        };
        Err(err.into())
    }

    async fn insert(&self, sale: &Sale) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, total_amount_cents, employee_id, customer_name, created_at, status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(sale.id.to_string())
        .bind(sale.total_amount_cents)
        .bind(sale.employee_id.to_string())
        .bind(&sale.customer_name)
        .bind(sale.created_at)
        .bind(sale.status)
        .execute(&mut *tx)
        .await?;

        for (position, item) in sale.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    sale_id, position, product_id, quantity, price_at_sale_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )
            .bind(sale.id.to_string())
            .bind(position as i64)
            .bind(item.product_id.to_string())
            .bind(item.quantity)
            .bind(item.price_at_sale_cents)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    // =========================================================================
    // Cancel
    // =========================================================================

    /// Cancels a completed sale and puts its stock back.
    ///
    /// ## Checks (in order)
    /// 1. `InvalidReference` / `SaleNotFound`
    /// 2. `AlreadyCancelled`
    /// 3. `Forbidden` - employees may only cancel their own sales
    ///
    /// The status flip is guarded by `status = 'completed'` and runs in one
    /// transaction with the stock restores. Only the request that won the flip
    /// restores, so a sale is never restored twice, and a failed restore rolls
    /// the sale back to completed. Lines whose product has since been deleted
    /// are skipped.
    pub async fn cancel_sale(&self, caller: &Caller, id: &str) -> DbResult<Sale> {
        let id = RecordId::parse(id)?;

        let mut sale = self
            .find(id)
            .await?
            .ok_or_else(|| CoreError::SaleNotFound(id.to_string()))?;

        if sale.is_cancelled() {
            return Err(CoreError::AlreadyCancelled(id.to_string()).into());
        }

        if !caller.can_cancel(&sale) {
            warn!(sale_id = %id, caller = %caller.id, "Cancel refused: not the owner");
            return Err(CoreError::Forbidden("sale belongs to another employee".to_string()).into());
        }

        // Flip and restores commit together; a failure leaves the sale completed
        let mut tx = self.pool.begin().await?;

        let flipped = sqlx::query("UPDATE sales SET status = ?2 WHERE id = ?1 AND status = ?3")
            .bind(id.to_string())
            .bind(SaleStatus::Cancelled)
            .bind(SaleStatus::Completed)
            .execute(&mut *tx)
            .await?;

        if flipped.rows_affected() == 0 {
            return Err(CoreError::AlreadyCancelled(id.to_string()).into());
        }

        let now = Utc::now();
        for item in &sale.items {
            let restored = sqlx::query(
                r#"
                UPDATE products
                SET stock_quantity = stock_quantity + ?2, updated_at = ?3
                WHERE id = ?1
                "#,
            )
            .bind(item.product_id.to_string())
            .bind(item.quantity)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            if restored.rows_affected() == 0 {
                debug!(product_id = %item.product_id, "Product gone, stock not restored");
            }
        }

        tx.commit().await?;

        sale.status = SaleStatus::Cancelled;
        info!(sale_id = %id, cancelled_by = %caller.id, "Sale cancelled");
        Ok(sale)
    }

    // =========================================================================
    // Read
    // =========================================================================

    /// Loads a sale with its items, ignoring scope.
    pub async fn find(&self, id: RecordId) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        let Some(mut sale) = sale else {
            return Ok(None);
        };

        sale.items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT product_id, quantity, price_at_sale_cents
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY position
            "#,
        )
        .bind(id.to_string())
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(sale))
    }

    /// A single sale as seen by `caller`. Sales outside the caller's scope
    /// are reported as not found.
    pub async fn get_sale(&self, caller: &Caller, id: &str) -> DbResult<Sale> {
        let id = RecordId::parse(id)?;

        match self.find(id).await? {
            Some(sale) if caller.sales_scope().permits(&sale) => Ok(sale),
            _ => Err(CoreError::SaleNotFound(id.to_string()).into()),
        }
    }

    /// Every sale visible to `caller`, newest first.
    pub async fn list_sales(&self, caller: &Caller) -> DbResult<Vec<Sale>> {
        let employee = caller
            .sales_scope()
            .employee_filter()
            .map(|id| id.to_string());

        debug!(scope = ?employee, "Listing sales");

        let mut sales = sqlx::query_as::<_, Sale>(&format!(
            r#"
            SELECT {SALE_COLUMNS}
            FROM sales
            WHERE (?1 IS NULL OR employee_id = ?1)
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(&employee)
        .fetch_all(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, SaleItemRow>(
            r#"
            SELECT si.sale_id, si.product_id, si.quantity, si.price_at_sale_cents
            FROM sale_items si
            JOIN sales s ON s.id = si.sale_id
            WHERE (?1 IS NULL OR s.employee_id = ?1)
            ORDER BY si.sale_id, si.position
            "#,
        )
        .bind(&employee)
        .fetch_all(&self.pool)
        .await?;

        let mut items: HashMap<String, Vec<SaleItem>> = HashMap::new();
        for row in rows {
            items.entry(row.sale_id).or_default().push(row.item);
        }

        for sale in &mut sales {
            sale.items = items.remove(&sale.id.to_string()).unwrap_or_default();
        }

        Ok(sales)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
