//! # Analytics Repository
//!
//! The Analytics Engine: read-only aggregations over sales and products.
//!
//! ## Scope
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     What each report sees                               │
//! │                                                                         │
//! │  dashboard / sales_report ── completed sales in caller's scope         │
//! │                              (admin: all, employee: own)               │
//! │                                                                         │
//! │  top_selling ─────────────── completed sales, every employee           │
//! │  revenue_by_date ─────────── completed sales, every employee (admin)   │
//! │  product_analytics ───────── whole catalog (admin)                     │
//! │  low_stock ───────────────── whole catalog                             │
//! │                                                                         │
//! │  Cancelled sales never count towards anything.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::product::PRODUCT_COLUMNS;
use stockroom_core::validation::validate_top_limit;
use stockroom_core::{
    Caller, CategoryStats, DailyRevenue, DashboardStats, DateRange, Money, Product,
    ReportPeriods, SalesReport, TopSellingProduct,
};

/// Repository for analytics queries.
#[derive(Debug, Clone)]
pub struct AnalyticsRepository {
    pool: SqlitePool,
}

impl AnalyticsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        AnalyticsRepository { pool }
    }

    /// `(count, revenue)` over completed sales, optionally restricted to one
    /// employee and an inclusive `created_at` window.
    async fn completed_totals(
        &self,
        employee: Option<String>,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> DbResult<(i64, i64)> {
        let totals = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT COUNT(*), COALESCE(SUM(total_amount_cents), 0)
            FROM sales
            WHERE status = 'completed'
              AND (?1 IS NULL OR employee_id = ?1)
              AND (?2 IS NULL OR created_at >= ?2)
              AND (?3 IS NULL OR created_at <= ?3)
            "#,
        )
        .bind(employee)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(totals)
    }

    async fn count(&self, sql: &str) -> DbResult<i64> {
        let n = sqlx::query_scalar::<_, i64>(sql)
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }

    // =========================================================================
    // Dashboard & Reports
    // =========================================================================

    /// Headline numbers for the caller, with periods evaluated now.
    pub async fn dashboard(&self, caller: &Caller) -> DbResult<DashboardStats> {
        self.dashboard_at(caller, Utc::now()).await
    }

    /// Dashboard with the day/week/month windows anchored at `now`.
    pub async fn dashboard_at(
        &self,
        caller: &Caller,
        now: DateTime<Utc>,
    ) -> DbResult<DashboardStats> {
        let periods = ReportPeriods::starting(now);
        let employee = caller
            .sales_scope()
            .employee_filter()
            .map(|id| id.to_string());

        debug!(caller = %caller.id, scope = ?employee, "Building dashboard");

        let total_products = self.count("SELECT COUNT(*) FROM products").await?;

        let total_customers = if caller.sees_customer_totals() {
            Some(self.count("SELECT COUNT(*) FROM customers").await?)
        } else {
            None
        };

        let low_stock_count = self
            .count("SELECT COUNT(*) FROM products WHERE stock_quantity <= low_stock_threshold")
            .await?;

        let (total_sales, total_revenue_cents) =
            self.completed_totals(employee.clone(), None, None).await?;
        let (today_sales, today_revenue_cents) = self
            .completed_totals(employee.clone(), Some(periods.today_start), None)
            .await?;
        let (week_sales, _) = self
            .completed_totals(employee.clone(), Some(periods.week_start), None)
            .await?;
        let (month_sales, _) = self
            .completed_totals(employee, Some(periods.month_start), None)
            .await?;

        Ok(DashboardStats {
            total_products,
            total_customers,
            total_sales,
            total_revenue_cents,
            low_stock_count,
            today_sales,
            today_revenue_cents,
            week_sales,
            month_sales,
        })
    }

    /// Total, count and average of the caller's completed sales in `range`.
    /// An empty result is all zeros.
    pub async fn sales_report(&self, caller: &Caller, range: DateRange) -> DbResult<SalesReport> {
        let employee = caller
            .sales_scope()
            .employee_filter()
            .map(|id| id.to_string());

        let (count, total) = self
            .completed_totals(employee, range.start, range.end)
            .await?;

        Ok(SalesReport::from_totals(Money::from_cents(total), count))
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Catalog grouped by category, largest categories first.
    pub async fn product_analytics(&self, caller: &Caller) -> DbResult<Vec<CategoryStats>> {
        caller.require_admin()?;

        let stats = sqlx::query_as::<_, CategoryStats>(
            r#"
            SELECT
                category,
                COUNT(*) AS count,
                COALESCE(SUM(stock_quantity), 0) AS total_stock,
                COALESCE(SUM(stock_quantity * price_cents), 0) AS total_value_cents
            FROM products
            GROUP BY category
            ORDER BY count DESC, category ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(stats)
    }

    /// Products at or below their threshold, emptiest first.
    pub async fn low_stock_products(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE stock_quantity <= low_stock_threshold
            ORDER BY stock_quantity ASC, name ASC
            "#
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Best sellers by units over completed sales.
    ///
    /// The limit applies to the ranking, before products are joined, so a
    /// product deleted after being sold leaves a gap instead of letting the
    /// next one in.
    pub async fn top_selling_products(
        &self,
        limit: Option<i64>,
    ) -> DbResult<Vec<TopSellingProduct>> {
        let limit = validate_top_limit(limit)?;

        let top = sqlx::query_as::<_, TopSellingProduct>(
            r#"
            SELECT
                ranked.product_id,
                p.name,
                p.category,
                ranked.total_quantity,
                ranked.total_revenue_cents,
                ranked.sale_count
            FROM (
                SELECT
                    si.product_id,
                    SUM(si.quantity) AS total_quantity,
                    SUM(si.quantity * si.price_at_sale_cents) AS total_revenue_cents,
                    COUNT(*) AS sale_count
                FROM sale_items si
                JOIN sales s ON s.id = si.sale_id
                WHERE s.status = 'completed'
                GROUP BY si.product_id
                ORDER BY total_quantity DESC, si.product_id ASC
                LIMIT ?1
            ) ranked
            JOIN products p ON p.id = ranked.product_id
            ORDER BY ranked.total_quantity DESC, ranked.product_id ASC
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(top)
    }

    // =========================================================================
    // Revenue
    // =========================================================================

    /// Completed revenue per UTC day inside `range`, oldest day first.
    pub async fn revenue_by_date(
        &self,
        caller: &Caller,
        range: DateRange,
    ) -> DbResult<Vec<DailyRevenue>> {
        caller.require_admin()?;

        let days = sqlx::query_as::<_, DailyRevenue>(
            r#"
            SELECT
                substr(created_at, 1, 10) AS date,
                SUM(total_amount_cents) AS revenue_cents,
                COUNT(*) AS count
            FROM sales
            WHERE status = 'completed'
              AND (?1 IS NULL OR created_at >= ?1)
              AND (?2 IS NULL OR created_at <= ?2)
            GROUP BY date
            ORDER BY date ASC
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await?;

        Ok(days)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
