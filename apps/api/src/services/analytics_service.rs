//! # Analytics Endpoints
//!
//! Read-only reports over sales and stock.
//!
//! ## Routes
//! ```text
//! GET /analytics/dashboard               any user, scoped to caller
//! GET /analytics/sales/report            any user, scoped, ?start_date&end_date
//! GET /analytics/products                admin
//! GET /analytics/products/low-stock      any user
//! GET /analytics/products/top-selling    any user, ?limit (1..=50, default 10)
//! GET /analytics/revenue                 admin, ?start_date&end_date
//! ```
//!
//! Dates that fail to parse are treated as absent.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use stockroom_core::period::parse_timestamp;
use stockroom_core::{
    CategoryStats, DailyRevenue, DashboardStats, DateRange, SalesReport, TopSellingProduct,
};
use tracing::debug;

use crate::auth::CurrentCaller;
use crate::error::ApiResult;
use crate::services::product_service::ProductResponse;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct DateRangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl DateRangeQuery {
    fn into_range(self) -> DateRange {
        for (name, raw) in [("start_date", &self.start_date), ("end_date", &self.end_date)] {
            if let Some(raw) = raw {
                if parse_timestamp(raw).is_none() {
                    debug!(param = name, value = %raw, "Ignoring unparseable date");
                }
            }
        }

        DateRange::parse_lenient(self.start_date.as_deref(), self.end_date.as_deref())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TopSellingQuery {
    pub limit: Option<i64>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/sales/report", get(sales_report))
        .route("/products", get(product_analytics))
        .route("/products/low-stock", get(low_stock))
        .route("/products/top-selling", get(top_selling))
        .route("/revenue", get(revenue))
}

async fn dashboard(
    State(state): State<AppState>,
    caller: CurrentCaller,
) -> ApiResult<Json<DashboardStats>> {
    Ok(Json(state.db.analytics().dashboard(&caller).await?))
}

async fn sales_report(
    State(state): State<AppState>,
    caller: CurrentCaller,
    Query(query): Query<DateRangeQuery>,
) -> ApiResult<Json<SalesReport>> {
    let range = query.into_range();
    Ok(Json(state.db.analytics().sales_report(&caller, range).await?))
}

async fn product_analytics(
    State(state): State<AppState>,
    caller: CurrentCaller,
) -> ApiResult<Json<Vec<CategoryStats>>> {
    Ok(Json(state.db.analytics().product_analytics(&caller).await?))
}

async fn low_stock(
    State(state): State<AppState>,
    _caller: CurrentCaller,
) -> ApiResult<Json<Vec<ProductResponse>>> {
    let products = state.db.analytics().low_stock_products().await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

async fn top_selling(
    State(state): State<AppState>,
    _caller: CurrentCaller,
    Query(query): Query<TopSellingQuery>,
) -> ApiResult<Json<Vec<TopSellingProduct>>> {
    let top = state
        .db
        .analytics()
        .top_selling_products(query.limit)
        .await?;
    Ok(Json(top))
}

async fn revenue(
    State(state): State<AppState>,
    caller: CurrentCaller,
    Query(query): Query<DateRangeQuery>,
) -> ApiResult<Json<Vec<DailyRevenue>>> {
    let range = query.into_range();
    Ok(Json(state.db.analytics().revenue_by_date(&caller, range).await?))
}
