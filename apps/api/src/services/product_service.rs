//! # Product Endpoints
//!
//! Catalog CRUD and search. Reads are open to any signed-in user; writes
//! are admin only (enforced by the repository).
//!
//! ## Search
//! ```text
//! GET /products?q=lap&category=Electronics&min_price_cents=1000&low_stock=true
//!                │       │                   │                   │
//!                │       │                   │                   └ stock <= threshold
//!                │       │                   └ inclusive price bounds
//!                │       └ exact match
//!                └ case-insensitive, name OR description
//! ```

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use stockroom_core::{NewProduct, Product, ProductFilter, ProductUpdate};

use crate::auth::CurrentCaller;
use crate::error::ApiResult;
use crate::services::auth_service::MessageResponse;
use crate::AppState;

/// A product as sent to clients, with its derived low-stock flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductResponse {
    #[serde(flatten)]
    pub product: Product,
    pub is_low_stock: bool,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        ProductResponse {
            is_low_stock: product.is_low_stock(),
            product,
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
}

async fn create_product(
    State(state): State<AppState>,
    caller: CurrentCaller,
    Json(req): Json<NewProduct>,
) -> ApiResult<(StatusCode, Json<ProductResponse>)> {
    let product = state.db.products().create(&caller, &req).await?;
    Ok((StatusCode::CREATED, Json(product.into())))
}

async fn list_products(
    State(state): State<AppState>,
    _caller: CurrentCaller,
    Query(filter): Query<ProductFilter>,
) -> ApiResult<Json<Vec<ProductResponse>>> {
    let products = state.db.products().search(&filter).await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

async fn get_product(
    State(state): State<AppState>,
    _caller: CurrentCaller,
    Path(id): Path<String>,
) -> ApiResult<Json<ProductResponse>> {
    let product = state.db.products().get(&id).await?;
    Ok(Json(product.into()))
}

async fn update_product(
    State(state): State<AppState>,
    caller: CurrentCaller,
    Path(id): Path<String>,
    Json(patch): Json<ProductUpdate>,
) -> ApiResult<Json<ProductResponse>> {
    let product = state.db.products().update(&caller, &id, &patch).await?;
    Ok(Json(product.into()))
}

async fn delete_product(
    State(state): State<AppState>,
    caller: CurrentCaller,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.db.products().delete(&caller, &id).await?;
    Ok(Json(MessageResponse {
        message: "Product deleted",
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::test_support::TestApp;

    #[tokio::test]
    async fn test_admin_creates_and_everyone_reads() {
        let app = TestApp::new().await;
        let admin = app.admin_token().await;
        let clerk = app.employee_token("clerk@example.com").await;

        let id = app.product(&admin, "Laptop", 99999, 10).await;

        let res = app.get(&format!("/products/{id}"), &clerk).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["name"], "Laptop");
        assert_eq!(res.body["price_cents"], 99999);
        assert_eq!(res.body["is_low_stock"], false);

        let res = app.get("/products", &clerk).await;
        assert_eq!(res.body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_employee_cannot_write() {
        let app = TestApp::new().await;
        let admin = app.admin_token().await;
        let clerk = app.employee_token("clerk@example.com").await;
        let id = app.product(&admin, "Laptop", 99999, 10).await;

        let res = app
            .post(
                "/products",
                &clerk,
                json!({ "name": "Mouse", "price_cents": 100, "category": "Electronics" }),
            )
            .await;
        assert_eq!(res.status, StatusCode::FORBIDDEN);
        assert_eq!(res.body["code"], "ADMIN_REQUIRED");

        let res = app
            .request(Method::DELETE, &format!("/products/{id}"), Some(&clerk), None)
            .await;
        assert_eq!(res.status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_search_filters_and_low_stock_flag() {
        let app = TestApp::new().await;
        let admin = app.admin_token().await;
        app.product(&admin, "Gaming Laptop", 150000, 10).await;
        app.product(&admin, "Laptop Sleeve", 2500, 2).await;
        app.product(&admin, "Mouse", 2999, 50).await;

        let res = app.get("/products?q=LAPTOP", &admin).await;
        assert_eq!(res.body.as_array().unwrap().len(), 2);

        let res = app
            .get("/products?q=laptop&max_price_cents=10000", &admin)
            .await;
        let items = res.body.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["name"], "Laptop Sleeve");
        assert_eq!(items[0]["is_low_stock"], true);

        let res = app.get("/products?low_stock=true", &admin).await;
        assert_eq!(res.body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_partial_update_and_delete() {
        let app = TestApp::new().await;
        let admin = app.admin_token().await;
        let id = app.product(&admin, "Laptop", 99999, 10).await;

        let res = app
            .request(
                Method::PUT,
                &format!("/products/{id}"),
                Some(&admin),
                Some(json!({ "price_cents": 89999 })),
            )
            .await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["price_cents"], 89999);
        assert_eq!(res.body["name"], "Laptop");
        assert_eq!(res.body["stock_quantity"], 10);

        let res = app
            .request(Method::DELETE, &format!("/products/{id}"), Some(&admin), None)
            .await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["message"], "Product deleted");

        let res = app.get(&format!("/products/{id}"), &admin).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_bad_and_unknown_ids() {
        let app = TestApp::new().await;
        let admin = app.admin_token().await;

        let res = app.get("/products/not-a-uuid", &admin).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.body["code"], "INVALID_REFERENCE");

        let res = app
            .request(
                Method::DELETE,
                "/products/550e8400-e29b-41d4-a716-446655440000",
                Some(&admin),
                None,
            )
            .await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_create_validates() {
        let app = TestApp::new().await;
        let admin = app.admin_token().await;

        let res = app
            .post(
                "/products",
                &admin,
                json!({ "name": "Laptop", "price_cents": -1, "category": "Electronics" }),
            )
            .await;
        assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_requires_authentication() {
        let app = TestApp::new().await;
        let res = app.request(Method::GET, "/products", None, None).await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    }
}
