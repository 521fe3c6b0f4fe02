//! # Sale Endpoints
//!
//! Thin wrappers over the Sales Engine. The authenticated caller becomes the
//! sale's employee and decides which sales are visible.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use stockroom_core::{NewSale, Sale};

use crate::auth::CurrentCaller;
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub message: &'static str,
    pub sale: Sale,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_sales).post(create_sale))
        .route("/{id}", get(get_sale))
        .route("/{id}/cancel", post(cancel_sale))
}

async fn create_sale(
    State(state): State<AppState>,
    caller: CurrentCaller,
    Json(req): Json<NewSale>,
) -> ApiResult<(StatusCode, Json<Sale>)> {
    let sale = state.db.sales().create_sale(&caller, &req).await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

/// Admins see every sale, employees their own. Newest first.
async fn list_sales(
    State(state): State<AppState>,
    caller: CurrentCaller,
) -> ApiResult<Json<Vec<Sale>>> {
    Ok(Json(state.db.sales().list_sales(&caller).await?))
}

async fn get_sale(
    State(state): State<AppState>,
    caller: CurrentCaller,
    Path(id): Path<String>,
) -> ApiResult<Json<Sale>> {
    Ok(Json(state.db.sales().get_sale(&caller, &id).await?))
}

async fn cancel_sale(
    State(state): State<AppState>,
    caller: CurrentCaller,
    Path(id): Path<String>,
) -> ApiResult<Json<CancelResponse>> {
    let sale = state.db.sales().cancel_sale(&caller, &id).await?;
    Ok(Json(CancelResponse {
        message: "Sale cancelled and stock restored",
        sale,
    }))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};

    use crate::test_support::TestApp;

    fn sale_body(lines: &[(&str, i64, i64)]) -> Value {
        let items: Vec<Value> = lines
            .iter()
            .map(|(id, qty, price)| {
                json!({ "product_id": id, "quantity": qty, "price_at_sale_cents": price })
            })
            .collect();
        json!({ "items": items, "customer_name": "Walk-in" })
    }

    async fn stock(app: &TestApp, token: &str, id: &str) -> i64 {
        app.get(&format!("/products/{id}"), token).await.body["stock_quantity"]
            .as_i64()
            .unwrap()
    }

    #[tokio::test]
    async fn test_sell_and_cancel_round_trip() {
        let app = TestApp::new().await;
        let admin = app.admin_token().await;
        let clerk = app.employee_token("clerk@example.com").await;
        let laptop = app.product(&admin, "Laptop", 99999, 10).await;

        let res = app
            .post("/sales", &clerk, sale_body(&[(laptop.as_str(), 4, 5000)]))
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "{:?}", res.body);
        assert_eq!(res.body["total_amount_cents"], 20000);
        assert_eq!(res.body["status"], "completed");
        assert_eq!(res.body["customer_name"], "Walk-in");
        assert_eq!(stock(&app, &clerk, &laptop).await, 6);

        let sale_id = res.body["id"].as_str().unwrap().to_string();
        let res = app
            .request(Method::POST, &format!("/sales/{sale_id}/cancel"), Some(&clerk), None)
            .await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["sale"]["status"], "cancelled");
        assert_eq!(stock(&app, &clerk, &laptop).await, 10);

        let res = app
            .request(Method::POST, &format!("/sales/{sale_id}/cancel"), Some(&clerk), None)
            .await;
        assert_eq!(res.status, StatusCode::CONFLICT);
        assert_eq!(res.body["code"], "ALREADY_CANCELLED");
        assert_eq!(stock(&app, &clerk, &laptop).await, 10);
    }

    #[tokio::test]
    async fn test_insufficient_stock_keeps_earlier_lines() {
        let app = TestApp::new().await;
        let admin = app.admin_token().await;
        let laptop = app.product(&admin, "Laptop", 99999, 10).await;
        let mouse = app.product(&admin, "Mouse", 2999, 1).await;

        let lines = [(laptop.as_str(), 2, 99999), (mouse.as_str(), 3, 2999)];
        let res = app.post("/sales", &admin, sale_body(&lines)).await;
        assert_eq!(res.status, StatusCode::CONFLICT);
        assert_eq!(res.body["code"], "INSUFFICIENT_STOCK");
        assert!(res.body["message"].as_str().unwrap().contains("Mouse"));

        assert_eq!(stock(&app, &admin, &laptop).await, 8);
        assert_eq!(stock(&app, &admin, &mouse).await, 1);
        assert!(app.get("/sales", &admin).await.body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_bad_payloads() {
        let app = TestApp::new().await;
        let admin = app.admin_token().await;
        let laptop = app.product(&admin, "Laptop", 99999, 10).await;

        let res = app.post("/sales", &admin, json!({ "items": [] })).await;
        assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);

        let res = app
            .post("/sales", &admin, sale_body(&[(laptop.as_str(), 0, 99999)]))
            .await;
        assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);

        let res = app
            .post("/sales", &admin, sale_body(&[(laptop.as_str(), 2, i64::MAX)]))
            .await;
        assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");

        let lines = [(laptop.as_str(), 1, 99999), ("bogus", 1, 1)];
        let res = app.post("/sales", &admin, sale_body(&lines)).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.body["code"], "INVALID_REFERENCE");
        assert_eq!(stock(&app, &admin, &laptop).await, 10);

        let res = app
            .send(
                Request::post("/sales")
                    .header(header::AUTHORIZATION, format!("Bearer {admin}"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{ not json"))
                    .unwrap(),
            )
            .await;
        assert!(res.status.is_client_error());
    }

    #[tokio::test]
    async fn test_visibility_and_ownership() {
        let app = TestApp::new().await;
        let admin = app.admin_token().await;
        let alice = app.employee_token("alice@example.com").await;
        let bob = app.employee_token("bob@example.com").await;
        let laptop = app.product(&admin, "Laptop", 99999, 10).await;

        let res = app
            .post("/sales", &alice, sale_body(&[(laptop.as_str(), 1, 99999)]))
            .await;
        let sale_id = res.body["id"].as_str().unwrap().to_string();

        assert_eq!(app.get("/sales", &alice).await.body.as_array().unwrap().len(), 1);
        assert!(app.get("/sales", &bob).await.body.as_array().unwrap().is_empty());
        assert_eq!(app.get("/sales", &admin).await.body.as_array().unwrap().len(), 1);

        let res = app.get(&format!("/sales/{sale_id}"), &bob).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
        let res = app.get(&format!("/sales/{sale_id}"), &alice).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["items"][0]["quantity"], 1);

        let res = app
            .request(Method::POST, &format!("/sales/{sale_id}/cancel"), Some(&bob), None)
            .await;
        assert_eq!(res.status, StatusCode::FORBIDDEN);
        assert_eq!(res.body["code"], "FORBIDDEN");

        let res = app
            .request(Method::POST, &format!("/sales/{sale_id}/cancel"), Some(&admin), None)
            .await;
        assert_eq!(res.status, StatusCode::OK);
    }
}
