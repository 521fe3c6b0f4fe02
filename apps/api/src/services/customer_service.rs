//! Customer endpoints. All admin only.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use stockroom_core::{Customer, CustomerSalesSummary, NewCustomer};

use crate::auth::CurrentCaller;
use crate::error::ApiResult;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_customers).post(create_customer))
        .route("/analytics", get(sales_summary))
}

async fn create_customer(
    State(state): State<AppState>,
    caller: CurrentCaller,
    Json(req): Json<NewCustomer>,
) -> ApiResult<(StatusCode, Json<Customer>)> {
    let customer = state.db.customers().create(&caller, &req).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

async fn list_customers(
    State(state): State<AppState>,
    caller: CurrentCaller,
) -> ApiResult<Json<Vec<Customer>>> {
    Ok(Json(state.db.customers().list(&caller).await?))
}

async fn sales_summary(
    State(state): State<AppState>,
    caller: CurrentCaller,
) -> ApiResult<Json<CustomerSalesSummary>> {
    Ok(Json(state.db.customers().sales_summary(&caller).await?))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::test_support::TestApp;

    #[tokio::test]
    async fn test_admin_manages_customers() {
        let app = TestApp::new().await;
        let admin = app.admin_token().await;

        let res = app
            .post(
                "/customers",
                &admin,
                json!({ "name": "Ada Lovelace", "email": "ada@example.com" }),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED);
        assert_eq!(res.body["name"], "Ada Lovelace");

        let res = app.get("/customers", &admin).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body.as_array().unwrap().len(), 1);

        let res = app.get("/customers/analytics", &admin).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body, json!({ "total_sales_cents": 0, "count": 0 }));
    }

    #[tokio::test]
    async fn test_employees_are_refused() {
        let app = TestApp::new().await;
        let clerk = app.employee_token("clerk@example.com").await;

        for uri in ["/customers", "/customers/analytics"] {
            let res = app.get(uri, &clerk).await;
            assert_eq!(res.status, StatusCode::FORBIDDEN);
            assert_eq!(res.body["code"], "ADMIN_REQUIRED");
        }

        let res = app
            .post("/customers", &clerk, json!({ "name": "Ada" }))
            .await;
        assert_eq!(res.status, StatusCode::FORBIDDEN);
    }
}
