//! # Stockroom API
//!
//! HTTP server for the Stockroom inventory and point-of-sale backend.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           API Services                                  │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  auth          │  │  products      │  │  sales                     ││
//! │  │                │  │                │  │                            ││
//! │  │ • register     │  │ • create (adm) │  │ • create                   ││
//! │  │ • login/logout │  │ • search / get │  │ • list / get (scoped)      ││
//! │  │ • me           │  │ • update (adm) │  │ • cancel (owner or admin)  ││
//! │  │                │  │ • delete (adm) │  │                            ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────┐            │
//! │  │  customers     │  │  analytics     │  │  health        │            │
//! │  │  (admin)       │  │ • dashboard    │  │                │            │
//! │  │ • create/list  │  │ • reports      │  │ • db check     │            │
//! │  │ • summary      │  │ • top / low    │  │                │            │
//! │  └────────────────┘  └────────────────┘  └────────────────┘            │
//! │                                                                         │
//! │  Every handler gets a `CurrentCaller` from the access gate and passes   │
//! │  it down; role checks happen in the repositories.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! See [`config::ApiConfig`] for the environment variables.

pub mod auth;
pub mod config;
pub mod error;
pub mod services;

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

// Re-exports
pub use auth::{CurrentCaller, JwtManager};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use stockroom_db::Database;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtManager>,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    pub fn new(db: Database, config: ApiConfig) -> Self {
        let jwt = JwtManager::new(&config.jwt_secret, config.jwt_access_lifetime_secs);
        AppState {
            db,
            jwt: Arc::new(jwt),
            config: Arc::new(config),
        }
    }
}

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(services::health_service::routes())
        .nest("/auth", services::auth_service::routes())
        .nest("/products", services::product_service::routes())
        .nest("/customers", services::customer_service::routes())
        .nest("/sales", services::sale_service::routes())
        .nest("/analytics", services::analytics_service::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
