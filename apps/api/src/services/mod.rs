//! HTTP route handlers.
//!
//! One module per resource. Each exposes `routes()`, which `crate::router`
//! nests under the resource's path prefix.

pub mod analytics_service;
pub mod auth_service;
pub mod customer_service;
pub mod health_service;
pub mod product_service;
pub mod sale_service;
