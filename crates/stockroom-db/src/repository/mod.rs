//! # Repository Module
//!
//! Database repository implementations for Stockroom.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  db.sales().create_sale(&caller, &request)                     │
//! │       ▼                                                                 │
//! │  SaleRepository (Sales Engine)                                         │
//! │  ├── create_sale(&self, caller, request)                               │
//! │  ├── cancel_sale(&self, caller, id)                                    │
//! │  └── list_sales(&self, caller)                                         │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  SQL lives here and nowhere else. Callers pass a resolved `Caller`;    │
//! │  repositories ask it for scope and admin rights.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Catalog CRUD and search
//! - [`SaleRepository`](sale::SaleRepository) - Sales Engine
//! - [`AnalyticsRepository`](analytics::AnalyticsRepository) - Analytics Engine
//! - [`CustomerRepository`](customer::CustomerRepository) - Customers and their sales summary
//! - [`UserRepository`](user::UserRepository) - Accounts for authentication

pub mod analytics;
pub mod customer;
pub mod product;
pub mod sale;
pub mod user;
