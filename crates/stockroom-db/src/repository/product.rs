//! # Product Repository
//!
//! The Catalog Manager: CRUD and filtered search over products.
//!
//! ## Search
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How Product Search Works                             │
//! │                                                                         │
//! │  GET /products?q=lap&category=Electronics&low_stock=true               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ProductFilter { q, category, min/max price, low_stock }               │
//! │       │                                                                 │
//! │       ▼  each present structured filter adds one AND clause            │
//! │  SELECT ... FROM products WHERE 1 = 1                                  │
//! │     AND category = 'Electronics'                                       │
//! │     AND stock_quantity <= low_stock_threshold                          │
//! │  ORDER BY name                                                          │
//! │       │                                                                 │
//! │       ▼  q: Unicode lowercase substring of name OR description         │
//! │  rows kept in Rust (SQLite lower() only folds ASCII)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info};

use crate::error::DbResult;
use stockroom_core::validation::{validate_new_product, validate_product_update};
use stockroom_core::{
    Caller, CoreError, NewProduct, Product, ProductFilter, ProductUpdate, RecordId,
    DEFAULT_LOW_STOCK_THRESHOLD,
};

pub(crate) const PRODUCT_COLUMNS: &str = "id, name, description, price_cents, category, \
     stock_quantity, low_stock_threshold, created_at, updated_at";

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Creates a product (admin only).
    ///
    /// Stock defaults to 0 and the low-stock threshold to 5 when absent.
    pub async fn create(&self, caller: &Caller, product: &NewProduct) -> DbResult<Product> {
        caller.require_admin()?;
        validate_new_product(product)?;

        let now = Utc::now();
        let product = Product {
            id: RecordId::new(),
            name: product.name.trim().to_string(),
            description: product.description.clone(),
            price_cents: product.price_cents,
            category: product.category.trim().to_string(),
            stock_quantity: product.stock_quantity.unwrap_or(0),
            low_stock_threshold: product
                .low_stock_threshold
                .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD),
            created_at: now,
            updated_at: now,
        };

        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, description, price_cents, category,
                stock_quantity, low_stock_threshold, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(product.id.to_string())
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(&product.category)
        .bind(product.stock_quantity)
        .bind(product.low_stock_threshold)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        info!(id = %product.id, name = %product.name, "Product created");
        Ok(product)
    }

    /// Looks up a product by an already validated id.
    pub async fn find(&self, id: RecordId) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by raw id.
    ///
    /// ## Returns
    /// * `InvalidReference` - `id` is not a record id
    /// * `ProductNotFound` - no such product
    pub async fn get(&self, id: &str) -> DbResult<Product> {
        let id = RecordId::parse(id)?;
        self.find(id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()).into())
    }

    /// Lists products matching every present filter, ordered by name.
    pub async fn search(&self, filter: &ProductFilter) -> DbResult<Vec<Product>> {
        debug!(?filter, "Searching products");

        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE 1 = 1"));

        if let Some(category) = &filter.category {
            query.push(" AND category = ").push_bind(category.clone());
        }

        if let Some(min) = filter.min_price_cents {
            query.push(" AND price_cents >= ").push_bind(min);
        }

        if let Some(max) = filter.max_price_cents {
            query.push(" AND price_cents <= ").push_bind(max);
        }

        if filter.low_stock == Some(true) {
            query.push(" AND stock_quantity <= low_stock_threshold");
        }

        query.push(" ORDER BY name ASC, id ASC");

        let mut products = query
            .build_query_as::<Product>()
            .fetch_all(&self.pool)
            .await?;

        if let Some(q) = filter.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let needle = q.to_lowercase();
            products.retain(|product| matches_text(product, &needle));
        }

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Applies a partial update (admin only). Absent fields keep their value.
    pub async fn update(
        &self,
        caller: &Caller,
        id: &str,
        update: &ProductUpdate,
    ) -> DbResult<Product> {
        caller.require_admin()?;
        let id = RecordId::parse(id)?;
        validate_product_update(update)?;

        if update.is_empty() {
            return self.get(&id.to_string()).await;
        }

        debug!(id = %id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = COALESCE(?2, name),
                description = COALESCE(?3, description),
                price_cents = COALESCE(?4, price_cents),
                category = COALESCE(?5, category),
                stock_quantity = COALESCE(?6, stock_quantity),
                low_stock_threshold = COALESCE(?7, low_stock_threshold),
                updated_at = ?8
            WHERE id = ?1
            "#,
        )
        .bind(id.to_string())
        .bind(update.name.as_deref().map(str::trim))
        .bind(&update.description)
        .bind(update.price_cents)
        .bind(update.category.as_deref().map(str::trim))
        .bind(update.stock_quantity)
        .bind(update.low_stock_threshold)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ProductNotFound(id.to_string()).into());
        }

        self.get(&id.to_string()).await
    }

    /// Permanently removes a product (admin only). Past sales keep their
    /// line items.
    pub async fn delete(&self, caller: &Caller, id: &str) -> DbResult<()> {
        caller.require_admin()?;
        let id = RecordId::parse(id)?;

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ProductNotFound(id.to_string()).into());
        }

        info!(id = %id, "Product deleted");
        Ok(())
    }

    /// Whether the catalog has no products at all (used by seeding).
    pub async fn is_empty(&self) -> DbResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count == 0)
    }
}

/// Case-insensitive substring match on name or description. `needle` is
/// already lowercased.
fn matches_text(product: &Product, needle: &str) -> bool {
    product.name.to_lowercase().contains(needle)
        || product
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(needle))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::repository::test_support::{admin, employee, new_product, product, test_db};
    use stockroom_core::ValidationError;

    fn filter() -> ProductFilter {
        ProductFilter::default()
    }

    #[tokio::test]
    async fn test_create_applies_defaults() {
        let db = test_db().await;
        let admin = admin(&db).await;

        let created = db
            .products()
            .create(
                &admin,
                &NewProduct {
                    name: "Cable".to_string(),
                    description: None,
                    price_cents: 999,
                    category: "Accessories".to_string(),
                    stock_quantity: None,
                    low_stock_threshold: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(created.stock_quantity, 0);
        assert_eq!(created.low_stock_threshold, 5);

        let fetched = db.products().get(&created.id.to_string()).await.unwrap();
        assert_eq!(fetched.name, "Cable");
        assert_eq!(fetched.price_cents, 999);
    }

    #[tokio::test]
    async fn test_create_requires_admin() {
        let db = test_db().await;
        let clerk = employee(&db, "clerk@example.com").await;

        let err = db
            .products()
            .create(&clerk, &new_product("Laptop", 99999, 10, 3))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_negative_stock() {
        let db = test_db().await;
        let admin = admin(&db).await;

        let err = db
            .products()
            .create(&admin, &new_product("Laptop", 99999, -1, 3))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
    }

    #[tokio::test]
    async fn test_get_distinguishes_malformed_and_missing() {
        let db = test_db().await;

        let err = db.products().get("not-an-id").await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::InvalidReference(_))));

        let err = db
            .products()
            .get(&RecordId::new().to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::ProductNotFound(_))));
    }

    #[tokio::test]
    async fn test_search_text_matches_name_or_description_case_insensitively() {
        let db = test_db().await;
        let admin = admin(&db).await;
        product(&db, "Laptop", 99999, 10, 3).await;
        product(&db, "Mouse", 2999, 50, 10).await;
        db.products()
            .create(
                &admin,
                &NewProduct {
                    description: Some("Mechanical, works with any LAPTOP".to_string()),
                    ..new_product("Keyboard", 7999, 25, 5)
                },
            )
            .await
            .unwrap();

        let found = db
            .products()
            .search(&ProductFilter {
                q: Some("lApToP".to_string()),
                ..filter()
            })
            .await
            .unwrap();

        let names: Vec<_> = found.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Keyboard", "Laptop"]);
    }

    #[tokio::test]
    async fn test_search_folds_non_ascii_case() {
        let db = test_db().await;
        let admin = admin(&db).await;
        product(&db, "CAFÉ CRÈME", 450, 20, 5).await;
        product(&db, "Cafe Latte", 500, 20, 5).await;
        db.products()
            .create(
                &admin,
                &NewProduct {
                    description: Some("Tasse für ÜBERGRÖSSE Getränke".to_string()),
                    ..new_product("Mug", 1200, 10, 2)
                },
            )
            .await
            .unwrap();

        let search = |q: &str| ProductFilter {
            q: Some(q.to_string()),
            ..filter()
        };

        let found = db.products().search(&search("café")).await.unwrap();
        let names: Vec<_> = found.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["CAFÉ CRÈME"]);

        let found = db.products().search(&search("crème")).await.unwrap();
        assert_eq!(found.len(), 1);

        let found = db.products().search(&search("übergrö")).await.unwrap();
        let names: Vec<_> = found.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Mug"]);
    }

    #[tokio::test]
    async fn test_search_filters_combine_with_and() {
        let db = test_db().await;
        let admin = admin(&db).await;
        product(&db, "Laptop", 99999, 10, 3).await;
        product(&db, "Mouse", 2999, 50, 10).await;
        product(&db, "Keyboard", 7999, 5, 5).await;
        db.products()
            .create(
                &admin,
                &NewProduct {
                    category: "Furniture".to_string(),
                    ..new_product("Desk", 5000, 1, 2)
                },
            )
            .await
            .unwrap();

        let by_category = db
            .products()
            .search(&ProductFilter {
                category: Some("Electronics".to_string()),
                ..filter()
            })
            .await
            .unwrap();
        assert_eq!(by_category.len(), 3);

        let by_price = db
            .products()
            .search(&ProductFilter {
                min_price_cents: Some(2999),
                max_price_cents: Some(7999),
                ..filter()
            })
            .await
            .unwrap();
        let names: Vec<_> = by_price.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Desk", "Keyboard", "Mouse"]);

        let low_electronics = db
            .products()
            .search(&ProductFilter {
                category: Some("Electronics".to_string()),
                low_stock: Some(true),
                ..filter()
            })
            .await
            .unwrap();
        let names: Vec<_> = low_electronics.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Keyboard"]);

        let everything = db
            .products()
            .search(&ProductFilter {
                low_stock: Some(false),
                ..filter()
            })
            .await
            .unwrap();
        assert_eq!(everything.len(), 4);
    }

    #[tokio::test]
    async fn test_partial_update_leaves_absent_fields() {
        let db = test_db().await;
        let admin = admin(&db).await;
        let laptop = product(&db, "Laptop", 99999, 10, 3).await;

        let updated = db
            .products()
            .update(
                &admin,
                &laptop.id.to_string(),
                &ProductUpdate {
                    price_cents: Some(89999),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.price_cents, 89999);
        assert_eq!(updated.name, "Laptop");
        assert_eq!(updated.stock_quantity, 10);
        assert_eq!(updated.low_stock_threshold, 3);
        assert!(updated.updated_at >= laptop.updated_at);
    }

    #[tokio::test]
    async fn test_empty_update_returns_current_product() {
        let db = test_db().await;
        let admin = admin(&db).await;
        let laptop = product(&db, "Laptop", 99999, 10, 3).await;

        let same = db
            .products()
            .update(&admin, &laptop.id.to_string(), &ProductUpdate::default())
            .await
            .unwrap();
        assert_eq!(same.id, laptop.id);
        assert_eq!(same.name, laptop.name);
        assert_eq!(same.price_cents, laptop.price_cents);
        assert_eq!(same.stock_quantity, laptop.stock_quantity);
    }

    #[tokio::test]
    async fn test_update_missing_product() {
        let db = test_db().await;
        let admin = admin(&db).await;

        let err = db
            .products()
            .update(
                &admin,
                &RecordId::new().to_string(),
                &ProductUpdate {
                    name: Some("Ghost".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::ProductNotFound(_))));
    }

    #[tokio::test]
    async fn test_delete() {
        let db = test_db().await;
        let admin = admin(&db).await;
        let laptop = product(&db, "Laptop", 99999, 10, 3).await;

        db.products()
            .delete(&admin, &laptop.id.to_string())
            .await
            .unwrap();
        assert!(db.products().find(laptop.id).await.unwrap().is_none());

        let err = db
            .products()
            .delete(&admin, &laptop.id.to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::ProductNotFound(_))));

        let err = db.products().delete(&admin, "42").await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::InvalidReference(_))));
    }

    #[tokio::test]
    async fn test_is_empty() {
        let db = test_db().await;
        assert!(db.products().is_empty().await.unwrap());
        product(&db, "Laptop", 99999, 10, 3).await;
        assert!(!db.products().is_empty().await.unwrap());
    }
}
