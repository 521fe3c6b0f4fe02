//! # Customer Repository
//!
//! Customer records and the sales summary shown beside them. Admin only.
//!
//! Sales keep a free-text `customer_name`; nothing links them to these rows.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;
use stockroom_core::validation::validate_new_customer;
use stockroom_core::{Caller, Customer, CustomerSalesSummary, NewCustomer, RecordId};

/// Trims an optional field; blank becomes absent.
fn clean(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    pub async fn create(&self, caller: &Caller, new: &NewCustomer) -> DbResult<Customer> {
        caller.require_admin()?;
        validate_new_customer(new)?;

        let customer = Customer {
            id: RecordId::new(),
            name: new.name.trim().to_string(),
            email: clean(new.email.as_deref()),
            phone: clean(new.phone.as_deref()),
            address: clean(new.address.as_deref()),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO customers (id, name, email, phone, address, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(customer.id.to_string())
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.address)
        .bind(customer.created_at)
        .execute(&self.pool)
        .await?;

        info!(customer_id = %customer.id, name = %customer.name, "Customer created");
        Ok(customer)
    }

    /// All customers, alphabetically.
    pub async fn list(&self, caller: &Caller) -> DbResult<Vec<Customer>> {
        caller.require_admin()?;
        debug!("Listing customers");

        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, email, phone, address, created_at
            FROM customers
            ORDER BY name ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Totals over every completed sale.
    pub async fn sales_summary(&self, caller: &Caller) -> DbResult<CustomerSalesSummary> {
        caller.require_admin()?;

        let (count, total_sales_cents) = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT COUNT(*), COALESCE(SUM(total_amount_cents), 0)
            FROM sales
            WHERE status = 'completed'
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(CustomerSalesSummary {
            total_sales_cents,
            count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::repository::test_support::{admin, employee, product, test_db};
    use stockroom_core::{CoreError, NewSale, SaleLineRequest, ValidationError};

    fn named(name: &str) -> NewCustomer {
        NewCustomer {
            name: name.to_string(),
            email: None,
            phone: None,
            address: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_list_sorted() {
        let db = test_db().await;
        let admin = admin(&db).await;

        let zoe = db
            .customers()
            .create(
                &admin,
                &NewCustomer {
                    email: Some("  zoe@example.com ".to_string()),
                    phone: Some("   ".to_string()),
                    ..named("  Zoe ")
                },
            )
            .await
            .unwrap();
        assert_eq!(zoe.name, "Zoe");
        assert_eq!(zoe.email.as_deref(), Some("zoe@example.com"));
        assert_eq!(zoe.phone, None);

        db.customers().create(&admin, &named("Ada")).await.unwrap();

        let names: Vec<_> = db
            .customers()
            .list(&admin)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Ada", "Zoe"]);
    }

    #[tokio::test]
    async fn test_create_validates() {
        let db = test_db().await;
        let admin = admin(&db).await;

        let err = db.customers().create(&admin, &named("")).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::Validation(ValidationError::Required { .. }))
        ));

        let err = db
            .customers()
            .create(
                &admin,
                &NewCustomer {
                    email: Some("nope".to_string()),
                    ..named("Ada")
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::Validation(ValidationError::InvalidFormat { .. }))
        ));
    }

    #[tokio::test]
    async fn test_employees_are_refused() {
        let db = test_db().await;
        let clerk = employee(&db, "clerk@example.com").await;

        for err in [
            db.customers().create(&clerk, &named("Ada")).await.unwrap_err(),
            db.customers().list(&clerk).await.unwrap_err(),
            db.customers().sales_summary(&clerk).await.unwrap_err(),
        ] {
            assert!(matches!(err, DbError::Domain(CoreError::Unauthorized(_))));
        }
    }

    #[tokio::test]
    async fn test_sales_summary_counts_completed_only() {
        let db = test_db().await;
        let admin = admin(&db).await;
        let p = product(&db, "Laptop", 1000, 10, 3).await;

        let empty = db.customers().sales_summary(&admin).await.unwrap();
        assert_eq!(empty, CustomerSalesSummary::default());

        let sale = |qty| NewSale {
            items: vec![SaleLineRequest {
                product_id: p.id.to_string(),
                quantity: qty,
                price_at_sale_cents: 1000,
            }],
            customer_name: Some("Ada".to_string()),
        };
        db.sales().create_sale(&admin, &sale(1)).await.unwrap();
        let cancelled = db.sales().create_sale(&admin, &sale(2)).await.unwrap();
        db.sales()
            .cancel_sale(&admin, &cancelled.id.to_string())
            .await
            .unwrap();

        let summary = db.customers().sales_summary(&admin).await.unwrap();
        assert_eq!(summary.count, 1);
        assert_eq!(summary.total_sales_cents, 1000);
    }
}
