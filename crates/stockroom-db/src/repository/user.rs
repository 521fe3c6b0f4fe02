//! # User Repository
//!
//! Accounts used by authentication. Emails are stored normalized
//! (trimmed, lowercase) and are unique.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use stockroom_core::validation::{normalize_email, validate_email, validate_person_name};
use stockroom_core::{NewUser, RecordId, Role, User, ValidationError};

const USER_COLUMNS: &str = "id, email, name, role, password_hash, created_at";

fn duplicate_email(email: &str) -> DbError {
    ValidationError::Duplicate {
        field: "email".to_string(),
        value: email.to_string(),
    }
    .into()
}

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Stores a new account. The password must already be hashed.
    ///
    /// ## Errors
    /// * `Validation` - bad email or name
    /// * `Validation(Duplicate)` - email already registered
    pub async fn create(&self, new: &NewUser) -> DbResult<User> {
        validate_email(&new.email)?;
        validate_person_name(&new.name)?;

        let email = normalize_email(&new.email);
        if self.find_by_email(&email).await?.is_some() {
            return Err(duplicate_email(&email));
        }

        let user = User {
            id: RecordId::new(),
            email,
            name: new.name.trim().to_string(),
            role: new.role,
            password_hash: new.password_hash.clone(),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO users (id, email, name, role, password_hash, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&user.name)
        .bind(user.role)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            // Lost a race with a concurrent registration
            DbError::UniqueViolation { .. } => duplicate_email(&user.email),
            other => other,
        })?;

        info!(user_id = %user.id, email = %user.email, role = %user.role, "User created");
        Ok(user)
    }

    /// Looks a user up by email, case-insensitively.
    pub async fn find_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let email = normalize_email(email);
        debug!(%email, "Finding user by email");

        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?1"
        ))
        .bind(&email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn find(&self, id: RecordId) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?1"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Number of accounts holding `role`.
    pub async fn count_by_role(&self, role: Role) -> DbResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE role = ?1")
            .bind(role)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::test_db;
    use stockroom_core::CoreError;

    fn new_user(email: &str, role: Role) -> NewUser {
        NewUser {
            email: email.to_string(),
            name: "Sam Doe".to_string(),
            role,
            password_hash: "$argon2id$v=19$stub".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_normalizes_email() {
        let db = test_db().await;

        let user = db
            .users()
            .create(&new_user("  Sam@Example.COM ", Role::Employee))
            .await
            .unwrap();
        assert_eq!(user.email, "sam@example.com");

        let found = db
            .users()
            .find_by_email("SAM@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found.role, Role::Employee);
        assert_eq!(found.password_hash, "$argon2id$v=19$stub");

        let by_id = db.users().find(user.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, user.email);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let db = test_db().await;
        db.users()
            .create(&new_user("sam@example.com", Role::Employee))
            .await
            .unwrap();

        let err = db
            .users()
            .create(&new_user("SAM@example.com", Role::Admin))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::Validation(ValidationError::Duplicate { .. }))
        ));
    }

    #[tokio::test]
    async fn test_invalid_email_is_rejected() {
        let db = test_db().await;

        let err = db
            .users()
            .create(&new_user("not-an-email", Role::Employee))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::Validation(ValidationError::InvalidFormat { .. }))
        ));
    }

    #[tokio::test]
    async fn test_count_by_role() {
        let db = test_db().await;
        assert_eq!(db.users().count_by_role(Role::Admin).await.unwrap(), 0);

        db.users()
            .create(&new_user("a@example.com", Role::Admin))
            .await
            .unwrap();
        db.users()
            .create(&new_user("b@example.com", Role::Employee))
            .await
            .unwrap();
        db.users()
            .create(&new_user("c@example.com", Role::Employee))
            .await
            .unwrap();

        assert_eq!(db.users().count_by_role(Role::Admin).await.unwrap(), 1);
        assert_eq!(db.users().count_by_role(Role::Employee).await.unwrap(), 2);
        assert!(db.users().find(RecordId::new()).await.unwrap().is_none());
    }
}
