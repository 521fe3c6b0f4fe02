//! # Seed
//!
//! Creates the default admin and employee accounts and a few starter
//! products. Safe to run repeatedly; anything already present is left alone.
//!
//! ```bash
//! DATABASE_PATH=./stockroom.db cargo run -p stockroom-api --bin seed
//! ```
//!
//! Passwords come from `SEED_ADMIN_PASSWORD` / `SEED_EMPLOYEE_PASSWORD`.

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use stockroom_api::auth::hash_password;
use stockroom_api::ApiConfig;
use stockroom_core::{Caller, NewProduct, NewUser, ProductFilter, Role, User};
use stockroom_db::Database;

const STARTER_PRODUCTS: &[(&str, &str, i64, i64, i64)] = &[
    ("Laptop", "15 inch, 16GB RAM", 99999, 10, 3),
    ("Mouse", "Wireless optical mouse", 2999, 50, 10),
    ("Keyboard", "Mechanical keyboard", 7999, 25, 5),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ApiConfig::load().context("Failed to load configuration")?;
    let db = Database::new(config.db_config())
        .await
        .context("Failed to open database")?;

    let admin = ensure_user(
        &db,
        Role::Admin,
        "admin@example.com",
        "Administrator",
        &env_or("SEED_ADMIN_PASSWORD", "Admin123!"),
    )
    .await?;
    ensure_user(
        &db,
        Role::Employee,
        "employee@example.com",
        "Employee",
        &env_or("SEED_EMPLOYEE_PASSWORD", "Employee123!"),
    )
    .await?;

    let products = db.products();
    if let Some(admin) = admin.filter(|admin| admin.role == Role::Admin) {
        if !products.search(&ProductFilter::default()).await?.is_empty() {
            info!("Catalog not empty, skipping products");
            db.close().await;
            return Ok(());
        }

        let caller = Caller::from(&admin);
        for (name, description, price_cents, stock, threshold) in STARTER_PRODUCTS {
            products
                .create(
                    &caller,
                    &NewProduct {
                        name: name.to_string(),
                        description: Some(description.to_string()),
                        price_cents: *price_cents,
                        category: "Electronics".to_string(),
                        stock_quantity: Some(*stock),
                        low_stock_threshold: Some(*threshold),
                    },
                )
                .await?;
        }
        info!(count = STARTER_PRODUCTS.len(), "Seeded products");
    } else {
        info!("No seeded admin account, skipping products");
    }

    db.close().await;
    info!("Seeding complete");
    Ok(())
}

/// Creates the account when no user of `role` exists yet. Returns whatever
/// is stored at `email`.
async fn ensure_user(
    db: &Database,
    role: Role,
    email: &str,
    name: &str,
    password: &str,
) -> anyhow::Result<Option<User>> {
    let users = db.users();

    if users.count_by_role(role).await? == 0 {
        let user = users
            .create(&NewUser {
                email: email.to_string(),
                name: name.to_string(),
                role,
                password_hash: hash_password(password)?,
            })
            .await?;
        info!(%email, %role, "Created user");
        return Ok(Some(user));
    }

    info!(%role, "Role already has an account, skipping");
    Ok(users.find_by_email(email).await?)
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
