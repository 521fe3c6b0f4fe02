//! API server configuration.
//!
//! Configuration is loaded from environment variables (optionally seeded from
//! a `.env` file) with fallback to defaults.

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use stockroom_db::DbConfig;

/// Signing secret used when `JWT_SECRET` is unset. Fine for local work only.
pub const DEV_JWT_SECRET: &str = "stockroom-dev-secret-change-in-production";

/// API server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Interface to bind
    pub bind_addr: String,

    /// HTTP port
    pub http_port: u16,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size
    pub db_max_connections: u32,

    /// Secret key for signing access tokens
    pub jwt_secret: String,

    /// Access token lifetime in seconds
    pub jwt_access_lifetime_secs: i64,

    /// Adds `Secure` to the session cookie
    pub cookie_secure: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            bind_addr: "0.0.0.0".to_string(),
            http_port: 8000,
            database_path: PathBuf::from("./stockroom.db"),
            db_max_connections: 5,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_access_lifetime_secs: 1800, // 30 minutes
            cookie_secure: false,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = ApiConfig::default();

        let config = ApiConfig {
            bind_addr: env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),

            http_port: parse_var("HTTP_PORT", defaults.http_port)?,

            database_path: env::var("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),

            db_max_connections: parse_var("DB_MAX_CONNECTIONS", defaults.db_max_connections)?,

            jwt_secret: env::var("JWT_SECRET").unwrap_or(defaults.jwt_secret),

            jwt_access_lifetime_secs: parse_var(
                "JWT_ACCESS_LIFETIME_SECS",
                defaults.jwt_access_lifetime_secs,
            )?,

            cookie_secure: parse_var("COOKIE_SECURE", defaults.cookie_secure)?,
        };

        if config.jwt_secret.is_empty() {
            return Err(ConfigError::MissingRequired("JWT_SECRET".to_string()));
        }
        if config.jwt_access_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue(
                "JWT_ACCESS_LIFETIME_SECS".to_string(),
            ));
        }

        Ok(config)
    }

    /// `host:port` to bind the listener on.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.http_port)
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path.clone()).max_connections(self.db_max_connections)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name.to_string())),
        Err(_) => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
