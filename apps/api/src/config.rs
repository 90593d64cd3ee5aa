//! API server configuration.
//!
//! Layered with the `config` crate, later sources winning:
//!
//! ```text
//! built-in defaults ──► bazaar.toml (optional) ──► BAZAAR_* environment
//! ```
//!
//! | Key                        | Env var                           | Default        |
//! |----------------------------|-----------------------------------|----------------|
//! | `http_port`                | `BAZAAR_HTTP_PORT`                | 5000           |
//! | `database_path`            | `BAZAAR_DATABASE_PATH`            | `bazaar.db`    |
//! | `database_max_connections` | `BAZAAR_DATABASE_MAX_CONNECTIONS` | 5              |
//! | `database_timeout_secs`    | `BAZAAR_DATABASE_TIMEOUT_SECS`    | 30             |
//! | `jwt_secret`               | `BAZAAR_JWT_SECRET`               | dev secret     |
//! | `token_lifetime_secs`      | `BAZAAR_TOKEN_LIFETIME_SECS`      | 259200 (3 d)   |
//! | `allow_admin_registration` | `BAZAAR_ALLOW_ADMIN_REGISTRATION` | false          |

use std::time::Duration;

use bazaar_db::DbConfig;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Signing secret used when none is configured. Never use in production.
pub const DEV_JWT_SECRET: &str = "bazaar-dev-secret-change-in-production";

/// Three days, in seconds.
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3 * 24 * 60 * 60;

/// API server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// HTTP listen port
    pub http_port: u16,

    /// SQLite database file
    pub database_path: String,

    /// Pool size
    pub database_max_connections: u32,

    /// Seconds to wait for a pooled connection
    pub database_timeout_secs: u64,

    /// HS256 signing secret for session tokens
    pub jwt_secret: String,

    /// Session token lifetime in seconds
    pub token_lifetime_secs: i64,

    /// Whether `POST /api/auth/register` may create admin accounts
    pub allow_admin_registration: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            http_port: 5000,
            database_path: "bazaar.db".to_string(),
            database_max_connections: 5,
            database_timeout_secs: 30,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_lifetime_secs: DEFAULT_TOKEN_LIFETIME_SECS,
            allow_admin_registration: false,
        }
    }
}

impl ApiConfig {
    /// Load configuration from `bazaar.toml` (if present) and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("bazaar")
    }

    /// Same as [`ApiConfig::load`] with an explicit file stem.
    pub fn load_from(file_stem: &str) -> Result<Self, ConfigError> {
        let defaults = ApiConfig::default();

        let config: ApiConfig = Config::builder()
            .set_default("http_port", i64::from(defaults.http_port))?
            .set_default("database_path", defaults.database_path)?
            .set_default(
                "database_max_connections",
                i64::from(defaults.database_max_connections),
            )?
            .set_default("database_timeout_secs", defaults.database_timeout_secs)?
            .set_default("jwt_secret", defaults.jwt_secret)?
            .set_default("token_lifetime_secs", defaults.token_lifetime_secs)?
            .set_default("allow_admin_registration", defaults.allow_admin_registration)?
            .add_source(File::with_name(file_stem).required(false))
            .add_source(Environment::with_prefix("BAZAAR").try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.validate()?;

        if config.jwt_secret == DEV_JWT_SECRET {
            warn!("Using the development JWT secret; set BAZAAR_JWT_SECRET in production");
        }

        Ok(config)
    }

    /// Rejects settings the server cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::InvalidValue("jwt_secret".to_string()));
        }

        if self.token_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("token_lifetime_secs".to_string()));
        }

        if self.database_max_connections == 0 {
            return Err(ConfigError::InvalidValue("database_max_connections".to_string()));
        }

        Ok(())
    }

    /// Pool settings for the configured database file.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path)
            .max_connections(self.database_max_connections)
            .connect_timeout(Duration::from_secs(self.database_timeout_secs))
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}
