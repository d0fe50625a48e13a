/**
 * Server Configuration
 *
 * This module loads the server configuration from environment variables
 * (after `dotenv` has merged any `.env` file) and opens the optional
 * PostgreSQL connection.
 *
 * # Variables
 *
 * | Variable                 | Default  | Meaning                                 |
 * |--------------------------|----------|-----------------------------------------|
 * | `SERVER_PORT`            | `8080`   | TCP port to listen on                   |
 * | `DATABASE_URL`           | unset    | Postgres URL; unset disables DB routes  |
 * | `HEARTBEAT_TIMEOUT_SECS` | `60`     | Presence timeout per connection         |
 * | `REGISTRY_SWEEP_SECS`    | `300`    | Interval of the empty-registry sweep    |
 * | `STATIC_DIR`             | `public` | Directory served under `/static`        |
 *
 * `JWT_SECRET` is read by `auth::sessions`.
 *
 * # Error Handling
 *
 * Malformed numeric values are a `ConfigError` and stop startup. A missing
 * or unreachable database is not: it is logged and the server continues
 * without database features.
 */
use sqlx::PgPool;
use std::time::Duration;
use thiserror::Error;

use crate::backend::realtime::RealtimeConfig;

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a positive integer, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },
}

/// Everything the server needs to start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub database_url: Option<String>,
    pub heartbeat_timeout: Duration,
    pub sweep_interval: Duration,
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let realtime = RealtimeConfig::default();
        Self {
            port: 8080,
            database_url: None,
            heartbeat_timeout: realtime.heartbeat_timeout,
            sweep_interval: realtime.sweep_interval,
            static_dir: "public".to_string(),
        }
    }
}

fn parse_positive<T>(name: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialEq + Default,
{
    let Some(value) = value else {
        return Ok(default);
    };
    match value.trim().parse::<T>() {
        Ok(parsed) if parsed != T::default() => Ok(parsed),
        _ => Err(ConfigError::InvalidNumber { name, value }),
    }
}

impl ServerConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = parse_positive("SERVER_PORT", lookup("SERVER_PORT"), defaults.port)?;
        let heartbeat_secs = parse_positive(
            "HEARTBEAT_TIMEOUT_SECS",
            lookup("HEARTBEAT_TIMEOUT_SECS"),
            defaults.heartbeat_timeout.as_secs(),
        )?;
        let sweep_secs = parse_positive(
            "REGISTRY_SWEEP_SECS",
            lookup("REGISTRY_SWEEP_SECS"),
            defaults.sweep_interval.as_secs(),
        )?;

        Ok(Self {
            port,
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            heartbeat_timeout: Duration::from_secs(heartbeat_secs),
            sweep_interval: Duration::from_secs(sweep_secs),
            static_dir: lookup("STATIC_DIR").unwrap_or(defaults.static_dir),
        })
    }

    /// Realtime tunables derived from this configuration
    pub fn realtime(&self) -> RealtimeConfig {
        RealtimeConfig {
            heartbeat_timeout: self.heartbeat_timeout,
            sweep_interval: self.sweep_interval,
        }
    }
}

/// Connect to the database and run migrations
///
/// Returns `None` when no URL is configured or the connection fails.
/// Migration failures are logged but do not disable the pool.
pub async fn load_database(database_url: Option<&str>) -> Option<PgPool> {
    let Some(database_url) = database_url else {
        tracing::warn!("[Server] DATABASE_URL not set. Database features will be disabled.");
        return None;
    };

    tracing::info!("[Server] Connecting to database...");

    let pool = match PgPool::connect(database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("[Server] Failed to create database connection pool: {}", e);
            tracing::warn!("[Server] Database features will be disabled.");
            return None;
        }
    };

    match sqlx::migrate!().run(&pool).await {
        Ok(()) => tracing::info!("[Server] Database migrations completed"),
        Err(e) => {
            tracing::error!("[Server] Failed to run database migrations: {}", e);
            tracing::warn!("[Server] Continuing; the schema might not be up to date");
        }
    }

    Some(pool)
}
