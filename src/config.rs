//! Service configuration, read from the environment (and `.env` if present).

use std::env;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_PAYMENT_URL: &str = "https://payment-api.free.beeceptor.com/payment";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_pool_size: u32,
    /// Endpoint of the external payment authority.
    pub payment_url: String,
    pub payment_timeout: Duration,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    Missing(String),

    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let parsed = |key: &str, default: &str| -> Result<u64, ConfigError> {
            lookup(key)
                .unwrap_or_else(|| default.to_string())
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        };

        let database_url =
            lookup("DATABASE_URL").ok_or_else(|| ConfigError::Missing("DATABASE_URL".into()))?;

        let port = u16::try_from(parsed("PORT", "8080")?)
            .map_err(|_| ConfigError::InvalidValue("PORT".into()))?;

        let db_pool_size = u32::try_from(parsed("DB_POOL_SIZE", "10")?)
            .ok()
            .filter(|size| *size > 0)
            .ok_or_else(|| ConfigError::InvalidValue("DB_POOL_SIZE".into()))?;

        let payment_url = lookup("PAYMENT_URL").unwrap_or_else(|| DEFAULT_PAYMENT_URL.to_string());
        if !payment_url.starts_with("http://") && !payment_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue("PAYMENT_URL".into()));
        }

        Ok(AppConfig {
            database_url,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            db_pool_size,
            payment_url,
            payment_timeout: Duration::from_secs(parsed("PAYMENT_TIMEOUT_SECS", "10")?),
        })
    }
}
