//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `TOLLGATE` prefix and nested values use double underscores as separators.
//!
//! Tenant credentials never appear here; they are read per tenant from the
//! secret store.
//!
//! # Example
//!
//! ```no_run
//! use tollgate::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod error;
mod payment;
mod secrets;
mod server;
mod storage;
mod telegram;

pub use error::{ConfigError, ValidationError};
pub use payment::PaymentConfig;
pub use secrets::SecretsConfig;
pub use server::{Environment, ServerConfig};
pub use storage::{PostgresStoreConfig, StorageBackend, StorageConfig};
pub use telegram::TelegramConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a runnable
/// in-memory development setup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, logging)
    #[serde(default)]
    pub server: ServerConfig,

    /// Item store backend (memory or PostgreSQL)
    #[serde(default)]
    pub storage: StorageConfig,

    /// Secret store location and cache lifetime
    #[serde(default)]
    pub secrets: SecretsConfig,

    /// Telegram Bot API endpoint
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Payment provider settings
    #[serde(default)]
    pub payment: PaymentConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `TOLLGATE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `TOLLGATE__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `TOLLGATE__STORAGE__POSTGRES__URL=...` -> `storage.postgres.url = ...`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("TOLLGATE")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.storage.validate()?;
        self.secrets.validate()?;
        self.telegram.validate()?;
        self.payment.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
