//! Storage backend configuration
//!
//! The ledger, directory and room registry share one item store. `memory`
//! needs no settings; `postgres` reads the `storage.postgres` table:
//!
//! ```text
//! TOLLGATE__STORAGE__BACKEND=postgres
//! TOLLGATE__STORAGE__POSTGRES__URL=postgres://tollgate@db/tollgate
//! TOLLGATE__STORAGE__POSTGRES__MIGRATE_ON_START=true
//! ```

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

const MAX_POOL_SIZE: u32 = 100;

/// Which item store backs the ledger and directory.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process-local store; state is lost on restart.
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Required when `backend = postgres`
    pub postgres: Option<PostgresStoreConfig>,
}

/// Connection settings for the JSONB item table.
#[derive(Debug, Clone, Deserialize)]
pub struct PostgresStoreConfig {
    pub url: String,

    #[serde(default = "default_pool_size")]
    pub pool_size: u32,

    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,

    /// Apply `migrations/` before serving.
    #[serde(default)]
    pub migrate_on_start: bool,
}

impl PostgresStoreConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            pool_size: default_pool_size(),
            acquire_timeout_secs: default_acquire_timeout(),
            migrate_on_start: false,
        }
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let scheme_ok = ["postgres://", "postgresql://"]
            .iter()
            .any(|scheme| self.url.starts_with(scheme));
        if self.url.is_empty() {
            return Err(ValidationError::MissingRequired("STORAGE__POSTGRES__URL"));
        }
        if !scheme_ok {
            return Err(ValidationError::InvalidDatabaseUrl);
        }
        if self.pool_size == 0 || self.pool_size > MAX_POOL_SIZE {
            return Err(ValidationError::InvalidPoolSize(MAX_POOL_SIZE));
        }
        if self.acquire_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl StorageConfig {
    /// Settings for the selected backend, if it needs any.
    pub fn postgres(&self) -> Result<Option<&PostgresStoreConfig>, ValidationError> {
        match (self.backend, &self.postgres) {
            (StorageBackend::Memory, _) => Ok(None),
            (StorageBackend::Postgres, Some(postgres)) => Ok(Some(postgres)),
            (StorageBackend::Postgres, None) => {
                Err(ValidationError::MissingRequired("STORAGE__POSTGRES__URL"))
            }
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.postgres()? {
            Some(postgres) => postgres.validate(),
            None => Ok(()),
        }
    }
}

fn default_pool_size() -> u32 {
    10
}

fn default_acquire_timeout() -> u64 {
    5
}
