//! Secret store configuration

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use super::error::ValidationError;

/// Where tenant credentials are read from and how long they are cached.
#[derive(Debug, Clone, Deserialize)]
pub struct SecretsConfig {
    /// YAML file mapping parameter paths to values
    pub file: Option<PathBuf>,

    /// Tenant parameters live under `{path_prefix}/{tenant_id}/`
    #[serde(default = "default_path_prefix")]
    pub path_prefix: String,

    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
}

impl SecretsConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.path_prefix.starts_with('/') {
            return Err(ValidationError::InvalidPathPrefix);
        }
        Ok(())
    }
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            file: None,
            path_prefix: default_path_prefix(),
            cache_ttl_secs: default_cache_ttl(),
        }
    }
}

fn default_path_prefix() -> String {
    "/tollgate/tenants".to_string()
}

fn default_cache_ttl() -> u64 {
    300
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secrets_config_defaults() {
        let config = SecretsConfig::default();
        assert!(config.file.is_none());
        assert_eq!(config.path_prefix, "/tollgate/tenants");
        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_relative_prefix_is_rejected() {
        let config = SecretsConfig {
            path_prefix: "tollgate/tenants".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
