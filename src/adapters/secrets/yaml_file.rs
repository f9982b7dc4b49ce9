//! File-backed secret store.
//!
//! Reads a flat YAML map of full parameter names to values:
//!
//! ```yaml
//! /tollgate/tenants/acme/telegram-bot-token: "123456:AA..."
//! /tollgate/tenants/acme/telegram-webhook-secret: "f3c1..."
//! ```
//!
//! The file is re-read on every call; `SecretsVault` caches in front of it.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use crate::domain::foundation::DomainError;
use crate::ports::SecretStore;

#[derive(Debug, Clone)]
pub struct YamlFileSecretStore {
    path: PathBuf,
}

impl YamlFileSecretStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SecretStore for YamlFileSecretStore {
    async fn parameters_by_path(&self, path: &str) -> Result<HashMap<String, String>, DomainError> {
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            DomainError::database(format!("Failed to read secret file: {}", e))
                .with_detail("file", self.path.display().to_string())
        })?;

        let all: BTreeMap<String, String> = serde_yaml::from_str(&contents).map_err(|e| {
            DomainError::database(format!("Failed to parse secret file: {}", e))
                .with_detail("file", self.path.display().to_string())
        })?;

        Ok(all
            .into_iter()
            .filter_map(|(name, value)| {
                let rest = name.strip_prefix(path)?;
                if rest.is_empty() || rest.contains('/') {
                    return None;
                }
                Some((rest.to_string(), value))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;
    use std::io::Write;

    fn secret_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn reads_parameters_under_path() {
        let file = secret_file(
            r#"
/tollgate/tenants/acme/telegram-bot-token: "123:abc"
/tollgate/tenants/acme/telegram-webhook-secret: "hook"
/tollgate/tenants/other/telegram-bot-token: "999:zzz"
"#,
        );
        let store = YamlFileSecretStore::new(file.path());

        let params = store
            .parameters_by_path("/tollgate/tenants/acme/")
            .await
            .unwrap();

        assert_eq!(params.len(), 2);
        assert_eq!(params["telegram-bot-token"], "123:abc");
        assert_eq!(params["telegram-webhook-secret"], "hook");
    }

    #[tokio::test]
    async fn tenant_without_parameters_is_empty() {
        let file = secret_file("/tollgate/tenants/acme/telegram-bot-token: \"1:a\"\n");
        let store = YamlFileSecretStore::new(file.path());

        let params = store.parameters_by_path("/tollgate/tenants/ghost/").await.unwrap();

        assert!(params.is_empty());
    }

    #[tokio::test]
    async fn missing_file_is_a_store_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = YamlFileSecretStore::new(dir.path().join("absent.yaml"));

        let err = store.parameters_by_path("/x/").await.unwrap_err();

        assert_eq!(err.code, ErrorCode::DatabaseError);
    }

    #[tokio::test]
    async fn malformed_yaml_is_a_store_error() {
        let file = secret_file("- just\n- a list\n");
        let store = YamlFileSecretStore::new(file.path());

        assert!(store.parameters_by_path("/x/").await.is_err());
    }
}
