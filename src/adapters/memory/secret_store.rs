//! In-memory secret store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::DomainError;
use crate::ports::SecretStore;

/// Holds parameters by full name and counts reads, so tests can assert
/// that cached lookups never reach the store.
#[derive(Debug, Default)]
pub struct InMemorySecretStore {
    parameters: Arc<RwLock<HashMap<String, String>>>,
    reads: AtomicU32,
}

impl InMemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, name: impl Into<String>, value: impl Into<String>) {
        self.parameters.write().await.insert(name.into(), value.into());
    }

    pub async fn remove(&self, name: &str) {
        self.parameters.write().await.remove(name);
    }

    /// Number of `parameters_by_path` calls served.
    pub fn reads(&self) -> u32 {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecretStore for InMemorySecretStore {
    async fn parameters_by_path(&self, path: &str) -> Result<HashMap<String, String>, DomainError> {
        self.reads.fetch_add(1, Ordering::SeqCst);

        let parameters = self.parameters.read().await;
        Ok(parameters
            .iter()
            .filter_map(|(name, value)| {
                name.strip_prefix(path)
                    .filter(|rest| !rest.is_empty() && !rest.contains('/'))
                    .map(|rest| (rest.to_string(), value.clone()))
            })
            .collect())
    }
}
