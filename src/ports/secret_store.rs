//! SecretStore port - Hierarchical parameter store holding tenant credentials.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::domain::foundation::DomainError;

#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Reads every parameter under `path` (which ends in `/`).
    ///
    /// Keys in the returned map are relative to `path`. A path with no
    /// parameters yields an empty map, not an error.
    async fn parameters_by_path(&self, path: &str) -> Result<HashMap<String, String>, DomainError>;
}
