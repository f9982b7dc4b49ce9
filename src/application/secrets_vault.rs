//! SecretsVault - Per-tenant credentials behind a TTL cache.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::foundation::TenantId;
use crate::domain::tenancy::{SecretsError, TenantSecrets};
use crate::ports::{Clock, SecretStore};

use super::cache::TtlCache;

/// Default secret-store path prefix; a tenant's parameters live under
/// `{prefix}/{tenant_id}/`.
pub const DEFAULT_PATH_PREFIX: &str = "/tollgate/tenants";

/// Default cache lifetime for a tenant's secrets.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

pub struct SecretsVault {
    store: Arc<dyn SecretStore>,
    cache: TtlCache<TenantId, Arc<TenantSecrets>>,
    path_prefix: String,
}

impl SecretsVault {
    pub fn new(
        store: Arc<dyn SecretStore>,
        clock: Arc<dyn Clock>,
        path_prefix: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            store,
            cache: TtlCache::new(ttl, clock),
            path_prefix: path_prefix.into().trim_end_matches('/').to_string(),
        }
    }

    fn tenant_path(&self, tenant_id: &TenantId) -> String {
        format!("{}/{}/", self.path_prefix, tenant_id)
    }

    /// Loads a tenant's secrets, serving from cache while the entry is fresh.
    ///
    /// Fails with [`SecretsError::MissingSecret`] when the Telegram bot token
    /// or webhook secret is absent. Failed loads are not cached.
    pub async fn get_tenant_secrets(
        &self,
        tenant_id: &TenantId,
    ) -> Result<Arc<TenantSecrets>, SecretsError> {
        if let Some(secrets) = self.cache.get(tenant_id).await {
            return Ok(secrets);
        }

        let path = self.tenant_path(tenant_id);
        let params = self
            .store
            .parameters_by_path(&path)
            .await
            .map_err(SecretsError::Store)?;

        let secrets = Arc::new(TenantSecrets::from_parameters(tenant_id, &params)?);
        tracing::debug!(
            tenant_id = %tenant_id,
            parameters = params.len(),
            "Loaded tenant secrets"
        );

        self.cache.insert(tenant_id.clone(), secrets.clone()).await;
        Ok(secrets)
    }
}
