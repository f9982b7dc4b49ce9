//! TenantDirectory - Resolves a tenant from the keys inbound traffic carries.
//!
//! Every lookup is a point read or a single index query. A miss is
//! `Ok(None)`; callers treat it as an authorization failure.

use std::sync::Arc;

use crate::domain::foundation::{ChatId, DomainError, TelegramUserId, TenantId};
use crate::domain::subscription::{PaymentProvider, ProviderMapping};
use crate::domain::tenancy::{Room, Tenant};
use crate::ports::{ItemStore, PutRequest, WriteOutcome};

use super::schema;

pub struct TenantDirectory {
    store: Arc<dyn ItemStore>,
}

impl TenantDirectory {
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self { store }
    }

    pub async fn tenant(&self, tenant_id: &TenantId) -> Result<Option<Tenant>, DomainError> {
        self.store
            .get(&schema::tenant_key(tenant_id))
            .await?
            .map(schema::decode)
            .transpose()
    }

    /// Tenant owning the opaque Telegram webhook secret.
    pub async fn resolve_by_webhook_secret(
        &self,
        secret: &str,
    ) -> Result<Option<TenantId>, DomainError> {
        if secret.is_empty() {
            return Ok(None);
        }
        let pointer = self
            .store
            .get(&schema::webhook_secret_key(secret))
            .await?
            .map(schema::decode::<schema::TenantPointer>)
            .transpose()?;
        Ok(pointer.map(|p| p.tenant_id))
    }

    /// Tenant and Telegram user a provider customer/payer id belongs to.
    ///
    /// Payer ids are not unique across merchants. When the id is mapped in
    /// more than one tenant this returns `None`; webhook routing knows its
    /// tenant and uses [`SubscriptionLedger::lookup_by_provider_customer`].
    ///
    /// [`SubscriptionLedger::lookup_by_provider_customer`]: super::SubscriptionLedger::lookup_by_provider_customer
    pub async fn resolve_by_provider_customer(
        &self,
        provider: PaymentProvider,
        customer_id: &str,
    ) -> Result<Option<(TenantId, TelegramUserId)>, DomainError> {
        let mappings = self
            .store
            .query_index(&schema::customer_index_pk(provider, customer_id), None)
            .await?
            .into_iter()
            .map(schema::decode::<ProviderMapping>)
            .collect::<Result<Vec<_>, _>>()?;

        match mappings.as_slice() {
            [] => Ok(None),
            [mapping] => Ok(Some((mapping.tenant_id.clone(), mapping.telegram_user_id))),
            _ => {
                tracing::warn!(
                    provider = %provider,
                    tenants = mappings.len(),
                    "Provider customer is mapped in several tenants"
                );
                Ok(None)
            }
        }
    }

    /// Room bound to a Telegram group, whichever tenant owns it.
    pub async fn resolve_by_chat_group_id(
        &self,
        group_id: ChatId,
    ) -> Result<Option<Room>, DomainError> {
        let items = self
            .store
            .query_index(&schema::group_index_pk(group_id), Some(schema::ROOM_INDEX_SK))
            .await?;
        items.into_iter().next().map(schema::decode).transpose()
    }

    pub async fn resolve_by_identity_subject(
        &self,
        subject: &str,
    ) -> Result<Option<Tenant>, DomainError> {
        let items = self
            .store
            .query_index(&schema::identity_index_pk(subject), Some(schema::TENANT_INDEX_SK))
            .await?;
        items.into_iter().next().map(schema::decode).transpose()
    }

    /// Provisions a tenant and its Telegram webhook secret mapping.
    ///
    /// Both records are created only if absent; an existing tenant id or a
    /// reused secret leaves the store untouched and returns `ConditionFailed`.
    pub async fn register(
        &self,
        tenant: &Tenant,
        webhook_secret: &str,
    ) -> Result<WriteOutcome, DomainError> {
        let outcome = self
            .store
            .transact_put(vec![
                PutRequest::if_absent(schema::tenant_item(tenant)?),
                PutRequest::if_absent(schema::webhook_secret_item(
                    webhook_secret,
                    &tenant.tenant_id,
                )?),
            ])
            .await?;

        if outcome == WriteOutcome::ConditionFailed {
            tracing::warn!(
                tenant_id = %tenant.tenant_id,
                "Tenant or webhook secret already registered"
            );
        }
        Ok(outcome)
    }
}
