//! ProcessedEventLog - Per-tenant replay suppression for provider events.
//!
//! Providers redeliver webhooks freely. Recording each handled event id
//! with a create-if-absent write lets the router acknowledge a redelivery
//! without repeating ledger writes or notices.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, TenantId};
use crate::domain::subscription::PaymentProvider;
use crate::ports::{Clock, ItemStore, PutRequest, WriteOutcome};

use super::schema;

pub struct ProcessedEventLog {
    store: Arc<dyn ItemStore>,
    clock: Arc<dyn Clock>,
}

impl ProcessedEventLog {
    pub fn new(store: Arc<dyn ItemStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub async fn is_processed(
        &self,
        tenant_id: &TenantId,
        provider: PaymentProvider,
        event_id: &str,
    ) -> Result<bool, DomainError> {
        Ok(self
            .store
            .get(&schema::processed_event_key(tenant_id, provider, event_id))
            .await?
            .is_some())
    }

    /// Records a handled event. Returns `false` if it was already recorded.
    pub async fn record(
        &self,
        tenant_id: &TenantId,
        provider: PaymentProvider,
        event_id: &str,
        event_type: &str,
        outcome: &str,
    ) -> Result<bool, DomainError> {
        let marker = schema::ProcessedEvent {
            event_type: event_type.to_string(),
            outcome: outcome.to_string(),
            processed_at: self.clock.now(),
        };
        let item = schema::encode(
            schema::processed_event_key(tenant_id, provider, event_id),
            None,
            &marker,
        )?;

        let written = self
            .store
            .transact_put(vec![PutRequest::if_absent(item)])
            .await?;
        Ok(written == WriteOutcome::Applied)
    }
}
