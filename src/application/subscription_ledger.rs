//! SubscriptionLedger - Idempotent mutation of the user/room/provider mapping.
//!
//! ## Activation protocol
//!
//! 1. Write UserProfile (create-if-absent), UserRoom and ProviderMapping in
//!    one atomic transaction.
//! 2. If the only failure is the UserProfile guard (redelivery, or an
//!    existing subscriber buying a second room), write the same three
//!    records again unconditionally.
//!
//! Any other failure propagates. No partial write is possible because
//! every attempt is a single transaction.

use serde_json::{Map, Value};
use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, RoomId, TelegramUserId, TenantId};
use crate::domain::subscription::{
    PaymentProvider, ProviderMapping, SubscriptionStatus, UserProfile, UserRoom,
};
use crate::ports::{Clock, ItemStore, PutRequest, WriteOutcome};

use super::schema;

/// Input to [`SubscriptionLedger::activate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivateSubscription {
    pub tenant_id: TenantId,
    pub telegram_user_id: TelegramUserId,
    pub room_id: RoomId,
    pub provider: PaymentProvider,
    pub provider_customer_id: String,
    pub provider_subscription_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationOutcome {
    /// First activation for this user in this tenant.
    NewSubscriber,
    /// The profile already existed; records were rewritten unconditionally.
    ExistingSubscriber,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusUpdate {
    Updated,
    /// No UserRoom row exists for the given key.
    NoSuchSubscription,
}

pub struct SubscriptionLedger {
    store: Arc<dyn ItemStore>,
    clock: Arc<dyn Clock>,
}

impl SubscriptionLedger {
    pub fn new(store: Arc<dyn ItemStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub async fn activate(
        &self,
        cmd: ActivateSubscription,
    ) -> Result<ActivationOutcome, DomainError> {
        let now = self.clock.now();

        let profile = UserProfile::new(cmd.tenant_id.clone(), cmd.telegram_user_id, now);
        let user_room = UserRoom {
            tenant_id: cmd.tenant_id.clone(),
            telegram_user_id: cmd.telegram_user_id,
            room_id: cmd.room_id.clone(),
            subscription_status: SubscriptionStatus::Active,
            provider: Some(cmd.provider),
            provider_customer_id: Some(cmd.provider_customer_id.clone()),
            provider_subscription_id: cmd.provider_subscription_id.clone(),
            created_at: now,
            updated_at: now,
        };
        let mapping = ProviderMapping {
            tenant_id: cmd.tenant_id.clone(),
            provider: cmd.provider,
            customer_id: cmd.provider_customer_id.clone(),
            telegram_user_id: cmd.telegram_user_id,
            created_at: now,
        };

        let profile_item = schema::user_profile_item(&profile)?;
        let user_room_item = schema::user_room_item(&user_room)?;
        let mapping_item = schema::provider_mapping_item(&mapping)?;

        let guarded = vec![
            PutRequest::if_absent(profile_item.clone()),
            PutRequest::unconditional(user_room_item.clone()),
            PutRequest::unconditional(mapping_item.clone()),
        ];
        if self.store.transact_put(guarded).await? == WriteOutcome::Applied {
            tracing::info!(
                tenant_id = %cmd.tenant_id,
                telegram_user_id = %cmd.telegram_user_id,
                room_id = %cmd.room_id,
                provider = %cmd.provider,
                "Activated subscription for new subscriber"
            );
            return Ok(ActivationOutcome::NewSubscriber);
        }

        tracing::debug!(
            tenant_id = %cmd.tenant_id,
            telegram_user_id = %cmd.telegram_user_id,
            "User profile exists, retrying activation unconditionally"
        );
        let unguarded = vec![
            PutRequest::unconditional(profile_item),
            PutRequest::unconditional(user_room_item),
            PutRequest::unconditional(mapping_item),
        ];
        match self.store.transact_put(unguarded).await? {
            WriteOutcome::Applied => {
                tracing::info!(
                    tenant_id = %cmd.tenant_id,
                    telegram_user_id = %cmd.telegram_user_id,
                    room_id = %cmd.room_id,
                    provider = %cmd.provider,
                    "Activated subscription for existing subscriber"
                );
                Ok(ActivationOutcome::ExistingSubscriber)
            }
            WriteOutcome::ConditionFailed => Err(DomainError::new(
                ErrorCode::InternalError,
                "Unconditional activation write reported a failed condition",
            )),
        }
    }

    /// Reverse lookup for status events that only carry a provider customer id.
    ///
    /// Scoped to the tenant the event was delivered for: the same payer id
    /// may be mapped in several tenants.
    pub async fn lookup_by_provider_customer(
        &self,
        tenant_id: &TenantId,
        provider: PaymentProvider,
        customer_id: &str,
    ) -> Result<Option<ProviderMapping>, DomainError> {
        self.store
            .get(&schema::provider_mapping_key(tenant_id, provider, customer_id))
            .await?
            .map(schema::decode)
            .transpose()
    }

    /// Sets a UserRoom's status, and its subscription id when one is given.
    pub async fn update_status(
        &self,
        tenant_id: &TenantId,
        telegram_user_id: TelegramUserId,
        room_id: &RoomId,
        status: SubscriptionStatus,
        provider_subscription_id: Option<&str>,
    ) -> Result<StatusUpdate, DomainError> {
        let mut attributes = Map::new();
        attributes.insert(
            "subscriptionStatus".to_string(),
            Value::String(status.as_str().to_string()),
        );
        attributes.insert(
            "updatedAt".to_string(),
            serde_json::to_value(self.clock.now())
                .map_err(|e| DomainError::database(format!("Failed to encode timestamp: {}", e)))?,
        );
        if let Some(id) = provider_subscription_id {
            attributes.insert(
                "providerSubscriptionId".to_string(),
                Value::String(id.to_string()),
            );
        }

        let key = schema::user_room_key(tenant_id, telegram_user_id, room_id);
        match self.store.update_attributes(&key, attributes).await? {
            WriteOutcome::Applied => {
                tracing::info!(
                    tenant_id = %tenant_id,
                    telegram_user_id = %telegram_user_id,
                    room_id = %room_id,
                    status = %status,
                    "Subscription status updated"
                );
                Ok(StatusUpdate::Updated)
            }
            WriteOutcome::ConditionFailed => {
                tracing::debug!(
                    tenant_id = %tenant_id,
                    telegram_user_id = %telegram_user_id,
                    room_id = %room_id,
                    "No subscription to update"
                );
                Ok(StatusUpdate::NoSuchSubscription)
            }
        }
    }

    pub async fn get_user_room(
        &self,
        tenant_id: &TenantId,
        telegram_user_id: TelegramUserId,
        room_id: &RoomId,
    ) -> Result<Option<UserRoom>, DomainError> {
        self.store
            .get(&schema::user_room_key(tenant_id, telegram_user_id, room_id))
            .await?
            .map(schema::decode)
            .transpose()
    }

    /// Every UserRoom the user holds in this tenant.
    pub async fn list_user_rooms(
        &self,
        tenant_id: &TenantId,
        telegram_user_id: TelegramUserId,
    ) -> Result<Vec<UserRoom>, DomainError> {
        self.store
            .query_partition(
                &schema::tenant_pk(tenant_id),
                &schema::user_room_prefix(telegram_user_id),
            )
            .await?
            .into_iter()
            .map(schema::decode)
            .collect()
    }

    pub async fn get_user_profile(
        &self,
        tenant_id: &TenantId,
        telegram_user_id: TelegramUserId,
    ) -> Result<Option<UserProfile>, DomainError> {
        self.store
            .get(&schema::user_profile_key(tenant_id, telegram_user_id))
            .await?
            .map(schema::decode)
            .transpose()
    }

    /// UserRooms a room-agnostic provider event applies to.
    pub async fn rooms_for_customer(
        &self,
        tenant_id: &TenantId,
        telegram_user_id: TelegramUserId,
        provider: PaymentProvider,
        customer_id: &str,
        subscription_id: Option<&str>,
    ) -> Result<Vec<UserRoom>, DomainError> {
        Ok(self
            .list_user_rooms(tenant_id, telegram_user_id)
            .await?
            .into_iter()
            .filter(|row| row.matches_customer(provider, customer_id, subscription_id))
            .collect())
    }
}
