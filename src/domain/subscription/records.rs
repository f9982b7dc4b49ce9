//! Ledger records: who holds which room, and the provider reverse index.

use serde::{Deserialize, Serialize};

use super::{PaymentProvider, SubscriptionStatus};
use crate::domain::foundation::{RoomId, TelegramUserId, TenantId, Timestamp};

/// A Telegram user known to a tenant. Created at most once per (tenant, user).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub tenant_id: TenantId,
    pub telegram_user_id: TelegramUserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl UserProfile {
    pub fn new(tenant_id: TenantId, telegram_user_id: TelegramUserId, now: Timestamp) -> Self {
        Self {
            tenant_id,
            telegram_user_id,
            first_name: None,
            username: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Subscription state of one user in one room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRoom {
    pub tenant_id: TenantId,
    pub telegram_user_id: TelegramUserId,
    pub room_id: RoomId,
    pub subscription_status: SubscriptionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<PaymentProvider>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_customer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_subscription_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl UserRoom {
    /// True when a room-agnostic provider event about `customer_id`
    /// (and optionally `subscription_id`) concerns this row.
    ///
    /// Subscription ids only disambiguate when both sides carry one.
    pub fn matches_customer(
        &self,
        provider: PaymentProvider,
        customer_id: &str,
        subscription_id: Option<&str>,
    ) -> bool {
        if self.provider != Some(provider)
            || self.provider_customer_id.as_deref() != Some(customer_id)
        {
            return false;
        }
        match (subscription_id, self.provider_subscription_id.as_deref()) {
            (Some(wanted), Some(stored)) => wanted == stored,
            _ => true,
        }
    }
}

/// Reverse index from a provider customer/payer id to the owning tenant and user.
///
/// Always written in the same transaction as the UserRoom it points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderMapping {
    pub tenant_id: TenantId,
    pub provider: PaymentProvider,
    pub customer_id: String,
    pub telegram_user_id: TelegramUserId,
    pub created_at: Timestamp,
}
