//! Key schema for the shared item store.
//!
//! | Record | pk | sk | gsi1pk / gsi1sk |
//! |---|---|---|---|
//! | Tenant | `TENANT#{t}` | `METADATA` | `IDENTITY#{sub}` / `TENANT` |
//! | Room | `TENANT#{t}` | `ROOM#{r}` | `TGGROUP#{g}` / `ROOM` when bound |
//! | Room group claim | `TENANT#{t}` | `TGGROUP#{g}` | - |
//! | Webhook secret | `WHSECRET#{s}` | `TENANT` | - |
//! | UserProfile | `TENANT#{t}` | `USER#{u}` | - |
//! | UserRoom | `TENANT#{t}` | `USERROOM#{u}#ROOM#{r}` | `TGUSER#{u}` / `TENANT#{t}#ROOM#{r}` |
//! | ProviderMapping | `TENANT#{t}` | `STRIPECUST#{c}` / `PAYPALCUST#{c}` | same / `TENANT#{t}` |
//! | Processed event | `TENANT#{t}` | `EVENT#{provider}#{id}` | - |
//!
//! Tenant and room ids cannot contain `#`, so every prefix query is exact.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::foundation::{
    ChatId, DomainError, RoomId, TelegramUserId, TenantId, Timestamp,
};
use crate::domain::subscription::{PaymentProvider, ProviderMapping, UserProfile, UserRoom};
use crate::domain::tenancy::{Room, Tenant};
use crate::ports::{Item, ItemKey};

pub const METADATA: &str = "METADATA";
pub const ROOM_PREFIX: &str = "ROOM#";
pub const ROOM_INDEX_SK: &str = "ROOM";
pub const TENANT_INDEX_SK: &str = "TENANT";

pub fn tenant_pk(tenant_id: &TenantId) -> String {
    format!("TENANT#{}", tenant_id)
}

pub fn tenant_key(tenant_id: &TenantId) -> ItemKey {
    ItemKey::new(tenant_pk(tenant_id), METADATA)
}

pub fn identity_index_pk(subject: &str) -> String {
    format!("IDENTITY#{}", subject)
}

pub fn room_key(tenant_id: &TenantId, room_id: &RoomId) -> ItemKey {
    ItemKey::new(tenant_pk(tenant_id), format!("{}{}", ROOM_PREFIX, room_id))
}

pub fn group_index_pk(group_id: ChatId) -> String {
    format!("TGGROUP#{}", group_id)
}

pub fn group_claim_key(tenant_id: &TenantId, group_id: ChatId) -> ItemKey {
    ItemKey::new(tenant_pk(tenant_id), group_index_pk(group_id))
}

pub fn webhook_secret_key(secret: &str) -> ItemKey {
    ItemKey::new(format!("WHSECRET#{}", secret), TENANT_INDEX_SK)
}

pub fn user_profile_key(tenant_id: &TenantId, user: TelegramUserId) -> ItemKey {
    ItemKey::new(tenant_pk(tenant_id), format!("USER#{}", user))
}

/// Sort-key prefix of every UserRoom a user holds in one tenant.
pub fn user_room_prefix(user: TelegramUserId) -> String {
    format!("USERROOM#{}#ROOM#", user)
}

pub fn user_room_key(tenant_id: &TenantId, user: TelegramUserId, room_id: &RoomId) -> ItemKey {
    ItemKey::new(
        tenant_pk(tenant_id),
        format!("{}{}", user_room_prefix(user), room_id),
    )
}

pub fn telegram_user_index_key(
    tenant_id: &TenantId,
    user: TelegramUserId,
    room_id: &RoomId,
) -> ItemKey {
    ItemKey::new(
        format!("TGUSER#{}", user),
        format!("{}#ROOM#{}", tenant_pk(tenant_id), room_id),
    )
}

pub fn customer_index_pk(provider: PaymentProvider, customer_id: &str) -> String {
    format!("{}#{}", provider.customer_key_prefix(), customer_id)
}

pub fn provider_mapping_key(
    tenant_id: &TenantId,
    provider: PaymentProvider,
    customer_id: &str,
) -> ItemKey {
    ItemKey::new(tenant_pk(tenant_id), customer_index_pk(provider, customer_id))
}

pub fn processed_event_key(
    tenant_id: &TenantId,
    provider: PaymentProvider,
    event_id: &str,
) -> ItemKey {
    ItemKey::new(
        tenant_pk(tenant_id),
        format!("EVENT#{}#{}", provider, event_id),
    )
}

// ════════════════════════════════════════════════════════════════════════════════
// Item codecs
// ════════════════════════════════════════════════════════════════════════════════

/// Pointer record body for webhook-secret mappings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantPointer {
    pub tenant_id: TenantId,
}

/// Claim that a Telegram group is bound to a room within one tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupClaim {
    pub room_id: RoomId,
}

/// Marker for a provider event that has already been handled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedEvent {
    pub event_type: String,
    pub outcome: String,
    pub processed_at: Timestamp,
}

pub fn encode<T: Serialize>(
    key: ItemKey,
    index_key: Option<ItemKey>,
    record: &T,
) -> Result<Item, DomainError> {
    let attributes = match serde_json::to_value(record) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            return Err(DomainError::database("Record did not serialize to an object")
                .with_detail("sk", key.sk))
        }
        Err(e) => {
            return Err(DomainError::database(format!("Failed to encode record: {}", e))
                .with_detail("sk", key.sk))
        }
    };
    Ok(Item {
        key,
        index_key,
        attributes,
    })
}

pub fn decode<T: DeserializeOwned>(item: Item) -> Result<T, DomainError> {
    serde_json::from_value(Value::Object(item.attributes)).map_err(|e| {
        DomainError::database(format!("Corrupt record: {}", e))
            .with_detail("pk", item.key.pk)
            .with_detail("sk", item.key.sk)
    })
}

pub fn tenant_item(tenant: &Tenant) -> Result<Item, DomainError> {
    encode(
        tenant_key(&tenant.tenant_id),
        Some(ItemKey::new(
            identity_index_pk(&tenant.identity_subject),
            TENANT_INDEX_SK,
        )),
        tenant,
    )
}

pub fn room_item(room: &Room) -> Result<Item, DomainError> {
    let index_key = room
        .telegram_group_id
        .map(|g| ItemKey::new(group_index_pk(g), ROOM_INDEX_SK));
    encode(room_key(&room.tenant_id, &room.room_id), index_key, room)
}

pub fn group_claim_item(room: &Room, group_id: ChatId) -> Result<Item, DomainError> {
    encode(
        group_claim_key(&room.tenant_id, group_id),
        None,
        &GroupClaim {
            room_id: room.room_id.clone(),
        },
    )
}

pub fn webhook_secret_item(secret: &str, tenant_id: &TenantId) -> Result<Item, DomainError> {
    encode(
        webhook_secret_key(secret),
        None,
        &TenantPointer {
            tenant_id: tenant_id.clone(),
        },
    )
}

pub fn user_profile_item(profile: &UserProfile) -> Result<Item, DomainError> {
    encode(
        user_profile_key(&profile.tenant_id, profile.telegram_user_id),
        None,
        profile,
    )
}

pub fn user_room_item(row: &UserRoom) -> Result<Item, DomainError> {
    encode(
        user_room_key(&row.tenant_id, row.telegram_user_id, &row.room_id),
        Some(telegram_user_index_key(
            &row.tenant_id,
            row.telegram_user_id,
            &row.room_id,
        )),
        row,
    )
}

pub fn provider_mapping_item(mapping: &ProviderMapping) -> Result<Item, DomainError> {
    encode(
        provider_mapping_key(&mapping.tenant_id, mapping.provider, &mapping.customer_id),
        Some(ItemKey::new(
            customer_index_pk(mapping.provider, &mapping.customer_id),
            tenant_pk(&mapping.tenant_id),
        )),
        mapping,
    )
}
