//! RoomRegistry - Tenant-scoped room reads and group-bound room creation.

use std::sync::Arc;

use crate::domain::foundation::{ChatId, DomainError, RoomId, TenantId};
use crate::domain::tenancy::Room;
use crate::ports::{Clock, ItemStore, PutRequest, WriteOutcome};

use super::schema;

/// Result of binding a new room to a Telegram group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomCreation {
    Created(Room),
    /// The group already has a room in this tenant.
    AlreadyBound,
}

pub struct RoomRegistry {
    store: Arc<dyn ItemStore>,
    clock: Arc<dyn Clock>,
}

impl RoomRegistry {
    pub fn new(store: Arc<dyn ItemStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// All rooms of a tenant, ordered by room id.
    pub async fn list(&self, tenant_id: &TenantId) -> Result<Vec<Room>, DomainError> {
        self.store
            .query_partition(&schema::tenant_pk(tenant_id), schema::ROOM_PREFIX)
            .await?
            .into_iter()
            .map(schema::decode)
            .collect()
    }

    pub async fn get(
        &self,
        tenant_id: &TenantId,
        room_id: &RoomId,
    ) -> Result<Option<Room>, DomainError> {
        self.store
            .get(&schema::room_key(tenant_id, room_id))
            .await?
            .map(schema::decode)
            .transpose()
    }

    /// The room this tenant bound to `group_id`, if any.
    pub async fn find_by_group(
        &self,
        tenant_id: &TenantId,
        group_id: ChatId,
    ) -> Result<Option<Room>, DomainError> {
        let Some(claim) = self
            .store
            .get(&schema::group_claim_key(tenant_id, group_id))
            .await?
        else {
            return Ok(None);
        };
        let claim: schema::GroupClaim = schema::decode(claim)?;
        self.get(tenant_id, &claim.room_id).await
    }

    /// Creates an inactive room bound to `group_id`.
    ///
    /// The room and the group claim are written together, each only if
    /// absent, so concurrent membership updates for one group create at
    /// most one room.
    pub async fn create_for_group(
        &self,
        tenant_id: &TenantId,
        group_id: ChatId,
        title: Option<&str>,
    ) -> Result<RoomCreation, DomainError> {
        let room = Room::for_group(tenant_id.clone(), group_id, title, self.clock.now());

        let outcome = self
            .store
            .transact_put(vec![
                PutRequest::if_absent(schema::group_claim_item(&room, group_id)?),
                PutRequest::if_absent(schema::room_item(&room)?),
            ])
            .await?;

        match outcome {
            WriteOutcome::Applied => Ok(RoomCreation::Created(room)),
            WriteOutcome::ConditionFailed => Ok(RoomCreation::AlreadyBound),
        }
    }

    /// Writes a room as-is, used when an operator edits or activates it.
    pub async fn save(&self, room: &Room) -> Result<(), DomainError> {
        let mut puts = vec![PutRequest::unconditional(schema::room_item(room)?)];
        if let Some(group_id) = room.telegram_group_id {
            puts.push(PutRequest::unconditional(schema::group_claim_item(
                room, group_id,
            )?));
        }
        self.store.transact_put(puts).await?;
        Ok(())
    }
}
