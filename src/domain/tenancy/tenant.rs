//! Tenant record.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{TenantId, Timestamp};

/// One creator account.
///
/// Each tenant is owned by exactly one identity-provider subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub tenant_id: TenantId,
    pub display_name: String,
    pub identity_subject: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Tenant {
    pub fn new(
        tenant_id: TenantId,
        display_name: impl Into<String>,
        identity_subject: impl Into<String>,
        now: Timestamp,
    ) -> Self {
        Self {
            tenant_id,
            display_name: display_name.into(),
            identity_subject: identity_subject.into(),
            created_at: now,
            updated_at: now,
        }
    }
}
