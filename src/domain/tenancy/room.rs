//! Room: a paid-access unit bound to a single chat group.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ChatId, RoomId, TenantId, Timestamp};
use crate::domain::subscription::CorrelationToken;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub tenant_id: TenantId,
    pub room_id: RoomId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telegram_group_id: Option<ChatId>,
    #[serde(default)]
    pub payment_link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paypal_payment_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_description: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Room {
    /// Builds the inactive room recorded when the bot joins a group.
    ///
    /// The admin fills in the payment link and activates it later.
    pub fn for_group(
        tenant_id: TenantId,
        group_id: ChatId,
        title: Option<&str>,
        now: Timestamp,
    ) -> Self {
        let name = match title.map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => format!("Group {}", group_id),
        };

        Self {
            tenant_id,
            room_id: RoomId::generate(),
            name,
            description: String::new(),
            telegram_group_id: Some(group_id),
            payment_link: String::new(),
            paypal_payment_link: None,
            price_description: None,
            is_active: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Stripe payment link carrying the correlation token for one user.
    pub fn subscribe_link(&self, token: &CorrelationToken) -> String {
        let separator = if self.payment_link.contains('?') { '&' } else { '?' };
        format!(
            "{}{}client_reference_id={}",
            self.payment_link, separator, token
        )
    }
}
