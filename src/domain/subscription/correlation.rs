//! Correlation token embedded in provider checkouts.
//!
//! Format: `<tenantId>:<telegramUserId>:<roomId>`. It travels through
//! Stripe's `client_reference_id` and PayPal's `custom_id` so the
//! activation webhook can be traced back to a tenant, user and room.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::domain::foundation::{RoomId, TelegramUserId, TenantId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CorrelationError {
    #[error("correlation token is missing")]
    Missing,

    #[error("correlation token must have exactly 3 fields, got {0}")]
    WrongFieldCount(usize),

    #[error("correlation token field '{0}' is invalid")]
    InvalidField(&'static str),

    #[error("correlation token belongs to tenant {actual}, not {expected}")]
    TenantMismatch { expected: TenantId, actual: TenantId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationToken {
    pub tenant_id: TenantId,
    pub telegram_user_id: TelegramUserId,
    pub room_id: RoomId,
}

impl CorrelationToken {
    pub fn new(tenant_id: TenantId, telegram_user_id: TelegramUserId, room_id: RoomId) -> Self {
        Self {
            tenant_id,
            telegram_user_id,
            room_id,
        }
    }

    /// Parses an optional raw token. Absent and empty input are both invalid.
    pub fn parse(raw: Option<&str>) -> Result<Self, CorrelationError> {
        match raw {
            Some(s) if !s.is_empty() => s.parse(),
            _ => Err(CorrelationError::Missing),
        }
    }

    /// Rejects tokens minted for another tenant than the one the webhook arrived for.
    pub fn ensure_tenant(&self, expected: &TenantId) -> Result<(), CorrelationError> {
        if &self.tenant_id != expected {
            return Err(CorrelationError::TenantMismatch {
                expected: expected.clone(),
                actual: self.tenant_id.clone(),
            });
        }
        Ok(())
    }
}

impl FromStr for CorrelationToken {
    type Err = CorrelationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        let [tenant, user, room] = parts.as_slice() else {
            return Err(CorrelationError::WrongFieldCount(parts.len()));
        };

        Ok(Self {
            tenant_id: TenantId::new(*tenant)
                .map_err(|_| CorrelationError::InvalidField("tenant_id"))?,
            telegram_user_id: user
                .parse()
                .map_err(|_| CorrelationError::InvalidField("telegram_user_id"))?,
            room_id: RoomId::new(*room).map_err(|_| CorrelationError::InvalidField("room_id"))?,
        })
    }
}

impl fmt::Display for CorrelationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.tenant_id, self.telegram_user_id, self.room_id)
    }
}
