//! Strongly-typed identifier value objects.
//!
//! Tenant and room ids are embedded in composite store keys (`TENANT#..`,
//! `ROOM#..`) and in the `tenant:user:room` correlation token, so neither
//! may contain `:` or `#`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

fn validate_key_segment(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::empty_field(field));
    }
    if value.contains(':') || value.contains('#') {
        return Err(ValidationError::invalid_format(
            field,
            "must not contain ':' or '#'",
        ));
    }
    Ok(())
}

/// Identifier of one creator account, the isolation boundary for data and credentials.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    /// Creates a new TenantId, returning error if empty or not key-safe.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        validate_key_segment("tenant_id", &id)?;
        Ok(Self(id))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TenantId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Identifier of a room within a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Creates a RoomId from an existing value.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        validate_key_segment("room_id", &id)?;
        Ok(Self(id))
    }

    /// Creates a new random RoomId.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RoomId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Telegram user id. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TelegramUserId(i64);

impl TelegramUserId {
    /// Creates a TelegramUserId, rejecting zero and negative values.
    pub fn new(id: i64) -> Result<Self, ValidationError> {
        if id <= 0 {
            return Err(ValidationError::invalid_format(
                "telegram_user_id",
                "must be a positive integer",
            ));
        }
        Ok(Self(id))
    }

    /// Returns the raw id.
    pub fn value(&self) -> i64 {
        self.0
    }

    /// The private chat with a user shares the user's id.
    pub fn private_chat(&self) -> ChatId {
        ChatId(self.0)
    }
}

impl fmt::Display for TelegramUserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TelegramUserId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.parse::<i64>().map_err(|_| {
            ValidationError::invalid_format("telegram_user_id", "must be numeric")
        })?;
        Self::new(id)
    }
}

/// Telegram chat id. Groups and supergroups are negative, private chats positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(i64);

impl ChatId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ══════════════════════════════════════════════════════════════════
    // TenantId / RoomId
    // ══════════════════════════════════════════════════════════════════

    #[test]
    fn tenant_id_accepts_plain_string() {
        let id = TenantId::new("acme").unwrap();
        assert_eq!(id.as_str(), "acme");
        assert_eq!(id.to_string(), "acme");
    }

    #[test]
    fn tenant_id_rejects_empty_string() {
        match TenantId::new("") {
            Err(ValidationError::EmptyField { field }) => assert_eq!(field, "tenant_id"),
            other => panic!("Expected EmptyField error, got {:?}", other),
        }
    }

    #[test]
    fn tenant_id_rejects_key_delimiters() {
        assert!(TenantId::new("a:b").is_err());
        assert!(TenantId::new("a#b").is_err());
    }

    #[test]
    fn generated_room_ids_are_unique_and_valid() {
        let a = RoomId::generate();
        let b = RoomId::generate();
        assert_ne!(a, b);
        assert!(RoomId::new(a.as_str()).is_ok());
    }

    // ══════════════════════════════════════════════════════════════════
    // TelegramUserId / ChatId
    // ══════════════════════════════════════════════════════════════════

    #[test]
    fn telegram_user_id_parses_numeric_string() {
        let id: TelegramUserId = "123456".parse().unwrap();
        assert_eq!(id.value(), 123456);
    }

    #[test]
    fn telegram_user_id_rejects_non_numeric_and_non_positive() {
        assert!("abc".parse::<TelegramUserId>().is_err());
        assert!("0".parse::<TelegramUserId>().is_err());
        assert!("-5".parse::<TelegramUserId>().is_err());
        assert!("".parse::<TelegramUserId>().is_err());
    }

    #[test]
    fn private_chat_shares_user_id() {
        let id = TelegramUserId::new(42).unwrap();
        assert_eq!(id.private_chat(), ChatId::new(42));
    }

    #[test]
    fn ids_serialize_transparently() {
        let tenant = TenantId::new("t1").unwrap();
        assert_eq!(serde_json::to_string(&tenant).unwrap(), "\"t1\"");
        let chat = ChatId::new(-100999);
        assert_eq!(serde_json::to_string(&chat).unwrap(), "-100999");
    }
}
