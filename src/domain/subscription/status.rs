//! Subscription status of a user in a room.

use serde::{Deserialize, Serialize};

/// Current state of a UserRoom.
///
/// The ledger never decides transitions itself; provider events do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    PastDue,
    Cancelled,
    None,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Cancelled => "cancelled",
            SubscriptionStatus::None => "none",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, SubscriptionStatus::Active)
    }

    /// Label shown by the `/status` command.
    pub fn label(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "✅ Active",
            SubscriptionStatus::PastDue => "⚠️ Past due",
            SubscriptionStatus::Cancelled => "❌ Cancelled",
            SubscriptionStatus::None => "— None",
        }
    }

    /// Maps a Stripe subscription status onto the ledger's status set.
    ///
    /// Returns `None` for transitional states (`incomplete`, `paused`, ...)
    /// that should leave the ledger untouched.
    pub fn from_stripe(status: &str) -> Option<Self> {
        match status {
            "active" | "trialing" => Some(SubscriptionStatus::Active),
            "past_due" => Some(SubscriptionStatus::PastDue),
            "canceled" | "unpaid" | "incomplete_expired" => Some(SubscriptionStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&SubscriptionStatus::PastDue).unwrap(),
            "\"past_due\""
        );
        let parsed: SubscriptionStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(parsed, SubscriptionStatus::Cancelled);
    }

    #[test]
    fn only_active_is_active() {
        assert!(SubscriptionStatus::Active.is_active());
        assert!(!SubscriptionStatus::PastDue.is_active());
        assert!(!SubscriptionStatus::Cancelled.is_active());
        assert!(!SubscriptionStatus::None.is_active());
    }

    #[test]
    fn stripe_statuses_map_onto_ledger_statuses() {
        assert_eq!(SubscriptionStatus::from_stripe("active"), Some(SubscriptionStatus::Active));
        assert_eq!(SubscriptionStatus::from_stripe("trialing"), Some(SubscriptionStatus::Active));
        assert_eq!(SubscriptionStatus::from_stripe("past_due"), Some(SubscriptionStatus::PastDue));
        assert_eq!(SubscriptionStatus::from_stripe("canceled"), Some(SubscriptionStatus::Cancelled));
        assert_eq!(SubscriptionStatus::from_stripe("unpaid"), Some(SubscriptionStatus::Cancelled));
        assert_eq!(
            SubscriptionStatus::from_stripe("incomplete_expired"),
            Some(SubscriptionStatus::Cancelled)
        );
        assert_eq!(SubscriptionStatus::from_stripe("incomplete"), None);
        assert_eq!(SubscriptionStatus::from_stripe("paused"), None);
    }
}
