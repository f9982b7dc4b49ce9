//! Application layer - Services that orchestrate domain logic over ports.
//!
//! Inbound flows:
//!
//! - Payment webhook: `SecretsVault` → `WebhookVerifier` → `PaymentEventRouter`
//!   → `SubscriptionLedger` → notice via `ChatMessenger`
//! - Telegram webhook: `TenantDirectory` → `SecretsVault` → `WebhookVerifier`
//!   → `TelegramDispatcher` → `RoomRegistry` / `SubscriptionLedger` → reply

mod cache;
pub mod payment_router;
pub mod processed_events;
pub mod room_registry;
pub mod schema;
pub mod secrets_vault;
pub mod subscription_ledger;
pub mod telegram_dispatcher;
pub mod tenant_directory;
pub mod webhook_verifier;

pub use cache::TtlCache;
pub use payment_router::{PaymentEventRouter, RouteOutcome};
pub use processed_events::ProcessedEventLog;
pub use room_registry::{RoomCreation, RoomRegistry};
pub use secrets_vault::SecretsVault;
pub use subscription_ledger::{
    ActivateSubscription, ActivationOutcome, StatusUpdate, SubscriptionLedger,
};
pub use telegram_dispatcher::{DispatchOutcome, TelegramDispatcher};
pub use tenant_directory::TenantDirectory;
pub use webhook_verifier::{WebhookSource, WebhookVerifier};
