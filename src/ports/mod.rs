//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Storage Ports
//!
//! - `ItemStore` - Shared key-value store with one secondary index
//! - `SecretStore` - Per-tenant credential parameters
//!
//! ## Outbound Ports
//!
//! - `ChatMessenger` - Telegram sendMessage
//! - `PayPalVerificationApi` - PayPal OAuth2 + signature verification
//!
//! ## Time
//!
//! - `Clock` - Injectable time source for TTLs and signature windows

mod chat_messenger;
mod clock;
mod item_store;
mod paypal_api;
mod secret_store;

pub use chat_messenger::ChatMessenger;
pub use clock::Clock;
pub use item_store::{Item, ItemKey, ItemStore, PutRequest, WriteCondition, WriteOutcome};
pub use paypal_api::{PayPalApiError, PayPalVerificationApi, VerifySignatureRequest};
pub use secret_store::SecretStore;
