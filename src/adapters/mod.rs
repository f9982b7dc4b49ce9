//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `http` - axum webhook endpoints
//! - `memory` - In-memory store, secrets and messenger for tests and development
//! - `postgres` - PostgreSQL item store
//! - `secrets` - YAML-file secret store
//! - `telegram` - Telegram Bot API client
//! - `paypal` - PayPal REST client and mock

mod clock;
pub mod http;
pub mod memory;
pub mod paypal;
pub mod postgres;
pub mod secrets;
pub mod telegram;

pub use clock::{ManualClock, SystemClock};
pub use memory::{InMemoryItemStore, InMemorySecretStore, RecordingMessenger, SentMessage};
pub use paypal::{MockPayPalApi, PayPalRestClient};
pub use postgres::PostgresItemStore;
pub use secrets::YamlFileSecretStore;
pub use telegram::TelegramBotApi;
