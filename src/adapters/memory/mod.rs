//! In-memory adapters for tests and local development.

mod item_store;
mod messenger;
mod secret_store;

pub use item_store::InMemoryItemStore;
pub use messenger::{RecordingMessenger, SentMessage};
pub use secret_store::InMemorySecretStore;
