//! HTTP adapters - axum endpoints.

pub mod webhooks;

pub use webhooks::{webhook_router, WebhookAppState, WebhookDependencies};
