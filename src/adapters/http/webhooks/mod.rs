//! HTTP adapter for provider webhooks.
//!
//! - `GET /health` - Liveness check
//! - `POST /webhooks/telegram` - Telegram Bot API updates
//! - `POST /webhooks/stripe?tenant={id}` - Stripe events
//! - `POST /webhooks/paypal?tenant={id}` - PayPal events

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::{WebhookApiError, WebhookAppState, WebhookDependencies};
pub use routes::{webhook_router, webhook_routes};
