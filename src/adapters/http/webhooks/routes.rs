//! Axum router configuration for the webhook endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{health, paypal_webhook, stripe_webhook, telegram_webhook, WebhookAppState};

/// Create the webhook router.
///
/// # Routes
/// - `POST /telegram` - Telegram updates, tenant resolved from the secret header
/// - `POST /stripe?tenant=` - Stripe events
/// - `POST /paypal?tenant=` - PayPal events
pub fn webhook_routes() -> Router<WebhookAppState> {
    Router::new()
        .route("/telegram", post(telegram_webhook))
        .route("/stripe", post(stripe_webhook))
        .route("/paypal", post(paypal_webhook))
}

/// Create the complete service router, webhooks mounted at `/webhooks`.
pub fn webhook_router(state: WebhookAppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/webhooks", webhook_routes())
        .with_state(state)
}
