//! Payment-provider webhook domain.
//!
//! # Module Structure
//!
//! - `errors` - WebhookError with HTTP status mapping
//! - `stripe_signature` - Stripe-Signature header HMAC check
//! - `stripe_event` - Stripe payloads decoded to a tagged union
//! - `paypal_event` - PayPal payloads decoded to a tagged union

mod errors;
pub mod paypal_event;
pub mod stripe_event;
pub mod stripe_signature;

pub use errors::WebhookError;
pub use paypal_event::PayPalEvent;
pub use stripe_event::StripeEvent;
pub use stripe_signature::{SignatureHeader, StripeSignatureCheck};

use crate::domain::subscription::PaymentProvider;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    Stripe(StripeEvent),
    PayPal(PayPalEvent),
}

/// A verified, decoded provider webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentWebhook {
    /// Provider-assigned event id, stable across redeliveries.
    pub event_id: String,
    pub event_type: String,
    pub event: ProviderEvent,
}

impl PaymentWebhook {
    pub fn provider(&self) -> PaymentProvider {
        match self.event {
            ProviderEvent::Stripe(_) => PaymentProvider::Stripe,
            ProviderEvent::PayPal(_) => PaymentProvider::PayPal,
        }
    }

    /// Decodes a raw body for `provider`.
    pub fn decode(provider: PaymentProvider, payload: &[u8]) -> Result<Self, WebhookError> {
        match provider {
            PaymentProvider::Stripe => stripe_event::decode(payload),
            PaymentProvider::PayPal => paypal_event::decode(payload),
        }
    }
}
