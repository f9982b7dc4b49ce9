//! PayPal webhook event types.

use serde::Deserialize;
use serde_json::Value;

use super::errors::WebhookError;
use super::{PaymentWebhook, ProviderEvent};

#[derive(Debug, Clone, Deserialize)]
struct PayPalEnvelope {
    /// `WH-...` event id.
    id: String,
    event_type: String,
    #[serde(default)]
    resource: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Subscriber {
    #[serde(default)]
    pub payer_id: Option<String>,
}

/// `BILLING.SUBSCRIPTION.*` resource.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PayPalSubscription {
    /// `I-...` subscription id.
    pub id: String,
    /// Carries the `tenant:user:room` correlation token.
    #[serde(default)]
    pub custom_id: Option<String>,
    #[serde(default)]
    pub subscriber: Option<Subscriber>,
}

impl PayPalSubscription {
    pub fn payer_id(&self) -> Option<&str> {
        self.subscriber.as_ref()?.payer_id.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PayerInfo {
    #[serde(default)]
    pub payer_id: Option<String>,
}

/// `PAYMENT.SALE.*` resource.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Sale {
    pub id: String,
    /// Subscription the sale was billed against.
    #[serde(default)]
    pub billing_agreement_id: Option<String>,
    #[serde(default)]
    pub payer_info: Option<PayerInfo>,
}

impl Sale {
    pub fn payer_id(&self) -> Option<&str> {
        self.payer_info.as_ref()?.payer_id.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayPalEvent {
    SubscriptionActivated(PayPalSubscription),
    SubscriptionCancelled(PayPalSubscription),
    SubscriptionSuspended(PayPalSubscription),
    PaymentSaleCompleted(Sale),
    PaymentSaleDenied(Sale),
    /// Any event type without a decoder. Acknowledged, never rejected.
    Unhandled,
}

type Decoder = fn(Value) -> Result<PayPalEvent, serde_json::Error>;

static DECODERS: &[(&str, Decoder)] = &[
    ("BILLING.SUBSCRIPTION.ACTIVATED", subscription_activated),
    ("BILLING.SUBSCRIPTION.CANCELLED", subscription_cancelled),
    ("BILLING.SUBSCRIPTION.SUSPENDED", subscription_suspended),
    ("PAYMENT.SALE.COMPLETED", sale_completed),
    ("PAYMENT.SALE.DENIED", sale_denied),
];

fn subscription_activated(resource: Value) -> Result<PayPalEvent, serde_json::Error> {
    serde_json::from_value(resource).map(PayPalEvent::SubscriptionActivated)
}

fn subscription_cancelled(resource: Value) -> Result<PayPalEvent, serde_json::Error> {
    serde_json::from_value(resource).map(PayPalEvent::SubscriptionCancelled)
}

fn subscription_suspended(resource: Value) -> Result<PayPalEvent, serde_json::Error> {
    serde_json::from_value(resource).map(PayPalEvent::SubscriptionSuspended)
}

fn sale_completed(resource: Value) -> Result<PayPalEvent, serde_json::Error> {
    serde_json::from_value(resource).map(PayPalEvent::PaymentSaleCompleted)
}

fn sale_denied(resource: Value) -> Result<PayPalEvent, serde_json::Error> {
    serde_json::from_value(resource).map(PayPalEvent::PaymentSaleDenied)
}

/// Decodes a verified PayPal payload.
pub fn decode(payload: &[u8]) -> Result<PaymentWebhook, WebhookError> {
    let envelope: PayPalEnvelope =
        serde_json::from_slice(payload).map_err(|e| WebhookError::ParseError(e.to_string()))?;

    let event = match DECODERS
        .iter()
        .find(|(event_type, _)| *event_type == envelope.event_type)
    {
        Some((_, decoder)) => decoder(envelope.resource)
            .map_err(|e| WebhookError::ParseError(format!("{}: {}", envelope.event_type, e)))?,
        None => PayPalEvent::Unhandled,
    };

    Ok(PaymentWebhook {
        event_id: envelope.id,
        event_type: envelope.event_type,
        event: ProviderEvent::PayPal(event),
    })
}
