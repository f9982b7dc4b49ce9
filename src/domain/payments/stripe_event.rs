//! Stripe webhook event types.
//!
//! Payloads are decoded once at the boundary into [`StripeEvent`], one
//! variant per event type we act on. Only fields relevant to our
//! processing are captured.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::errors::WebhookError;
use super::{PaymentWebhook, ProviderEvent};

/// Stripe webhook envelope.
#[derive(Debug, Clone, Deserialize)]
struct StripeEnvelope {
    /// Unique identifier for the event (evt_xxx format).
    id: String,

    #[serde(rename = "type")]
    event_type: String,

    data: StripeEventData,
}

#[derive(Debug, Clone, Deserialize)]
struct StripeEventData {
    /// The object that triggered the event (polymorphic based on event type).
    object: Value,
}

/// `checkout.session.completed` payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    /// Carries the `tenant:user:room` correlation token.
    #[serde(default)]
    pub client_reference_id: Option<String>,
    #[serde(default, deserialize_with = "expandable_id")]
    pub customer: Option<String>,
    #[serde(default, deserialize_with = "expandable_id")]
    pub subscription: Option<String>,
}

/// `invoice.*` payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Invoice {
    pub id: String,
    #[serde(default, deserialize_with = "expandable_id")]
    pub customer: Option<String>,
    #[serde(default, deserialize_with = "expandable_id")]
    pub subscription: Option<String>,
}

/// `customer.subscription.*` payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StripeSubscription {
    pub id: String,
    #[serde(default, deserialize_with = "expandable_id")]
    pub customer: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StripeEvent {
    CheckoutCompleted(CheckoutSession),
    InvoicePaid(Invoice),
    InvoicePaymentFailed(Invoice),
    SubscriptionUpdated(StripeSubscription),
    SubscriptionDeleted(StripeSubscription),
    /// Any event type without a decoder. Acknowledged, never rejected.
    Unhandled,
}

type Decoder = fn(Value) -> Result<StripeEvent, serde_json::Error>;

static DECODERS: &[(&str, Decoder)] = &[
    ("checkout.session.completed", checkout_completed),
    ("invoice.paid", invoice_paid),
    ("invoice.payment_failed", invoice_payment_failed),
    ("customer.subscription.updated", subscription_updated),
    ("customer.subscription.deleted", subscription_deleted),
];

fn checkout_completed(object: Value) -> Result<StripeEvent, serde_json::Error> {
    serde_json::from_value(object).map(StripeEvent::CheckoutCompleted)
}

fn invoice_paid(object: Value) -> Result<StripeEvent, serde_json::Error> {
    serde_json::from_value(object).map(StripeEvent::InvoicePaid)
}

fn invoice_payment_failed(object: Value) -> Result<StripeEvent, serde_json::Error> {
    serde_json::from_value(object).map(StripeEvent::InvoicePaymentFailed)
}

fn subscription_updated(object: Value) -> Result<StripeEvent, serde_json::Error> {
    serde_json::from_value(object).map(StripeEvent::SubscriptionUpdated)
}

fn subscription_deleted(object: Value) -> Result<StripeEvent, serde_json::Error> {
    serde_json::from_value(object).map(StripeEvent::SubscriptionDeleted)
}

/// Decodes a verified Stripe payload.
///
/// # Errors
///
/// `ParseError` when the envelope is not JSON, or a handled event type
/// carries an object of the wrong shape.
pub fn decode(payload: &[u8]) -> Result<PaymentWebhook, WebhookError> {
    let envelope: StripeEnvelope =
        serde_json::from_slice(payload).map_err(|e| WebhookError::ParseError(e.to_string()))?;

    let event = match DECODERS
        .iter()
        .find(|(event_type, _)| *event_type == envelope.event_type)
    {
        Some((_, decoder)) => decoder(envelope.data.object)
            .map_err(|e| WebhookError::ParseError(format!("{}: {}", envelope.event_type, e)))?,
        None => StripeEvent::Unhandled,
    };

    Ok(PaymentWebhook {
        event_id: envelope.id,
        event_type: envelope.event_type,
        event: ProviderEvent::Stripe(event),
    })
}

/// Accepts either a bare id or an expanded object carrying one.
fn expandable_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Expandable {
        Id(String),
        Object { id: String },
    }

    Ok(Option::<Expandable>::deserialize(deserializer)?.map(|e| match e {
        Expandable::Id(id) | Expandable::Object { id } => id,
    }))
}
