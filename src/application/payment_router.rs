//! PaymentEventRouter - Turns a verified provider event into ledger writes
//! and subscriber notices.
//!
//! | Event | Ledger action | Notice |
//! |---|---|---|
//! | Stripe `checkout.session.completed` | activate | activated |
//! | Stripe `invoice.paid` | active (matching subscription only) | - |
//! | Stripe `invoice.payment_failed` | past_due | payment failed |
//! | Stripe `customer.subscription.updated` | mapped Stripe status | - |
//! | Stripe `customer.subscription.deleted` | cancelled | cancelled |
//! | PayPal `BILLING.SUBSCRIPTION.ACTIVATED` | activate | activated |
//! | PayPal `BILLING.SUBSCRIPTION.CANCELLED` | cancelled | cancelled |
//! | PayPal `BILLING.SUBSCRIPTION.SUSPENDED` | past_due | suspended |
//! | PayPal `PAYMENT.SALE.DENIED` | past_due | denied |
//! | PayPal `PAYMENT.SALE.COMPLETED` | - | - |
//!
//! Unknown event types are acknowledged so providers never learn that this
//! endpoint rejects new event types.

use std::sync::Arc;

use crate::domain::foundation::{RoomId, TelegramUserId, TenantId};
use crate::domain::payments::paypal_event::{PayPalSubscription, Sale};
use crate::domain::payments::stripe_event::{CheckoutSession, Invoice, StripeSubscription};
use crate::domain::payments::{PayPalEvent, PaymentWebhook, ProviderEvent, StripeEvent, WebhookError};
use crate::domain::subscription::{CorrelationToken, PaymentProvider, SubscriptionStatus};
use crate::domain::telegram::replies::notices;
use crate::domain::tenancy::TenantSecrets;
use crate::ports::ChatMessenger;

use super::processed_events::ProcessedEventLog;
use super::subscription_ledger::{
    ActivateSubscription, ActivationOutcome, StatusUpdate, SubscriptionLedger,
};

/// What the router did with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    Activated {
        telegram_user_id: TelegramUserId,
        room_id: RoomId,
        outcome: ActivationOutcome,
    },
    StatusChanged {
        telegram_user_id: TelegramUserId,
        status: SubscriptionStatus,
        rooms: Vec<RoomId>,
    },
    /// Event type is known but needs no ledger action, or is not handled.
    Acknowledged,
    /// Event id was already handled for this tenant.
    Duplicate,
}

impl RouteOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            RouteOutcome::Activated { .. } => "activated",
            RouteOutcome::StatusChanged { .. } => "status_changed",
            RouteOutcome::Acknowledged => "acknowledged",
            RouteOutcome::Duplicate => "duplicate",
        }
    }
}

/// A room-agnostic status change carried by a provider event.
struct StatusChange<'a> {
    provider: PaymentProvider,
    customer_id: Option<&'a str>,
    subscription_id: Option<&'a str>,
    status: SubscriptionStatus,
    notice: Option<&'static str>,
    /// Only rows already holding this exact subscription id are touched.
    require_subscription_match: bool,
}

pub struct PaymentEventRouter {
    ledger: Arc<SubscriptionLedger>,
    processed: Arc<ProcessedEventLog>,
    messenger: Arc<dyn ChatMessenger>,
}

impl PaymentEventRouter {
    pub fn new(
        ledger: Arc<SubscriptionLedger>,
        processed: Arc<ProcessedEventLog>,
        messenger: Arc<dyn ChatMessenger>,
    ) -> Self {
        Self {
            ledger,
            processed,
            messenger,
        }
    }

    pub async fn route(
        &self,
        tenant_id: &TenantId,
        secrets: &TenantSecrets,
        webhook: &PaymentWebhook,
    ) -> Result<RouteOutcome, WebhookError> {
        let provider = webhook.provider();
        if self
            .processed
            .is_processed(tenant_id, provider, &webhook.event_id)
            .await?
        {
            tracing::info!(
                tenant_id = %tenant_id,
                event_id = %webhook.event_id,
                event_type = %webhook.event_type,
                "Duplicate webhook event, skipping"
            );
            return Ok(RouteOutcome::Duplicate);
        }

        let result = match &webhook.event {
            ProviderEvent::Stripe(event) => self.route_stripe(tenant_id, secrets, event).await,
            ProviderEvent::PayPal(event) => self.route_paypal(tenant_id, secrets, event).await,
        };

        // Retryable failures stay unrecorded so the redelivery runs again.
        let outcome_label = match &result {
            Ok(outcome) => Some(outcome.label()),
            Err(WebhookError::Ignored(_)) => Some("ignored"),
            Err(WebhookError::MalformedCorrelationToken(_)) => Some("malformed_token"),
            Err(_) => None,
        };
        if let Some(label) = outcome_label {
            self.processed
                .record(
                    tenant_id,
                    provider,
                    &webhook.event_id,
                    &webhook.event_type,
                    label,
                )
                .await?;
        }

        if let Err(e) = &result {
            match e {
                WebhookError::Ignored(reason) => tracing::info!(
                    tenant_id = %tenant_id,
                    event_type = %webhook.event_type,
                    reason = %reason,
                    "Webhook event ignored"
                ),
                WebhookError::MalformedCorrelationToken(err) => tracing::warn!(
                    tenant_id = %tenant_id,
                    event_type = %webhook.event_type,
                    error = %err,
                    "Dropping activation with malformed correlation token"
                ),
                other => tracing::error!(
                    tenant_id = %tenant_id,
                    event_type = %webhook.event_type,
                    error = %other,
                    "Webhook event handling failed"
                ),
            }
        }
        result
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Stripe
    // ════════════════════════════════════════════════════════════════════════════

    async fn route_stripe(
        &self,
        tenant_id: &TenantId,
        secrets: &TenantSecrets,
        event: &StripeEvent,
    ) -> Result<RouteOutcome, WebhookError> {
        match event {
            StripeEvent::CheckoutCompleted(session) => {
                self.stripe_checkout(tenant_id, secrets, session).await
            }
            StripeEvent::InvoicePaid(invoice) => {
                self.stripe_invoice(tenant_id, secrets, invoice, SubscriptionStatus::Active, None, true)
                    .await
            }
            StripeEvent::InvoicePaymentFailed(invoice) => {
                self.stripe_invoice(
                    tenant_id,
                    secrets,
                    invoice,
                    SubscriptionStatus::PastDue,
                    Some(notices::STRIPE_PAYMENT_FAILED),
                    false,
                )
                .await
            }
            StripeEvent::SubscriptionUpdated(subscription) => {
                let Some(status) = SubscriptionStatus::from_stripe(&subscription.status) else {
                    return Err(WebhookError::Ignored(format!(
                        "Stripe subscription status '{}' needs no action",
                        subscription.status
                    )));
                };
                self.stripe_subscription(tenant_id, secrets, subscription, status, None)
                    .await
            }
            StripeEvent::SubscriptionDeleted(subscription) => {
                self.stripe_subscription(
                    tenant_id,
                    secrets,
                    subscription,
                    SubscriptionStatus::Cancelled,
                    Some(notices::CANCELLED),
                )
                .await
            }
            StripeEvent::Unhandled => Ok(RouteOutcome::Acknowledged),
        }
    }

    async fn stripe_checkout(
        &self,
        tenant_id: &TenantId,
        secrets: &TenantSecrets,
        session: &CheckoutSession,
    ) -> Result<RouteOutcome, WebhookError> {
        let token = CorrelationToken::parse(session.client_reference_id.as_deref())?;
        let customer = session
            .customer
            .as_deref()
            .ok_or_else(|| WebhookError::Ignored("Checkout session has no customer".into()))?;
        self.activate(
            tenant_id,
            secrets,
            token,
            PaymentProvider::Stripe,
            customer,
            session.subscription.as_deref(),
        )
        .await
    }

    async fn stripe_invoice(
        &self,
        tenant_id: &TenantId,
        secrets: &TenantSecrets,
        invoice: &Invoice,
        status: SubscriptionStatus,
        notice: Option<&'static str>,
        require_subscription_match: bool,
    ) -> Result<RouteOutcome, WebhookError> {
        self.change_status(
            tenant_id,
            secrets,
            StatusChange {
                provider: PaymentProvider::Stripe,
                customer_id: invoice.customer.as_deref(),
                subscription_id: invoice.subscription.as_deref(),
                status,
                notice,
                require_subscription_match,
            },
        )
        .await
    }

    async fn stripe_subscription(
        &self,
        tenant_id: &TenantId,
        secrets: &TenantSecrets,
        subscription: &StripeSubscription,
        status: SubscriptionStatus,
        notice: Option<&'static str>,
    ) -> Result<RouteOutcome, WebhookError> {
        self.change_status(
            tenant_id,
            secrets,
            StatusChange {
                provider: PaymentProvider::Stripe,
                customer_id: subscription.customer.as_deref(),
                subscription_id: Some(subscription.id.as_str()),
                status,
                notice,
                require_subscription_match: false,
            },
        )
        .await
    }

    // ════════════════════════════════════════════════════════════════════════════
    // PayPal
    // ════════════════════════════════════════════════════════════════════════════

    async fn route_paypal(
        &self,
        tenant_id: &TenantId,
        secrets: &TenantSecrets,
        event: &PayPalEvent,
    ) -> Result<RouteOutcome, WebhookError> {
        match event {
            PayPalEvent::SubscriptionActivated(subscription) => {
                self.paypal_activation(tenant_id, secrets, subscription).await
            }
            PayPalEvent::SubscriptionCancelled(subscription) => {
                self.paypal_subscription(
                    tenant_id,
                    secrets,
                    subscription,
                    SubscriptionStatus::Cancelled,
                    notices::CANCELLED,
                )
                .await
            }
            PayPalEvent::SubscriptionSuspended(subscription) => {
                self.paypal_subscription(
                    tenant_id,
                    secrets,
                    subscription,
                    SubscriptionStatus::PastDue,
                    notices::PAYPAL_SUSPENDED,
                )
                .await
            }
            PayPalEvent::PaymentSaleCompleted(sale) => {
                tracing::info!(
                    tenant_id = %tenant_id,
                    sale_id = %sale.id,
                    billing_agreement_id = ?sale.billing_agreement_id,
                    "PayPal sale completed"
                );
                Ok(RouteOutcome::Acknowledged)
            }
            PayPalEvent::PaymentSaleDenied(sale) => {
                self.paypal_sale_denied(tenant_id, secrets, sale).await
            }
            PayPalEvent::Unhandled => Ok(RouteOutcome::Acknowledged),
        }
    }

    async fn paypal_activation(
        &self,
        tenant_id: &TenantId,
        secrets: &TenantSecrets,
        subscription: &PayPalSubscription,
    ) -> Result<RouteOutcome, WebhookError> {
        let token = CorrelationToken::parse(subscription.custom_id.as_deref())?;
        let payer = subscription
            .payer_id()
            .ok_or_else(|| WebhookError::Ignored("PayPal subscription has no payer".into()))?;
        self.activate(
            tenant_id,
            secrets,
            token,
            PaymentProvider::PayPal,
            payer,
            Some(subscription.id.as_str()),
        )
        .await
    }

    async fn paypal_subscription(
        &self,
        tenant_id: &TenantId,
        secrets: &TenantSecrets,
        subscription: &PayPalSubscription,
        status: SubscriptionStatus,
        notice: &'static str,
    ) -> Result<RouteOutcome, WebhookError> {
        self.change_status(
            tenant_id,
            secrets,
            StatusChange {
                provider: PaymentProvider::PayPal,
                customer_id: subscription.payer_id(),
                subscription_id: Some(subscription.id.as_str()),
                status,
                notice: Some(notice),
                require_subscription_match: false,
            },
        )
        .await
    }

    async fn paypal_sale_denied(
        &self,
        tenant_id: &TenantId,
        secrets: &TenantSecrets,
        sale: &Sale,
    ) -> Result<RouteOutcome, WebhookError> {
        self.change_status(
            tenant_id,
            secrets,
            StatusChange {
                provider: PaymentProvider::PayPal,
                customer_id: sale.payer_id(),
                subscription_id: sale.billing_agreement_id.as_deref(),
                status: SubscriptionStatus::PastDue,
                notice: Some(notices::PAYPAL_DENIED),
                require_subscription_match: false,
            },
        )
        .await
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Shared actions
    // ════════════════════════════════════════════════════════════════════════════

    async fn activate(
        &self,
        tenant_id: &TenantId,
        secrets: &TenantSecrets,
        token: CorrelationToken,
        provider: PaymentProvider,
        customer_id: &str,
        subscription_id: Option<&str>,
    ) -> Result<RouteOutcome, WebhookError> {
        token.ensure_tenant(tenant_id)?;

        let outcome = self
            .ledger
            .activate(ActivateSubscription {
                tenant_id: tenant_id.clone(),
                telegram_user_id: token.telegram_user_id,
                room_id: token.room_id.clone(),
                provider,
                provider_customer_id: customer_id.to_string(),
                provider_subscription_id: subscription_id.map(str::to_string),
            })
            .await?;

        self.notify(tenant_id, secrets, token.telegram_user_id, notices::ACTIVATED)
            .await;

        Ok(RouteOutcome::Activated {
            telegram_user_id: token.telegram_user_id,
            room_id: token.room_id,
            outcome,
        })
    }

    async fn change_status(
        &self,
        tenant_id: &TenantId,
        secrets: &TenantSecrets,
        change: StatusChange<'_>,
    ) -> Result<RouteOutcome, WebhookError> {
        let customer_id = change
            .customer_id
            .ok_or_else(|| WebhookError::Ignored("Event carries no customer id".into()))?;

        let mapping = self
            .ledger
            .lookup_by_provider_customer(tenant_id, change.provider, customer_id)
            .await?
            .ok_or_else(|| {
                WebhookError::Ignored(format!(
                    "No subscriber for {} customer in this tenant",
                    change.provider
                ))
            })?;

        let user = mapping.telegram_user_id;
        let rows = self
            .ledger
            .rooms_for_customer(
                tenant_id,
                user,
                change.provider,
                customer_id,
                change.subscription_id,
            )
            .await?;

        let mut rooms = Vec::new();
        for row in rows {
            if change.require_subscription_match
                && row.provider_subscription_id.as_deref() != change.subscription_id
            {
                continue;
            }
            let update = self
                .ledger
                .update_status(
                    tenant_id,
                    user,
                    &row.room_id,
                    change.status,
                    change.subscription_id,
                )
                .await?;
            if update == StatusUpdate::Updated {
                rooms.push(row.room_id);
            }
        }

        if rooms.is_empty() {
            return Err(WebhookError::Ignored(
                "No subscription matches the event".into(),
            ));
        }

        if let Some(notice) = change.notice {
            self.notify(tenant_id, secrets, user, notice).await;
        }

        Ok(RouteOutcome::StatusChanged {
            telegram_user_id: user,
            status: change.status,
            rooms,
        })
    }

    /// Sends a notice to the subscriber's private chat. Failures are logged;
    /// the ledger is already correct.
    async fn notify(
        &self,
        tenant_id: &TenantId,
        secrets: &TenantSecrets,
        user: TelegramUserId,
        text: &str,
    ) {
        if let Err(e) = self
            .messenger
            .send_message(&secrets.telegram_bot_token, user.private_chat(), text)
            .await
        {
            tracing::error!(
                tenant_id = %tenant_id,
                telegram_user_id = %user,
                error = %e,
                "Failed to notify subscriber"
            );
        }
    }
}
