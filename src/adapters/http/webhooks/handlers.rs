//! HTTP handlers for the webhook endpoints.
//!
//! Telegram deliveries are always answered with 200: Telegram retries
//! anything else, and a failed update is never worth a retry storm.
//! Payment deliveries answer with the status carried by [`WebhookError`],
//! which is what drives Stripe's and PayPal's redelivery.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Json, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::application::webhook_verifier::TELEGRAM_SECRET_HEADER;
use crate::application::{
    PaymentEventRouter, ProcessedEventLog, RoomRegistry, SecretsVault, SubscriptionLedger,
    TelegramDispatcher, TenantDirectory, WebhookSource, WebhookVerifier,
};
use crate::domain::foundation::TenantId;
use crate::domain::payments::stripe_signature::StripeSignatureCheck;
use crate::domain::payments::{PaymentWebhook, WebhookError};
use crate::domain::subscription::PaymentProvider;
use crate::domain::telegram::Update;
use crate::ports::{ChatMessenger, Clock, ItemStore, PayPalVerificationApi, SecretStore};

use super::dto::{ErrorResponse, TenantQuery, WebhookAck};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state of the webhook endpoints.
#[derive(Clone)]
pub struct WebhookAppState {
    pub directory: Arc<TenantDirectory>,
    pub vault: Arc<SecretsVault>,
    pub verifier: Arc<WebhookVerifier>,
    pub router: Arc<PaymentEventRouter>,
    pub dispatcher: Arc<TelegramDispatcher>,
}

/// Ports and settings the webhook services are built from.
pub struct WebhookDependencies {
    pub store: Arc<dyn ItemStore>,
    pub secret_store: Arc<dyn SecretStore>,
    pub messenger: Arc<dyn ChatMessenger>,
    pub paypal: Arc<dyn PayPalVerificationApi>,
    pub clock: Arc<dyn Clock>,
    pub secrets_path_prefix: String,
    pub secrets_cache_ttl: Duration,
    pub stripe_tolerance_secs: i64,
}

impl WebhookAppState {
    /// Wires every service over the given ports.
    pub fn build(deps: WebhookDependencies) -> Self {
        let ledger = Arc::new(SubscriptionLedger::new(deps.store.clone(), deps.clock.clone()));
        let processed = Arc::new(ProcessedEventLog::new(deps.store.clone(), deps.clock.clone()));
        let rooms = Arc::new(RoomRegistry::new(deps.store.clone(), deps.clock.clone()));

        Self {
            directory: Arc::new(TenantDirectory::new(deps.store)),
            vault: Arc::new(SecretsVault::new(
                deps.secret_store,
                deps.clock.clone(),
                deps.secrets_path_prefix,
                deps.secrets_cache_ttl,
            )),
            verifier: Arc::new(WebhookVerifier::new(
                deps.paypal,
                deps.clock,
                StripeSignatureCheck::new(deps.stripe_tolerance_secs),
            )),
            router: Arc::new(PaymentEventRouter::new(
                ledger.clone(),
                processed,
                deps.messenger.clone(),
            )),
            dispatcher: Arc::new(TelegramDispatcher::new(rooms, ledger, deps.messenger)),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Health
// ════════════════════════════════════════════════════════════════════════════════

pub async fn health() -> &'static str {
    "ok"
}

// ════════════════════════════════════════════════════════════════════════════════
// Telegram
// ════════════════════════════════════════════════════════════════════════════════

/// POST /webhooks/telegram
///
/// The tenant is identified by the secret-token header Telegram echoes back
/// on every delivery.
pub async fn telegram_webhook(
    State(state): State<WebhookAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    handle_telegram(&state, &headers, &body).await;
    StatusCode::OK
}

async fn handle_telegram(state: &WebhookAppState, headers: &HeaderMap, body: &[u8]) {
    let Some(secret) = headers
        .get(TELEGRAM_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
    else {
        tracing::warn!("Telegram webhook without secret token header");
        return;
    };

    let tenant_id = match state.directory.resolve_by_webhook_secret(secret).await {
        Ok(Some(tenant_id)) => tenant_id,
        Ok(None) => {
            tracing::warn!("Telegram webhook secret matches no tenant");
            return;
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to resolve tenant for Telegram webhook");
            return;
        }
    };

    let secrets = match state.vault.get_tenant_secrets(&tenant_id).await {
        Ok(secrets) => secrets,
        Err(e) => {
            tracing::error!(tenant_id = %tenant_id, error = %e, "Failed to load tenant secrets");
            return;
        }
    };

    match state
        .verifier
        .verify(WebhookSource::Telegram, &tenant_id, headers, body, &secrets)
        .await
    {
        Ok(true) => {}
        Ok(false) => {
            tracing::warn!(tenant_id = %tenant_id, "Telegram webhook secret rejected");
            return;
        }
        Err(e) => {
            tracing::error!(tenant_id = %tenant_id, error = %e, "Telegram verification failed");
            return;
        }
    }

    let update: Update = match serde_json::from_slice(body) {
        Ok(update) => update,
        Err(e) => {
            tracing::warn!(tenant_id = %tenant_id, error = %e, "Unparseable Telegram update");
            return;
        }
    };
    let update_id = update.update_id;

    match state
        .dispatcher
        .dispatch(&tenant_id, &secrets, update.classify())
        .await
    {
        Ok(outcome) => tracing::debug!(
            tenant_id = %tenant_id,
            update_id,
            outcome = ?outcome,
            "Telegram update handled"
        ),
        Err(e) => tracing::error!(
            tenant_id = %tenant_id,
            update_id,
            error = %e,
            "Telegram update handling failed"
        ),
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Payments
// ════════════════════════════════════════════════════════════════════════════════

/// POST /webhooks/stripe?tenant={tenant_id}
pub async fn stripe_webhook(
    State(state): State<WebhookAppState>,
    Query(query): Query<TenantQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, WebhookApiError> {
    handle_payment(&state, PaymentProvider::Stripe, query, &headers, &body)
        .await
        .map(Json)
}

/// POST /webhooks/paypal?tenant={tenant_id}
pub async fn paypal_webhook(
    State(state): State<WebhookAppState>,
    Query(query): Query<TenantQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, WebhookApiError> {
    handle_payment(&state, PaymentProvider::PayPal, query, &headers, &body)
        .await
        .map(Json)
}

async fn handle_payment(
    state: &WebhookAppState,
    provider: PaymentProvider,
    query: TenantQuery,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<WebhookAck, WebhookApiError> {
    let tenant_id = query
        .tenant
        .as_deref()
        .and_then(|t| TenantId::new(t).ok())
        .ok_or(WebhookError::MissingTenant)?;

    let secrets = state
        .vault
        .get_tenant_secrets(&tenant_id)
        .await
        .map_err(WebhookError::from)?;

    let source = match provider {
        PaymentProvider::Stripe => WebhookSource::Stripe,
        PaymentProvider::PayPal => WebhookSource::PayPal,
    };
    let verified = state
        .verifier
        .verify(source, &tenant_id, headers, body, &secrets)
        .await
        .map_err(|e| {
            tracing::warn!(
                tenant_id = %tenant_id,
                provider = %provider,
                error = %e,
                "Webhook verification failed"
            );
            e
        })?;
    if !verified {
        tracing::warn!(tenant_id = %tenant_id, provider = %provider, "Webhook signature rejected");
        return Err(WebhookError::InvalidSignature.into());
    }

    let webhook = PaymentWebhook::decode(provider, body)?;
    let outcome = state.router.route(&tenant_id, &secrets, &webhook).await?;
    Ok(WebhookAck::new(outcome.label()))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error wrapper that converts webhook errors to HTTP responses.
#[derive(Debug)]
pub struct WebhookApiError(pub WebhookError);

impl From<WebhookError> for WebhookApiError {
    fn from(err: WebhookError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        let (error_code, message) = match &self.0 {
            WebhookError::Ignored(_) => {
                return (status, Json(WebhookAck::new("ignored"))).into_response();
            }
            WebhookError::MalformedCorrelationToken(_) => {
                return (status, Json(WebhookAck::new("malformed_token"))).into_response();
            }
            WebhookError::MissingTenant => ("MISSING_TENANT", self.0.to_string()),
            WebhookError::InvalidSignature => ("INVALID_SIGNATURE", self.0.to_string()),
            WebhookError::TimestampOutOfRange => ("TIMESTAMP_OUT_OF_RANGE", self.0.to_string()),
            WebhookError::ParseError(_) => ("INVALID_PAYLOAD", self.0.to_string()),
            WebhookError::Configuration(_) => (
                "TENANT_NOT_CONFIGURED",
                "Tenant is not configured for this provider".to_string(),
            ),
            WebhookError::UpstreamUnavailable(_) => (
                "UPSTREAM_UNAVAILABLE",
                "Signature verification is temporarily unavailable".to_string(),
            ),
            WebhookError::Storage(_) => ("INTERNAL_ERROR", "Internal error".to_string()),
        };
        (status, Json(ErrorResponse::new(error_code, message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::subscription::CorrelationError;

    #[test]
    fn ignored_events_are_acknowledged_with_200() {
        let response = WebhookApiError(WebhookError::Ignored("no such customer".into())).into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let response =
            WebhookApiError(WebhookError::MalformedCorrelationToken(CorrelationError::Missing))
                .into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn rejected_deliveries_map_to_client_errors() {
        for err in [
            WebhookError::MissingTenant,
            WebhookError::InvalidSignature,
            WebhookError::TimestampOutOfRange,
            WebhookError::ParseError("bad json".into()),
            WebhookError::Configuration("no stripe secret".into()),
        ] {
            assert_eq!(WebhookApiError(err).into_response().status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn infrastructure_failures_ask_for_redelivery() {
        let response =
            WebhookApiError(WebhookError::Storage("db down".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response =
            WebhookApiError(WebhookError::UpstreamUnavailable("timeout".into())).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
