//! PayPalVerificationApi port - Remote webhook signature verification.
//!
//! PayPal webhooks cannot be verified locally; the signature headers are
//! forwarded to PayPal together with the tenant's registered webhook id.

use async_trait::async_trait;
use secrecy::SecretString;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PayPalApiError {
    /// Network failure or timeout. Retryable.
    #[error("PayPal unreachable: {0}")]
    Unreachable(String),

    /// PayPal answered with a non-success HTTP status.
    #[error("PayPal rejected request with status {status}")]
    Rejected { status: u16 },
}

impl PayPalApiError {
    /// PayPal-side failures that a later retry may get past.
    pub fn is_transient(&self) -> bool {
        match self {
            PayPalApiError::Unreachable(_) => true,
            PayPalApiError::Rejected { status } => *status >= 500 || *status == 429,
        }
    }
}

/// Body of `POST /v1/notifications/verify-webhook-signature`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerifySignatureRequest {
    pub auth_algo: String,
    pub cert_url: String,
    pub transmission_id: String,
    pub transmission_sig: String,
    pub transmission_time: String,
    pub webhook_id: String,
    pub webhook_event: serde_json::Value,
}

#[async_trait]
pub trait PayPalVerificationApi: Send + Sync {
    /// OAuth2 client-credentials exchange.
    async fn access_token(
        &self,
        client_id: &str,
        client_secret: &SecretString,
    ) -> Result<SecretString, PayPalApiError>;

    /// Returns PayPal's `verification_status` (`SUCCESS` or `FAILURE`).
    async fn verify_webhook_signature(
        &self,
        access_token: &SecretString,
        request: &VerifySignatureRequest,
    ) -> Result<String, PayPalApiError>;
}
