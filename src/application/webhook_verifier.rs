//! WebhookVerifier - Authenticity checks for every inbound webhook source.
//!
//! - Telegram: constant-time compare of the secret-token header.
//! - Stripe: local HMAC-SHA256 check of the `Stripe-Signature` header.
//! - PayPal: OAuth2 token exchange then a remote verify-signature call.
//!
//! `Ok(false)` means "not authentic" (the tenant never configured the
//! provider, or the provider said no). Errors are reserved for conditions
//! the caller maps to a distinct status, such as an unreachable provider.

use http::HeaderMap;
use secrecy::ExposeSecret;
use std::sync::Arc;

use crate::domain::foundation::TenantId;
use crate::domain::payments::stripe_signature::constant_time_compare;
use crate::domain::payments::{StripeSignatureCheck, WebhookError};
use crate::domain::tenancy::TenantSecrets;
use crate::ports::{Clock, PayPalApiError, PayPalVerificationApi, VerifySignatureRequest};

pub const TELEGRAM_SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";
pub const STRIPE_SIGNATURE_HEADER: &str = "stripe-signature";

/// Headers PayPal signs with, forwarded verbatim to verification.
pub mod paypal_headers {
    pub const AUTH_ALGO: &str = "paypal-auth-algo";
    pub const CERT_URL: &str = "paypal-cert-url";
    pub const TRANSMISSION_ID: &str = "paypal-transmission-id";
    pub const TRANSMISSION_SIG: &str = "paypal-transmission-sig";
    pub const TRANSMISSION_TIME: &str = "paypal-transmission-time";
}

const PAYPAL_VERIFIED: &str = "SUCCESS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookSource {
    Telegram,
    Stripe,
    PayPal,
}

pub struct WebhookVerifier {
    paypal: Arc<dyn PayPalVerificationApi>,
    clock: Arc<dyn Clock>,
    stripe_check: StripeSignatureCheck,
}

impl WebhookVerifier {
    pub fn new(
        paypal: Arc<dyn PayPalVerificationApi>,
        clock: Arc<dyn Clock>,
        stripe_check: StripeSignatureCheck,
    ) -> Self {
        Self {
            paypal,
            clock,
            stripe_check,
        }
    }

    pub async fn verify(
        &self,
        source: WebhookSource,
        tenant_id: &TenantId,
        headers: &HeaderMap,
        body: &[u8],
        secrets: &TenantSecrets,
    ) -> Result<bool, WebhookError> {
        match source {
            WebhookSource::Telegram => Ok(self.verify_telegram(headers, secrets)),
            WebhookSource::Stripe => self.verify_stripe(tenant_id, headers, body, secrets),
            WebhookSource::PayPal => self.verify_paypal(tenant_id, headers, body, secrets).await,
        }
    }

    fn verify_telegram(&self, headers: &HeaderMap, secrets: &TenantSecrets) -> bool {
        let Some(presented) = headers.get(TELEGRAM_SECRET_HEADER) else {
            return false;
        };
        constant_time_compare(
            presented.as_bytes(),
            secrets.telegram_webhook_secret.expose_secret().as_bytes(),
        )
    }

    fn verify_stripe(
        &self,
        tenant_id: &TenantId,
        headers: &HeaderMap,
        body: &[u8],
        secrets: &TenantSecrets,
    ) -> Result<bool, WebhookError> {
        let Some(secret) = secrets.stripe_webhook_secret.as_ref() else {
            tracing::warn!(tenant_id = %tenant_id, "Stripe webhook for tenant without Stripe secret");
            return Ok(false);
        };

        let header = headers
            .get(STRIPE_SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(WebhookError::InvalidSignature)?;

        self.stripe_check.verify(
            secret.expose_secret(),
            header,
            body,
            self.clock.now().as_unix_secs(),
        )?;
        Ok(true)
    }

    async fn verify_paypal(
        &self,
        tenant_id: &TenantId,
        headers: &HeaderMap,
        body: &[u8],
        secrets: &TenantSecrets,
    ) -> Result<bool, WebhookError> {
        let Some(credentials) = secrets.paypal() else {
            tracing::warn!(tenant_id = %tenant_id, "PayPal webhook for tenant without PayPal credentials");
            return Ok(false);
        };

        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let (
            Some(auth_algo),
            Some(cert_url),
            Some(transmission_id),
            Some(transmission_sig),
            Some(transmission_time),
        ) = (
            header(paypal_headers::AUTH_ALGO),
            header(paypal_headers::CERT_URL),
            header(paypal_headers::TRANSMISSION_ID),
            header(paypal_headers::TRANSMISSION_SIG),
            header(paypal_headers::TRANSMISSION_TIME),
        )
        else {
            tracing::warn!(tenant_id = %tenant_id, "PayPal webhook missing transmission headers");
            return Ok(false);
        };

        let webhook_event: serde_json::Value = serde_json::from_slice(body)
            .map_err(|e| WebhookError::ParseError(format!("Invalid JSON: {}", e)))?;

        let token = self
            .paypal
            .access_token(credentials.client_id, credentials.client_secret)
            .await
            .map_err(|e| match e {
                e if e.is_transient() => WebhookError::UpstreamUnavailable(e.to_string()),
                e => WebhookError::Configuration(format!("PayPal rejected credentials: {}", e)),
            })?;

        let request = VerifySignatureRequest {
            auth_algo,
            cert_url,
            transmission_id,
            transmission_sig,
            transmission_time,
            webhook_id: credentials.webhook_id.to_string(),
            webhook_event,
        };

        match self.paypal.verify_webhook_signature(&token, &request).await {
            Ok(status) => {
                let verified = status == PAYPAL_VERIFIED;
                if !verified {
                    tracing::warn!(
                        tenant_id = %tenant_id,
                        verification_status = %status,
                        "PayPal signature did not verify"
                    );
                }
                Ok(verified)
            }
            Err(e) if e.is_transient() => Err(WebhookError::UpstreamUnavailable(e.to_string())),
            Err(e @ PayPalApiError::Rejected { .. }) => {
                tracing::warn!(tenant_id = %tenant_id, error = %e, "PayPal rejected verification");
                Ok(false)
            }
            Err(e) => Err(WebhookError::UpstreamUnavailable(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{ManualClock, MockPayPalApi};
    use crate::domain::foundation::Timestamp;
    use crate::domain::payments::stripe_signature::sign;
    use crate::domain::tenancy::secret_keys;
    use http::HeaderValue;
    use std::collections::HashMap;

    const NOW: i64 = 1_700_000_000;

    fn tenant() -> TenantId {
        TenantId::new("t1").unwrap()
    }

    fn secrets(extra: &[(&str, &str)]) -> TenantSecrets {
        let mut params: HashMap<String, String> = HashMap::from([
            (secret_keys::TELEGRAM_BOT_TOKEN.to_string(), "555:bot".to_string()),
            (secret_keys::TELEGRAM_WEBHOOK_SECRET.to_string(), "S3cret".to_string()),
        ]);
        for (k, v) in extra {
            params.insert(k.to_string(), v.to_string());
        }
        TenantSecrets::from_parameters(&tenant(), &params).unwrap()
    }

    fn paypal_secrets() -> TenantSecrets {
        secrets(&[
            (secret_keys::PAYPAL_CLIENT_ID, "client"),
            (secret_keys::PAYPAL_CLIENT_SECRET, "shh"),
            (secret_keys::PAYPAL_WEBHOOK_ID, "WH-1"),
        ])
    }

    fn verifier() -> (WebhookVerifier, MockPayPalApi) {
        let paypal = MockPayPalApi::new();
        let clock = Arc::new(ManualClock::new(Timestamp::from_unix_secs(NOW).unwrap()));
        let verifier = WebhookVerifier::new(
            Arc::new(paypal.clone()),
            clock,
            StripeSignatureCheck::default(),
        );
        (verifier, paypal)
    }

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    fn signed_paypal_headers() -> HeaderMap {
        headers(&[
            (paypal_headers::AUTH_ALGO, "SHA256withRSA"),
            (paypal_headers::CERT_URL, "https://api.paypal.com/cert"),
            (paypal_headers::TRANSMISSION_ID, "tx-1"),
            (paypal_headers::TRANSMISSION_SIG, "sig"),
            (paypal_headers::TRANSMISSION_TIME, "2024-01-01T00:00:00Z"),
        ])
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Telegram
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn telegram_accepts_exact_secret() {
        let (verifier, _) = verifier();
        let ok = verifier
            .verify(
                WebhookSource::Telegram,
                &tenant(),
                &headers(&[(TELEGRAM_SECRET_HEADER, "S3cret")]),
                b"{}",
                &secrets(&[]),
            )
            .await
            .unwrap();
        assert!(ok);
    }

    #[tokio::test]
    async fn telegram_rejects_case_variant_and_absent_header() {
        let (verifier, _) = verifier();
        let s = secrets(&[]);

        for h in [
            headers(&[(TELEGRAM_SECRET_HEADER, "s3cret")]),
            headers(&[(TELEGRAM_SECRET_HEADER, "S3cret ")]),
            HeaderMap::new(),
        ] {
            let ok = verifier
                .verify(WebhookSource::Telegram, &tenant(), &h, b"{}", &s)
                .await
                .unwrap();
            assert!(!ok);
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Stripe
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn stripe_accepts_valid_signature() {
        let (verifier, _) = verifier();
        let body = br#"{"id":"evt_1"}"#;
        let sig = sign("whsec_x", NOW - 10, body).unwrap();

        let ok = verifier
            .verify(
                WebhookSource::Stripe,
                &tenant(),
                &headers(&[(STRIPE_SIGNATURE_HEADER, &sig)]),
                body,
                &secrets(&[(secret_keys::STRIPE_WEBHOOK_SECRET, "whsec_x")]),
            )
            .await
            .unwrap();

        assert!(ok);
    }

    #[tokio::test]
    async fn stripe_rejects_wrong_secret() {
        let (verifier, _) = verifier();
        let body = br#"{"id":"evt_1"}"#;
        let sig = sign("whsec_other", NOW, body).unwrap();

        let err = verifier
            .verify(
                WebhookSource::Stripe,
                &tenant(),
                &headers(&[(STRIPE_SIGNATURE_HEADER, &sig)]),
                body,
                &secrets(&[(secret_keys::STRIPE_WEBHOOK_SECRET, "whsec_x")]),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, WebhookError::InvalidSignature));
    }

    #[tokio::test]
    async fn stripe_rejects_stale_timestamp() {
        let (verifier, _) = verifier();
        let body = b"{}";
        let sig = sign("whsec_x", NOW - 301, body).unwrap();

        let err = verifier
            .verify(
                WebhookSource::Stripe,
                &tenant(),
                &headers(&[(STRIPE_SIGNATURE_HEADER, &sig)]),
                body,
                &secrets(&[(secret_keys::STRIPE_WEBHOOK_SECRET, "whsec_x")]),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, WebhookError::TimestampOutOfRange));
    }

    #[tokio::test]
    async fn stripe_missing_header_is_invalid_signature() {
        let (verifier, _) = verifier();

        let err = verifier
            .verify(
                WebhookSource::Stripe,
                &tenant(),
                &HeaderMap::new(),
                b"{}",
                &secrets(&[(secret_keys::STRIPE_WEBHOOK_SECRET, "whsec_x")]),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, WebhookError::InvalidSignature));
    }

    #[tokio::test]
    async fn stripe_unconfigured_tenant_is_not_verified() {
        let (verifier, _) = verifier();
        let body = b"{}";
        let sig = sign("whsec_x", NOW, body).unwrap();

        let ok = verifier
            .verify(
                WebhookSource::Stripe,
                &tenant(),
                &headers(&[(STRIPE_SIGNATURE_HEADER, &sig)]),
                body,
                &secrets(&[]),
            )
            .await
            .unwrap();

        assert!(!ok);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // PayPal
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn paypal_unconfigured_tenant_makes_no_network_call() {
        let (verifier, paypal) = verifier();

        let ok = verifier
            .verify(
                WebhookSource::PayPal,
                &tenant(),
                &signed_paypal_headers(),
                br#"{"id":"WH-EVT"}"#,
                &secrets(&[(secret_keys::PAYPAL_CLIENT_ID, "client")]),
            )
            .await
            .unwrap();

        assert!(!ok);
        assert_eq!(paypal.total_calls(), 0);
    }

    #[tokio::test]
    async fn paypal_success_forwards_headers_and_webhook_id() {
        let (verifier, paypal) = verifier();

        let ok = verifier
            .verify(
                WebhookSource::PayPal,
                &tenant(),
                &signed_paypal_headers(),
                br#"{"id":"WH-EVT"}"#,
                &paypal_secrets(),
            )
            .await
            .unwrap();

        assert!(ok);
        let requests = paypal.verify_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].webhook_id, "WH-1");
        assert_eq!(requests[0].transmission_id, "tx-1");
        assert_eq!(requests[0].auth_algo, "SHA256withRSA");
        assert_eq!(requests[0].webhook_event["id"], "WH-EVT");
    }

    #[tokio::test]
    async fn paypal_failure_status_is_not_verified() {
        let (verifier, paypal) = verifier();
        paypal.set_verify_result(Ok("FAILURE".to_string()));

        let ok = verifier
            .verify(
                WebhookSource::PayPal,
                &tenant(),
                &signed_paypal_headers(),
                b"{}",
                &paypal_secrets(),
            )
            .await
            .unwrap();

        assert!(!ok);
    }

    #[tokio::test]
    async fn paypal_unreachable_is_upstream_unavailable() {
        let (verifier, paypal) = verifier();
        paypal.set_verify_result(Err(PayPalApiError::Unreachable("timeout".into())));

        let err = verifier
            .verify(
                WebhookSource::PayPal,
                &tenant(),
                &signed_paypal_headers(),
                b"{}",
                &paypal_secrets(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, WebhookError::UpstreamUnavailable(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn paypal_verify_client_error_is_not_verified() {
        let (verifier, paypal) = verifier();
        paypal.set_verify_result(Err(PayPalApiError::Rejected { status: 400 }));

        let ok = verifier
            .verify(
                WebhookSource::PayPal,
                &tenant(),
                &signed_paypal_headers(),
                b"{}",
                &paypal_secrets(),
            )
            .await
            .unwrap();

        assert!(!ok);
    }

    #[tokio::test]
    async fn paypal_rejected_credentials_is_configuration_error() {
        let (verifier, paypal) = verifier();
        paypal.fail_token(PayPalApiError::Rejected { status: 401 });

        let err = verifier
            .verify(
                WebhookSource::PayPal,
                &tenant(),
                &signed_paypal_headers(),
                b"{}",
                &paypal_secrets(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, WebhookError::Configuration(_)));
        assert!(paypal.verify_requests().is_empty());
    }

    #[tokio::test]
    async fn paypal_missing_transmission_header_is_not_verified() {
        let (verifier, paypal) = verifier();
        let mut h = signed_paypal_headers();
        h.remove(paypal_headers::TRANSMISSION_SIG);

        let ok = verifier
            .verify(WebhookSource::PayPal, &tenant(), &h, b"{}", &paypal_secrets())
            .await
            .unwrap();

        assert!(!ok);
        assert_eq!(paypal.total_calls(), 0);
    }
}
