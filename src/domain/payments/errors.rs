//! Webhook error types for payment-provider webhook handling.
//!
//! Every failure carries the HTTP status the provider should see, which
//! is what drives the provider's own retry behaviour.

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::DomainError;
use crate::domain::subscription::CorrelationError;
use crate::domain::tenancy::SecretsError;

/// Errors that occur during webhook processing.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The `?tenant=` query parameter was absent or unusable.
    #[error("Missing tenant")]
    MissingTenant,

    /// Webhook signature verification failed.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Signed timestamp is too old or too far in the future.
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Failed to parse webhook payload or signature header.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Tenant configuration is incomplete or was rejected by the provider.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Activation carried a correlation token that cannot be trusted.
    #[error("Malformed correlation token: {0}")]
    MalformedCorrelationToken(#[from] CorrelationError),

    /// Event was intentionally ignored (not an error condition).
    #[error("Event ignored: {0}")]
    Ignored(String),

    /// Provider verification endpoint could not be reached.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Ledger read or write failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl WebhookError {
    /// Returns true if the provider should retry delivering this webhook.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WebhookError::UpstreamUnavailable(_) | WebhookError::Storage(_)
        )
    }

    /// Maps the error to an appropriate HTTP status code.
    ///
    /// - 2xx: Event acknowledged, no retry
    /// - 4xx: Client error, no retry
    /// - 5xx: Server error, will retry
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::MissingTenant
            | WebhookError::InvalidSignature
            | WebhookError::TimestampOutOfRange
            | WebhookError::ParseError(_)
            | WebhookError::Configuration(_) => StatusCode::BAD_REQUEST,

            // Redelivery would not help
            WebhookError::MalformedCorrelationToken(_) | WebhookError::Ignored(_) => {
                StatusCode::OK
            }

            WebhookError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            WebhookError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DomainError> for WebhookError {
    fn from(err: DomainError) -> Self {
        WebhookError::Storage(err.to_string())
    }
}

impl From<SecretsError> for WebhookError {
    fn from(err: SecretsError) -> Self {
        match err {
            SecretsError::MissingSecret { .. } => WebhookError::Configuration(err.to_string()),
            SecretsError::Store(e) => WebhookError::Storage(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::TenantId;

    // ══════════════════════════════════════════════════════════════
    // Error Display Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn invalid_signature_displays_correctly() {
        assert_eq!(format!("{}", WebhookError::InvalidSignature), "Invalid signature");
    }

    #[test]
    fn parse_error_displays_message() {
        let err = WebhookError::ParseError("invalid JSON".to_string());
        assert_eq!(format!("{}", err), "Parse error: invalid JSON");
    }

    // ══════════════════════════════════════════════════════════════
    // Status Code Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn verification_and_configuration_failures_are_client_errors() {
        assert_eq!(WebhookError::MissingTenant.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(WebhookError::InvalidSignature.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(WebhookError::TimestampOutOfRange.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            WebhookError::Configuration("no stripe secret".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn dropped_events_are_acknowledged() {
        assert_eq!(
            WebhookError::MalformedCorrelationToken(CorrelationError::Missing).status_code(),
            StatusCode::OK
        );
        assert_eq!(WebhookError::Ignored("x".into()).status_code(), StatusCode::OK);
    }

    #[test]
    fn infrastructure_failures_are_server_errors_and_retryable() {
        let upstream = WebhookError::UpstreamUnavailable("timeout".into());
        let storage = WebhookError::Storage("db down".into());

        assert_eq!(upstream.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(storage.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(upstream.is_retryable());
        assert!(storage.is_retryable());
        assert!(!WebhookError::InvalidSignature.is_retryable());
    }

    #[test]
    fn missing_secret_maps_to_configuration_error() {
        let err: WebhookError = SecretsError::MissingSecret {
            tenant_id: TenantId::new("t1").unwrap(),
            key: "telegram-bot-token",
        }
        .into();
        assert!(matches!(err, WebhookError::Configuration(_)));
    }
}
