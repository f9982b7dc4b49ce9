//! HTTP DTOs for the webhook endpoints.

use serde::{Deserialize, Serialize};

/// Query string of the payment webhook endpoints: `?tenant=<tenant_id>`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TenantQuery {
    #[serde(default)]
    pub tenant: Option<String>,
}

/// Body returned for every acknowledged payment webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookAck {
    pub received: bool,
    pub outcome: String,
}

impl WebhookAck {
    pub fn new(outcome: impl Into<String>) -> Self {
        Self {
            received: true,
            outcome: outcome.into(),
        }
    }
}

/// Standard error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
        }
    }
}
