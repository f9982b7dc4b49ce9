//! Payment provider configuration
//!
//! Provider credentials are per tenant and live in the secret store; only
//! process-wide settings belong here.

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// PayPal REST API base (sandbox: `https://api-m.sandbox.paypal.com`)
    #[serde(default = "default_paypal_api_base_url")]
    pub paypal_api_base_url: String,

    /// Timeout for PayPal token and verification calls
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    /// Maximum age of a Stripe signature timestamp
    #[serde(default = "default_stripe_tolerance")]
    pub stripe_tolerance_secs: i64,
}

impl PaymentConfig {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Check if pointed at the PayPal sandbox
    pub fn is_paypal_sandbox(&self) -> bool {
        self.paypal_api_base_url.contains("sandbox")
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.paypal_api_base_url.starts_with("https://")
            && !self.paypal_api_base_url.starts_with("http://")
        {
            return Err(ValidationError::InvalidUrl("PAYMENT__PAYPAL_API_BASE_URL"));
        }
        if self.stripe_tolerance_secs <= 0 {
            return Err(ValidationError::InvalidTolerance);
        }
        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            paypal_api_base_url: default_paypal_api_base_url(),
            http_timeout_secs: default_http_timeout(),
            stripe_tolerance_secs: default_stripe_tolerance(),
        }
    }
}

fn default_paypal_api_base_url() -> String {
    "https://api-m.paypal.com".to_string()
}

fn default_http_timeout() -> u64 {
    10
}

fn default_stripe_tolerance() -> i64 {
    300
}
