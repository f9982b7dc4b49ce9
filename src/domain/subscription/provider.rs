//! Payment providers a tenant can bill through.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentProvider {
    Stripe,
    PayPal,
}

impl PaymentProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentProvider::Stripe => "stripe",
            PaymentProvider::PayPal => "paypal",
        }
    }

    /// Key prefix of this provider's customer reverse-index records.
    pub fn customer_key_prefix(&self) -> &'static str {
        match self {
            PaymentProvider::Stripe => "STRIPECUST",
            PaymentProvider::PayPal => "PAYPALCUST",
        }
    }
}

impl std::fmt::Display for PaymentProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
