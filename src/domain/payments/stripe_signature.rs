//! Stripe webhook signature verification.
//!
//! HMAC-SHA256 over `"{t}.{raw_body}"` with the tenant's webhook signing
//! secret, plus a timestamp window to limit replays.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::errors::WebhookError;

/// Default maximum age for signed events (5 minutes).
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Maximum allowed clock skew for future events (1 minute).
const MAX_CLOCK_SKEW_SECS: i64 = 60;

/// Parsed components from the Stripe-Signature header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    /// Unix timestamp when the signature was generated.
    pub timestamp: i64,
    /// Every v1 signature present. Stripe sends several while a secret is rolling.
    pub v1_signatures: Vec<Vec<u8>>,
}

impl SignatureHeader {
    /// Parses a Stripe-Signature header string.
    ///
    /// Format: `t=<timestamp>,v1=<signature>[,v1=<signature>][,v0=<legacy>]`
    pub fn parse(header: &str) -> Result<Self, WebhookError> {
        let mut timestamp: Option<i64> = None;
        let mut v1_signatures = Vec::new();

        for part in header.split(',') {
            let (key, value) = part
                .trim()
                .split_once('=')
                .ok_or_else(|| WebhookError::ParseError("invalid header format".to_string()))?;

            match key {
                "t" => {
                    timestamp = Some(value.parse().map_err(|_| {
                        WebhookError::ParseError("invalid timestamp".to_string())
                    })?);
                }
                "v1" => {
                    v1_signatures.push(hex::decode(value).map_err(|_| {
                        WebhookError::ParseError("invalid v1 signature hex".to_string())
                    })?);
                }
                _ => {
                    // v0 and future schemes are not trusted
                }
            }
        }

        let timestamp =
            timestamp.ok_or_else(|| WebhookError::ParseError("missing timestamp".to_string()))?;
        if v1_signatures.is_empty() {
            return Err(WebhookError::ParseError("missing v1 signature".to_string()));
        }

        Ok(SignatureHeader {
            timestamp,
            v1_signatures,
        })
    }
}

/// Checks a Stripe-Signature header against a signing secret.
#[derive(Debug, Clone, Copy)]
pub struct StripeSignatureCheck {
    tolerance_secs: i64,
}

impl Default for StripeSignatureCheck {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE_SECS)
    }
}

impl StripeSignatureCheck {
    pub fn new(tolerance_secs: i64) -> Self {
        Self { tolerance_secs }
    }

    /// Verifies `header` against `payload` as of `now_unix`.
    ///
    /// # Errors
    ///
    /// - `ParseError` - header malformed
    /// - `TimestampOutOfRange` - too old, or too far in the future
    /// - `InvalidSignature` - no v1 signature matches
    pub fn verify(
        &self,
        secret: &str,
        header: &str,
        payload: &[u8],
        now_unix: i64,
    ) -> Result<(), WebhookError> {
        let header = SignatureHeader::parse(header)?;

        let age = now_unix
            .checked_sub(header.timestamp)
            .ok_or(WebhookError::TimestampOutOfRange)?;
        if age > self.tolerance_secs || age < -MAX_CLOCK_SKEW_SECS {
            return Err(WebhookError::TimestampOutOfRange);
        }

        let expected = compute_signature(secret, header.timestamp, payload)?;
        let matched = header
            .v1_signatures
            .iter()
            .any(|candidate| constant_time_compare(&expected, candidate));

        if !matched {
            return Err(WebhookError::InvalidSignature);
        }
        Ok(())
    }
}

/// Builds a `Stripe-Signature` header value for `payload`.
///
/// Used by fixtures and local replay tooling.
pub fn sign(secret: &str, timestamp: i64, payload: &[u8]) -> Result<String, WebhookError> {
    let signature = compute_signature(secret, timestamp, payload)?;
    Ok(format!("t={},v1={}", timestamp, hex::encode(signature)))
}

fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> Result<Vec<u8>, WebhookError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|e| WebhookError::Configuration(e.to_string()))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Performs constant-time comparison of two byte slices.
pub(crate) fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
