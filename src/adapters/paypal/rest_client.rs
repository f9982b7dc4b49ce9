//! PayPal REST adapter.
//!
//! Implements `PayPalVerificationApi` against PayPal's OAuth2 and
//! `verify-webhook-signature` endpoints. Tokens are obtained per call
//! and never persisted.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use crate::domain::foundation::DomainError;
use crate::ports::{PayPalApiError, PayPalVerificationApi, VerifySignatureRequest};

/// Live API base URL. Sandbox is `https://api-m.sandbox.paypal.com`.
pub const DEFAULT_API_BASE_URL: &str = "https://api-m.paypal.com";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct VerifySignatureResponse {
    verification_status: String,
}

pub struct PayPalRestClient {
    api_base_url: String,
    http_client: reqwest::Client,
}

impl PayPalRestClient {
    pub fn new(api_base_url: impl Into<String>, timeout: Duration) -> Result<Self, DomainError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::upstream(format!("Failed to build PayPal client: {}", e)))?;

        Ok(Self {
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            http_client,
        })
    }
}

fn network_error(e: reqwest::Error) -> PayPalApiError {
    PayPalApiError::Unreachable(e.to_string())
}

#[async_trait]
impl PayPalVerificationApi for PayPalRestClient {
    async fn access_token(
        &self,
        client_id: &str,
        client_secret: &SecretString,
    ) -> Result<SecretString, PayPalApiError> {
        let url = format!("{}/v1/oauth2/token", self.api_base_url);

        let response = self
            .http_client
            .post(&url)
            .basic_auth(client_id, Some(client_secret.expose_secret()))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "PayPal token exchange failed");
            return Err(PayPalApiError::Rejected {
                status: status.as_u16(),
            });
        }

        let token: TokenResponse = response.json().await.map_err(network_error)?;
        Ok(SecretString::new(token.access_token))
    }

    async fn verify_webhook_signature(
        &self,
        access_token: &SecretString,
        request: &VerifySignatureRequest,
    ) -> Result<String, PayPalApiError> {
        let url = format!(
            "{}/v1/notifications/verify-webhook-signature",
            self.api_base_url
        );

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(access_token.expose_secret())
            .json(request)
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                status = status.as_u16(),
                transmission_id = %request.transmission_id,
                "PayPal signature verification request failed"
            );
            return Err(PayPalApiError::Rejected {
                status: status.as_u16(),
            });
        }

        let body: VerifySignatureResponse = response.json().await.map_err(network_error)?;
        Ok(body.verification_status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed_from_base_url() {
        let client = PayPalRestClient::new("https://api-m.sandbox.paypal.com/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.api_base_url, "https://api-m.sandbox.paypal.com");
    }

    #[test]
    fn verify_response_decodes_status() {
        let body: VerifySignatureResponse =
            serde_json::from_str(r#"{"verification_status":"SUCCESS"}"#).unwrap();
        assert_eq!(body.verification_status, "SUCCESS");
    }
}
