//! Mock PayPal verification API for testing.
//!
//! Supports pre-configured responses, error injection and call tracking.

use async_trait::async_trait;
use secrecy::SecretString;
use std::sync::{Arc, Mutex};

use crate::ports::{PayPalApiError, PayPalVerificationApi, VerifySignatureRequest};

#[derive(Debug, Default, Clone)]
pub struct MockPayPalApi {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Debug)]
struct MockState {
    token_error: Option<PayPalApiError>,
    verify_result: Result<String, PayPalApiError>,
    token_calls: u32,
    verify_requests: Vec<VerifySignatureRequest>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            token_error: None,
            verify_result: Ok("SUCCESS".to_string()),
            token_calls: 0,
            verify_requests: Vec::new(),
        }
    }
}

impl MockPayPalApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Makes the token exchange fail.
    pub fn fail_token(&self, error: PayPalApiError) {
        self.state().token_error = Some(error);
    }

    /// Sets what signature verification returns.
    pub fn set_verify_result(&self, result: Result<String, PayPalApiError>) {
        self.state().verify_result = result;
    }

    pub fn token_calls(&self) -> u32 {
        self.state().token_calls
    }

    pub fn verify_requests(&self) -> Vec<VerifySignatureRequest> {
        self.state().verify_requests.clone()
    }

    /// Total network round trips attempted.
    pub fn total_calls(&self) -> usize {
        let state = self.state();
        state.token_calls as usize + state.verify_requests.len()
    }
}

#[async_trait]
impl PayPalVerificationApi for MockPayPalApi {
    async fn access_token(
        &self,
        _client_id: &str,
        _client_secret: &SecretString,
    ) -> Result<SecretString, PayPalApiError> {
        let mut state = self.state();
        state.token_calls += 1;
        match &state.token_error {
            Some(err) => Err(err.clone()),
            None => Ok(SecretString::new("A21AA-mock-token".to_string())),
        }
    }

    async fn verify_webhook_signature(
        &self,
        _access_token: &SecretString,
        request: &VerifySignatureRequest,
    ) -> Result<String, PayPalApiError> {
        let mut state = self.state();
        state.verify_requests.push(request.clone());
        state.verify_result.clone()
    }
}
