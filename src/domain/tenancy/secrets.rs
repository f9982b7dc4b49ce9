//! Per-tenant provider credentials.

use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use thiserror::Error;

use crate::domain::foundation::{DomainError, TelegramUserId, TenantId};

/// Secret names under a tenant's secret-store path.
pub mod keys {
    pub const TELEGRAM_BOT_TOKEN: &str = "telegram-bot-token";
    pub const TELEGRAM_WEBHOOK_SECRET: &str = "telegram-webhook-secret";
    pub const STRIPE_SECRET_KEY: &str = "stripe-secret-key";
    pub const STRIPE_WEBHOOK_SECRET: &str = "stripe-webhook-secret";
    pub const PAYPAL_CLIENT_ID: &str = "paypal-client-id";
    pub const PAYPAL_CLIENT_SECRET: &str = "paypal-client-secret";
    pub const PAYPAL_WEBHOOK_ID: &str = "paypal-webhook-id";
}

/// Failure to produce a usable secret set for a tenant.
#[derive(Debug, Clone, Error)]
pub enum SecretsError {
    /// The tenant is missing credentials every tenant must have.
    #[error("tenant {tenant_id} is missing mandatory secret '{key}'")]
    MissingSecret {
        tenant_id: TenantId,
        key: &'static str,
    },

    #[error("secret store failure: {0}")]
    Store(DomainError),
}

/// Credentials loaded for one tenant.
///
/// The Telegram pair is mandatory. Payment-provider credentials are
/// optional: a tenant may run Stripe only, PayPal only, both, or neither.
#[derive(Debug, Clone)]
pub struct TenantSecrets {
    pub telegram_bot_token: SecretString,
    pub telegram_webhook_secret: SecretString,
    pub stripe_secret_key: Option<SecretString>,
    pub stripe_webhook_secret: Option<SecretString>,
    pub paypal_client_id: Option<String>,
    pub paypal_client_secret: Option<SecretString>,
    pub paypal_webhook_id: Option<String>,
}

/// Complete PayPal credential set, only available when every part is configured.
#[derive(Debug, Clone, Copy)]
pub struct PayPalCredentials<'a> {
    pub client_id: &'a str,
    pub client_secret: &'a SecretString,
    pub webhook_id: &'a str,
}

impl TenantSecrets {
    /// Builds the secret set from raw parameters keyed by relative name.
    ///
    /// Empty values count as absent.
    pub fn from_parameters(
        tenant_id: &TenantId,
        params: &HashMap<String, String>,
    ) -> Result<Self, SecretsError> {
        let get = |key: &str| {
            params
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        let require = |key: &'static str| {
            get(key).ok_or_else(|| SecretsError::MissingSecret {
                tenant_id: tenant_id.clone(),
                key,
            })
        };

        Ok(Self {
            telegram_bot_token: SecretString::new(require(keys::TELEGRAM_BOT_TOKEN)?),
            telegram_webhook_secret: SecretString::new(require(keys::TELEGRAM_WEBHOOK_SECRET)?),
            stripe_secret_key: get(keys::STRIPE_SECRET_KEY).map(SecretString::new),
            stripe_webhook_secret: get(keys::STRIPE_WEBHOOK_SECRET).map(SecretString::new),
            paypal_client_id: get(keys::PAYPAL_CLIENT_ID),
            paypal_client_secret: get(keys::PAYPAL_CLIENT_SECRET).map(SecretString::new),
            paypal_webhook_id: get(keys::PAYPAL_WEBHOOK_ID),
        })
    }

    /// The bot's own Telegram user id, the numeric prefix of `<id>:<hash>` tokens.
    pub fn bot_user_id(&self) -> Option<TelegramUserId> {
        let (id, _) = self.telegram_bot_token.expose_secret().split_once(':')?;
        id.parse().ok()
    }

    pub fn paypal(&self) -> Option<PayPalCredentials<'_>> {
        Some(PayPalCredentials {
            client_id: self.paypal_client_id.as_deref()?,
            client_secret: self.paypal_client_secret.as_ref()?,
            webhook_id: self.paypal_webhook_id.as_deref()?,
        })
    }
}
