//! Tenancy domain module.
//!
//! Tenants, the rooms they sell access to, and the credentials each
//! tenant brings for Telegram, Stripe and PayPal.

mod room;
mod secrets;
mod tenant;

pub use room::Room;
pub use secrets::{keys as secret_keys, PayPalCredentials, SecretsError, TenantSecrets};
pub use tenant::Tenant;
