//! Subscription domain module.
//!
//! # Module Structure
//!
//! - `status` - SubscriptionStatus of a user in a room
//! - `provider` - Stripe / PayPal discriminator
//! - `records` - UserProfile, UserRoom, ProviderMapping
//! - `correlation` - `tenant:user:room` checkout correlation token

mod correlation;
mod provider;
mod records;
mod status;

pub use correlation::{CorrelationError, CorrelationToken};
pub use provider::PaymentProvider;
pub use records::{ProviderMapping, UserProfile, UserRoom};
pub use status::SubscriptionStatus;
