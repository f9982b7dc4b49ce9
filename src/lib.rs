//! Tollgate - Paid access to Telegram groups, billed through Stripe and PayPal
//!
//! Many tenants share one deployment. Each tenant brings its own Telegram
//! bot and payment accounts; this crate verifies their webhooks, keeps the
//! subscription ledger in step with the providers, and answers subscribers
//! through the tenant's bot.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
