//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors)
//! - `tenancy` - Tenants, rooms and per-tenant credentials
//! - `subscription` - Ledger records, statuses and the correlation token
//! - `payments` - Provider webhook events, signatures and errors
//! - `telegram` - Bot updates, commands and reply text

pub mod foundation;
pub mod payments;
pub mod subscription;
pub mod telegram;
pub mod tenancy;
