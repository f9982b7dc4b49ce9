//! PayPal adapters.

mod mock;
mod rest_client;

pub use mock::MockPayPalApi;
pub use rest_client::{PayPalRestClient, DEFAULT_API_BASE_URL};
