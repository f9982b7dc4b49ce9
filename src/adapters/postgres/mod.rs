//! PostgreSQL adapters - Database implementations for storage ports.
//!
//! - `PostgresItemStore` - Key-value item store with one secondary index

mod item_store;

pub use item_store::PostgresItemStore;
