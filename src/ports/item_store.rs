//! ItemStore port - Interface for the shared partition/sort key store.
//!
//! Every record (tenants, rooms, ledger rows, reverse indexes) lives in a
//! single store keyed by `(pk, sk)`, with one secondary index on
//! `(gsi1pk, gsi1sk)` that re-exposes rows under reverse-lookup partitions.
//!
//! ## Concurrency
//!
//! Races between concurrent webhook deliveries are resolved only by the
//! store's conditional writes. A failed guard is a structured
//! [`WriteOutcome::ConditionFailed`], never an error, so callers can tell
//! it apart from infrastructure failures.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::foundation::DomainError;

/// Composite primary key, also used for index keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemKey {
    pub pk: String,
    pub sk: String,
}

impl ItemKey {
    pub fn new(pk: impl Into<String>, sk: impl Into<String>) -> Self {
        Self {
            pk: pk.into(),
            sk: sk.into(),
        }
    }
}

/// One stored record.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub key: ItemKey,
    /// Secondary index key, if the record is reverse-indexed.
    pub index_key: Option<ItemKey>,
    /// Record body as a JSON object.
    pub attributes: Map<String, Value>,
}

/// Guard evaluated atomically with a put.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteCondition {
    /// Overwrite whatever is there.
    None,
    /// Create only if no item exists at the key.
    NotExists,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PutRequest {
    pub item: Item,
    pub condition: WriteCondition,
}

impl PutRequest {
    pub fn unconditional(item: Item) -> Self {
        Self {
            item,
            condition: WriteCondition::None,
        }
    }

    pub fn if_absent(item: Item) -> Self {
        Self {
            item,
            condition: WriteCondition::NotExists,
        }
    }
}

/// Result of a conditional write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Every write was applied.
    Applied,
    /// A guard failed; nothing was written.
    ConditionFailed,
}

#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Point read.
    async fn get(&self, key: &ItemKey) -> Result<Option<Item>, DomainError>;

    /// Unconditional single-item write.
    async fn put(&self, item: Item) -> Result<(), DomainError>;

    /// All items in partition `pk` whose sort key starts with `sk_prefix`,
    /// ordered by sort key.
    async fn query_partition(&self, pk: &str, sk_prefix: &str) -> Result<Vec<Item>, DomainError>;

    /// All items whose index partition is `index_pk`, optionally narrowed to
    /// index sort keys starting with `index_sk_prefix`.
    async fn query_index(
        &self,
        index_pk: &str,
        index_sk_prefix: Option<&str>,
    ) -> Result<Vec<Item>, DomainError>;

    /// Atomic multi-item write. Either every put is applied or none is.
    async fn transact_put(&self, puts: Vec<PutRequest>) -> Result<WriteOutcome, DomainError>;

    /// Merges `attributes` into an existing item.
    ///
    /// Returns `ConditionFailed` without writing when no item exists at `key`.
    async fn update_attributes(
        &self,
        key: &ItemKey,
        attributes: Map<String, Value>,
    ) -> Result<WriteOutcome, DomainError>;
}
