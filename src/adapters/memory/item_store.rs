//! In-memory item store for tests and single-process development.
//!
//! A `BTreeMap` ordered by `(pk, sk)` behind one `RwLock`; transactions
//! check every guard and apply every put under the same write lock, so
//! they are atomic with respect to each other.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::DomainError;
use crate::ports::{Item, ItemKey, ItemStore, PutRequest, WriteCondition, WriteOutcome};

#[derive(Debug, Clone, Default)]
pub struct InMemoryItemStore {
    items: Arc<RwLock<BTreeMap<ItemKey, Item>>>,
}

impl InMemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored items.
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

#[async_trait]
impl ItemStore for InMemoryItemStore {
    async fn get(&self, key: &ItemKey) -> Result<Option<Item>, DomainError> {
        Ok(self.items.read().await.get(key).cloned())
    }

    async fn put(&self, item: Item) -> Result<(), DomainError> {
        self.items.write().await.insert(item.key.clone(), item);
        Ok(())
    }

    async fn query_partition(&self, pk: &str, sk_prefix: &str) -> Result<Vec<Item>, DomainError> {
        let items = self.items.read().await;
        let start = ItemKey::new(pk, sk_prefix);

        Ok(items
            .range(start..)
            .take_while(|(key, _)| key.pk == pk && key.sk.starts_with(sk_prefix))
            .map(|(_, item)| item.clone())
            .collect())
    }

    async fn query_index(
        &self,
        index_pk: &str,
        index_sk_prefix: Option<&str>,
    ) -> Result<Vec<Item>, DomainError> {
        let items = self.items.read().await;

        let mut matches: Vec<Item> = items
            .values()
            .filter(|item| match &item.index_key {
                Some(ik) => {
                    ik.pk == index_pk
                        && index_sk_prefix.map_or(true, |prefix| ik.sk.starts_with(prefix))
                }
                None => false,
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.index_key.cmp(&b.index_key).then(a.key.cmp(&b.key)));
        Ok(matches)
    }

    async fn transact_put(&self, puts: Vec<PutRequest>) -> Result<WriteOutcome, DomainError> {
        let mut items = self.items.write().await;

        let guard_failed = puts.iter().any(|put| {
            put.condition == WriteCondition::NotExists && items.contains_key(&put.item.key)
        });
        if guard_failed {
            return Ok(WriteOutcome::ConditionFailed);
        }

        for put in puts {
            items.insert(put.item.key.clone(), put.item);
        }
        Ok(WriteOutcome::Applied)
    }

    async fn update_attributes(
        &self,
        key: &ItemKey,
        attributes: Map<String, Value>,
    ) -> Result<WriteOutcome, DomainError> {
        let mut items = self.items.write().await;

        match items.get_mut(key) {
            Some(item) => {
                item.attributes.extend(attributes);
                Ok(WriteOutcome::Applied)
            }
            None => Ok(WriteOutcome::ConditionFailed),
        }
    }
}
