use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{PrismError, PrismResult};

/// Remote document database contract
///
/// Documents are loosely-typed JSON values grouped into named collections.
/// `query_by_prefix` is contractually sorted ascending and prefix-matched
/// on `order_field`; callers rely on that ordering and never re-sort.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one document by key, `None` if absent
    async fn get_by_key(&self, collection: &str, key: &str) -> PrismResult<Option<Value>>;

    /// Upsert a document under `collection`/`key`
    async fn put(&self, collection: &str, key: &str, doc: Value) -> PrismResult<()>;

    /// All documents whose `order_field` starts with `prefix`, ascending
    async fn query_by_prefix(
        &self,
        collection: &str,
        order_field: &str,
        prefix: &str,
    ) -> PrismResult<Vec<Value>>;
}

/// Thread-safe in-memory document store
///
/// Backs tests and demos with the same contract as the remote database.
/// Collections are `BTreeMap`s keyed by document key, wrapped in
/// `Arc<RwLock<_>>` so clones share state across tasks.
#[derive(Default, Clone)]
pub struct MemoryDocumentStore {
    collections: Arc<RwLock<HashMap<String, BTreeMap<String, Value>>>>,
}

impl MemoryDocumentStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get_by_key(&self, collection: &str, key: &str) -> PrismResult<Option<Value>> {
        let collections = self
            .collections
            .read()
            .map_err(|_| PrismError::generic("Failed to acquire read lock on document store"))?;

        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(key))
            .cloned())
    }

    async fn put(&self, collection: &str, key: &str, doc: Value) -> PrismResult<()> {
        let mut collections = self
            .collections
            .write()
            .map_err(|_| PrismError::generic("Failed to acquire write lock on document store"))?;

        collections
            .entry(collection.to_string())
            .or_default()
            .insert(key.to_string(), doc);
        Ok(())
    }

    async fn query_by_prefix(
        &self,
        collection: &str,
        order_field: &str,
        prefix: &str,
    ) -> PrismResult<Vec<Value>> {
        let collections = self
            .collections
            .read()
            .map_err(|_| PrismError::generic("Failed to acquire read lock on document store"))?;

        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut matched: Vec<Value> = docs
            .values()
            .filter(|doc| {
                doc.get(order_field)
                    .and_then(Value::as_str)
                    .is_some_and(|field| field.starts_with(prefix))
            })
            .cloned()
            .collect();

        matched.sort_by(|a, b| {
            let field_a = a.get(order_field).and_then(Value::as_str).unwrap_or("");
            let field_b = b.get(order_field).and_then(Value::as_str).unwrap_or("");
            field_a.cmp(field_b)
        });
        Ok(matched)
    }
}
