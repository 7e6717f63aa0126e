use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::server::database::error::StoreError;
use crate::server::database::store::{Collection, DocumentStore, Filter, UpdateResult};

/// Process-local document store. Used by tests and by `STORE_BACKEND=memory`.
#[derive(Default)]
pub(crate) struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Value>>>,
    next_id: AtomicU64,
}

impl MemoryStore {
    fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl DocumentStore for MemoryStore {
    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Value>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| filter.matches(doc))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Value>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections.get(&collection).and_then(|docs| {
            docs.iter().find(|doc| filter.matches(doc)).cloned()
        }))
    }

    async fn insert_one(&self, collection: Collection, doc: Value) -> Result<String, StoreError> {
        let mut ids = self.insert_many(collection, vec![doc]).await?;
        ids.pop().ok_or(StoreError::InvalidDocument)
    }

    async fn insert_many(
        &self,
        collection: Collection,
        docs: Vec<Value>,
    ) -> Result<Vec<String>, StoreError> {
        if docs.iter().any(|doc| !doc.is_object()) {
            return Err(StoreError::InvalidDocument);
        }
        let mut collections = self.collections.write().await;
        let stored = collections.entry(collection).or_default();
        let mut ids = Vec::with_capacity(docs.len());
        for doc in docs {
            stored.push(doc);
            ids.push(self.allocate_id().to_string());
        }
        Ok(ids)
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        set: Map<String, Value>,
        upsert: bool,
    ) -> Result<UpdateResult, StoreError> {
        let mut collections = self.collections.write().await;
        let stored = collections.entry(collection).or_default();

        if let Some(target) = stored.iter_mut().find(|doc| filter.matches(doc)) {
            let Value::Object(fields) = target else {
                return Err(StoreError::InvalidDocument);
            };
            let mut modified = false;
            for (key, value) in set {
                if fields.get(&key) != Some(&value) {
                    fields.insert(key, value);
                    modified = true;
                }
            }
            return Ok(UpdateResult {
                matched_count: 1,
                modified_count: u64::from(modified),
                upserted_id: None,
            });
        }

        if !upsert {
            return Ok(UpdateResult::default());
        }
        let mut doc = filter.seed();
        doc.extend(set);
        stored.push(Value::Object(doc));
        Ok(UpdateResult {
            upserted_id: Some(self.allocate_id().to_string()),
            ..UpdateResult::default()
        })
    }
}
