use std::future::Future;
use std::time::Duration;

use derive_more::Display;
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::time;

use crate::server::aggregation::pipeline::{Pipeline, PipelineError};
use crate::server::database::document::{resolve_field, same_value};
use crate::server::database::error::StoreError;
use crate::server::database::memory::MemoryStore;
use crate::server::database::postgres::PgDocumentStore;

/// Document collections known to the service.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Collection {
    #[display("food")]
    Food,
    #[display("menu")]
    Menu,
    #[display("table")]
    Table,
    #[display("order")]
    Order,
    #[display("orderItem")]
    OrderItem,
    #[display("invoice")]
    Invoice,
    #[display("user")]
    User,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Condition {
    Eq(String, Value),
    In(String, Vec<Value>),
}

/// Conjunction of field conditions. An empty filter matches every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Self::all().and_eq(field, value)
    }

    pub fn is_in(field: &str, values: Vec<Value>) -> Self {
        Self {
            conditions: vec![Condition::In(field.to_string(), values)],
        }
    }

    pub fn and_eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.conditions
            .push(Condition::Eq(field.to_string(), value.into()));
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn matches(&self, doc: &Value) -> bool {
        self.conditions.iter().all(|c| match c {
            Condition::Eq(field, value) => same_value(&resolve_field(doc, field), value),
            Condition::In(field, values) => {
                let found = resolve_field(doc, field);
                values.iter().any(|v| same_value(&found, v))
            }
        })
    }

    /// Equality fields of the filter, used to seed a document on upsert.
    pub fn seed(&self) -> Map<String, Value> {
        self.conditions
            .iter()
            .filter_map(|c| match c {
                Condition::Eq(field, value) if !field.contains('.') => {
                    Some((field.clone(), value.clone()))
                }
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub(crate) struct UpdateResult {
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_id: Option<String>,
}

/// Primitive operations of a document store. Documents come back in insertion order.
pub(crate) trait DocumentStore: Send + Sync + 'static {
    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Value>, StoreError>;

    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Value>, StoreError>;

    /// Returns the storage-internal id of the new document.
    async fn insert_one(&self, collection: Collection, doc: Value) -> Result<String, StoreError>;

    async fn insert_many(
        &self,
        collection: Collection,
        docs: Vec<Value>,
    ) -> Result<Vec<String>, StoreError>;

    /// Merge `set` into the first document matching `filter`. With `upsert`, a missing
    /// document is created from the filter's equality fields plus `set`.
    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        set: Map<String, Value>,
        upsert: bool,
    ) -> Result<UpdateResult, StoreError>;

    async fn aggregate(
        &self,
        collection: Collection,
        pipeline: &Pipeline,
    ) -> Result<Vec<Value>, PipelineError>
    where
        Self: Sized,
    {
        pipeline.execute(self, collection).await
    }
}

/// Bound a store operation by `timeout`.
pub(crate) async fn bounded<T, F>(timeout: Duration, fut: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    let sleep = time::sleep(timeout);
    tokio::pin!(sleep);
    tokio::pin!(fut);
    tokio::select! {
        result = &mut fut => result,
        _ = &mut sleep => {
            log::warn!("store operation exceeded {:?}", timeout);
            Err(StoreError::Timeout)
        }
    }
}

enum Backend {
    Postgres(PgDocumentStore),
    Memory(MemoryStore),
}

/// The store handle shared by request handlers. Every operation is bounded by `timeout`.
pub(crate) struct Store {
    backend: Backend,
    timeout: Duration,
}

impl Store {
    pub fn postgres(store: PgDocumentStore, timeout: Duration) -> Self {
        Self {
            backend: Backend::Postgres(store),
            timeout,
        }
    }

    pub fn memory(store: MemoryStore, timeout: Duration) -> Self {
        Self {
            backend: Backend::Memory(store),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

macro_rules! dispatch {
    ($self:ident, $store:ident => $call:expr) => {
        bounded($self.timeout, async {
            match &$self.backend {
                Backend::Postgres($store) => $call.await,
                Backend::Memory($store) => $call.await,
            }
        })
        .await
    };
}

impl DocumentStore for Store {
    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Value>, StoreError> {
        dispatch!(self, s => s.find(collection, filter))
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Value>, StoreError> {
        dispatch!(self, s => s.find_one(collection, filter))
    }

    async fn insert_one(&self, collection: Collection, doc: Value) -> Result<String, StoreError> {
        dispatch!(self, s => s.insert_one(collection, doc))
    }

    async fn insert_many(
        &self,
        collection: Collection,
        docs: Vec<Value>,
    ) -> Result<Vec<String>, StoreError> {
        dispatch!(self, s => s.insert_many(collection, docs))
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        set: Map<String, Value>,
        upsert: bool,
    ) -> Result<UpdateResult, StoreError> {
        dispatch!(self, s => s.update_one(collection, filter, set, upsert))
    }

    /// The whole pipeline shares one deadline instead of bounding each read.
    async fn aggregate(
        &self,
        collection: Collection,
        pipeline: &Pipeline,
    ) -> Result<Vec<Value>, PipelineError>
    where
        Self: Sized,
    {
        let deadline = time::Instant::now() + self.timeout;
        match &self.backend {
            Backend::Postgres(s) => pipeline.execute_by(s, collection, deadline).await,
            Backend::Memory(s) => pipeline.execute_by(s, collection, deadline).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::future;

    #[test]
    fn filter_matches_eq_and_in() {
        let doc = json!({"order_id": "o1", "food_id": "f2"});
        assert!(Filter::all().matches(&doc));
        assert!(Filter::eq("order_id", "o1").matches(&doc));
        assert!(!Filter::eq("order_id", "o2").matches(&doc));
        assert!(Filter::is_in("food_id", vec![json!("f1"), json!("f2")]).matches(&doc));
        assert!(!Filter::eq("order_id", "o1").and_eq("food_id", "f1").matches(&doc));
    }

    #[test]
    fn filter_compares_numbers_by_value() {
        let doc = json!({"table_number": 3.0});
        assert!(Filter::eq("table_number", 3).matches(&doc));
        assert!(Filter::is_in("table_number", vec![json!(1), json!(3)]).matches(&doc));
        assert!(!Filter::eq("table_number", "3").matches(&doc));
    }

    #[test]
    fn seed_keeps_top_level_equalities() {
        let filter = Filter::eq("food_id", "f1").and_eq("a.b", 1);
        let seed = filter.seed();
        assert_eq!(seed.len(), 1);
        assert_eq!(seed["food_id"], json!("f1"));
    }

    #[tokio::test(start_paused = true)]
    async fn bounded_times_out() {
        let result: Result<(), StoreError> =
            bounded(Duration::from_secs(100), future::pending()).await;
        assert!(matches!(result, Err(StoreError::Timeout)));
    }

    #[tokio::test]
    async fn bounded_passes_result_through() {
        let result = bounded(Duration::from_secs(1), async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn aggregate_through_handle() {
        let store = Store::memory(MemoryStore::default(), Duration::from_secs(5));
        store
            .insert_many(
                Collection::OrderItem,
                vec![json!({"order_id": "o1"}), json!({"order_id": "o2"})],
            )
            .await
            .unwrap();
        let pipeline = Pipeline::new().then(crate::server::aggregation::pipeline::Stage::Match(
            Filter::eq("order_id", "o1"),
        ));
        let rows = store.aggregate(Collection::OrderItem, &pipeline).await.unwrap();
        assert_eq!(rows, vec![json!({"order_id": "o1"})]);
    }

    #[tokio::test]
    async fn memory_store_through_handle() {
        let store = Store::memory(MemoryStore::default(), Duration::from_secs(5));
        store
            .insert_one(Collection::Table, json!({"table_id": "t1", "table_number": 4}))
            .await
            .unwrap();
        let found = store
            .find_one(Collection::Table, &Filter::eq("table_id", "t1"))
            .await
            .unwrap();
        assert_eq!(found.unwrap()["table_number"], json!(4));
    }
}
