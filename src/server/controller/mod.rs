use std::future::Future;

use log::{error, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::time;

use crate::server::controller::error::CustomError;
use crate::server::database::store::{DocumentStore, Filter, Store};
use crate::server::model::Entity;

pub(crate) mod error;
pub(crate) mod food;
pub(crate) mod invoice;
pub(crate) mod menu;
pub(crate) mod order;
pub(crate) mod order_item;
pub(crate) mod table;
pub(crate) mod user;

/// Bound a multi-step handler by one store timeout, on top of the per-call bounds.
pub(crate) async fn within<T, F>(store: &Store, steps: F) -> Result<T, CustomError>
where
    F: Future<Output = Result<T, CustomError>>,
{
    match time::timeout(store.timeout(), steps).await {
        Ok(result) => result,
        Err(_) => {
            warn!("request exceeded {:?}", store.timeout());
            Err(CustomError::Timeout)
        }
    }
}

pub(crate) fn decode<T: DeserializeOwned>(doc: Value) -> Result<T, CustomError> {
    serde_json::from_value(doc).map_err(|e| {
        error!("failed to decode document, {}", e);
        CustomError::DbError
    })
}

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Value, CustomError> {
    serde_json::to_value(value).map_err(|e| {
        error!("failed to encode document, {}", e);
        CustomError::Internal
    })
}

/// Load one entity by its business id, 404 when absent.
pub(crate) async fn fetch<E: Entity>(store: &Store, id: &str) -> Result<E, CustomError> {
    match store.find_one(E::COLLECTION, &Filter::eq(E::KEY, id)).await? {
        Some(doc) => decode(doc),
        None => {
            warn!("{} {} not found", E::NAME, id);
            Err(CustomError::not_found(E::NAME))
        }
    }
}

/// Reference check before a write. Not atomic with the write that follows.
pub(crate) async fn ensure_exists<E: Entity>(store: &Store, id: &str) -> Result<(), CustomError> {
    let found = store.find_one(E::COLLECTION, &Filter::eq(E::KEY, id)).await?;
    if found.is_none() {
        warn!("referenced {} {} not found", E::NAME, id);
        return Err(CustomError::not_found(E::NAME));
    }
    Ok(())
}

/// Every entity of a collection, in insertion order.
pub(crate) async fn list_all<E: Entity>(store: &Store) -> Result<Vec<E>, CustomError> {
    store
        .find(E::COLLECTION, &Filter::all())
        .await?
        .into_iter()
        .map(decode)
        .collect()
}

pub(crate) async fn insert<E: Entity>(store: &Store, entity: &E) -> Result<String, CustomError> {
    Ok(store.insert_one(E::COLLECTION, encode(entity)?).await?)
}
