use std::time::Duration;

use log::{error, info, warn};
use serde_json::{Map, Value};
use tokio::task::JoinSet;
use tokio_postgres::types::ToSql;
use tokio_postgres::Client;

use crate::server::database::error::StoreError;
use crate::server::database::pool::Pool;
use crate::server::database::pool_config::PoolConfig;
use crate::server::database::store::{Collection, Condition, DocumentStore, Filter, UpdateResult};

type Param = Box<dyn ToSql + Sync + Send>;

pub(crate) mod connect_util {
    use log::error;
    use tokio_postgres::{Client, NoTls};

    /// open one client; the connection task lives until the client is dropped
    pub async fn connect(conn_str: &str) -> Result<Client, tokio_postgres::Error> {
        let (client, conn) = tokio_postgres::connect(conn_str, NoTls).await?;
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                error!("connection returned error and aborted, {}", e);
            }
        });
        Ok(client)
    }
}

/// Documents stored as JSONB rows of the `documents` table, one row per document.
pub(crate) struct PgDocumentStore {
    pool: Pool<Client>,
    acquire_timeout: Duration,
}

impl PgDocumentStore {
    pub async fn connect(config: &PoolConfig, acquire_timeout: Duration) -> Result<Self, StoreError> {
        let pool = Pool::new();
        let mut set = JoinSet::new();
        for _ in 0..config.size {
            let conn_str = config.conn_str.clone();
            set.spawn(async move { connect_util::connect(conn_str.as_str()).await });
        }
        let mut last_error = None;
        while let Some(res) = set.join_next().await {
            match res {
                Ok(Ok(client)) => {
                    info!("connection created");
                    pool.add(client);
                }
                Ok(Err(e)) => {
                    error!("failed to create connection, {}", e);
                    last_error = Some(StoreError::from(e));
                }
                Err(e) => {
                    error!("join_next failed when joining, {}", e);
                }
            };
        }
        if pool.idle() == 0 {
            return Err(last_error.unwrap_or(StoreError::PoolExhausted));
        }
        if pool.idle() < config.size {
            warn!("pool started with {} of {} connections", pool.idle(), config.size);
        }
        Ok(Self {
            pool,
            acquire_timeout,
        })
    }

    async fn query_docs(&self, stmt: &str, params: &[Param]) -> Result<Vec<Value>, StoreError> {
        let conn = self
            .pool
            .acquire(self.acquire_timeout)
            .await
            .ok_or(StoreError::PoolExhausted)?;
        let rows = conn.query(stmt, &as_refs(params)).await?;
        rows.iter()
            .map(|row| row.try_get::<_, Value>("doc").map_err(StoreError::from))
            .collect()
    }
}

fn as_refs(params: &[Param]) -> Vec<&(dyn ToSql + Sync)> {
    params
        .iter()
        .map(|p| p.as_ref() as &(dyn ToSql + Sync))
        .collect()
}

/// Render `filter` as a SQL predicate, appending its bind values to `params`.
fn where_clause(collection: Collection, filter: &Filter, params: &mut Vec<Param>) -> String {
    params.push(Box::new(collection.to_string()));
    let mut clause = format!("collection = ${}", params.len());
    for condition in filter.conditions() {
        let (field, value): (&String, Param) = match condition {
            Condition::Eq(field, value) => (field, Box::new(value.clone())),
            Condition::In(field, values) => (field, Box::new(values.clone())),
        };
        let path: Vec<String> = field.split('.').map(str::to_string).collect();
        params.push(Box::new(path));
        let path_idx = params.len();
        params.push(value);
        let value_idx = params.len();
        let rhs = match condition {
            Condition::Eq(..) => format!("= ${value_idx}::jsonb"),
            Condition::In(..) => format!("= ANY(${value_idx}::jsonb[])"),
        };
        clause.push_str(&format!(" AND (doc #> ${path_idx}::text[]) {rhs}"));
    }
    clause
}

impl DocumentStore for PgDocumentStore {
    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Value>, StoreError> {
        let mut params = Vec::new();
        let stmt = format!(
            "SELECT doc FROM documents WHERE {} ORDER BY id",
            where_clause(collection, filter, &mut params)
        );
        self.query_docs(&stmt, &params).await
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Value>, StoreError> {
        let mut params = Vec::new();
        let stmt = format!(
            "SELECT doc FROM documents WHERE {} ORDER BY id LIMIT 1",
            where_clause(collection, filter, &mut params)
        );
        Ok(self.query_docs(&stmt, &params).await?.into_iter().next())
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
        if docs.is_empty() {
            return Ok(vec![]);
        }
        if docs.iter().any(|doc| !doc.is_object()) {
            return Err(StoreError::InvalidDocument);
        }
        let mut stmt = "INSERT INTO documents(collection, doc) VALUES".to_string();
        let mut params: Vec<Param> = Vec::with_capacity(docs.len() + 1);
        params.push(Box::new(collection.to_string()));
        let len = docs.len();
        for (i, doc) in docs.into_iter().enumerate() {
            params.push(Box::new(doc));
            let maybe_comma = if i != len - 1 { "," } else { "" };
            stmt.push_str(&format!(" ($1, ${}::jsonb){}", params.len(), maybe_comma));
        }
        stmt.push_str(" RETURNING id");

        let conn = self
            .pool
            .acquire(self.acquire_timeout)
            .await
            .ok_or(StoreError::PoolExhausted)?;
        let rows = conn.query(stmt.as_str(), &as_refs(&params)).await?;
        rows.iter()
            .map(|row| {
                row.try_get::<_, i64>("id")
                    .map(|id| id.to_string())
                    .map_err(StoreError::from)
            })
            .collect()
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        set: Map<String, Value>,
        upsert: bool,
    ) -> Result<UpdateResult, StoreError> {
        let mut params = Vec::new();
        let predicate = where_clause(collection, filter, &mut params);
        params.push(Box::new(Value::Object(set.clone())));
        let stmt = format!(
            r#"
            WITH target AS (
                SELECT id, doc
                FROM documents
                WHERE {predicate}
                ORDER BY id
                LIMIT 1
                FOR UPDATE
            )
            UPDATE documents d
            SET doc = d.doc || ${}::jsonb
            FROM target
            WHERE d.id = target.id
            RETURNING target.doc IS DISTINCT FROM d.doc AS modified
            "#,
            params.len()
        );

        let conn = self
            .pool
            .acquire(self.acquire_timeout)
            .await
            .ok_or(StoreError::PoolExhausted)?;
        let rows = conn.query(stmt.as_str(), &as_refs(&params)).await?;
        if let Some(row) = rows.first() {
            let modified: bool = row.try_get("modified")?;
            return Ok(UpdateResult {
                matched_count: 1,
                modified_count: u64::from(modified),
                upserted_id: None,
            });
        }
        drop(conn);

        if !upsert {
            return Ok(UpdateResult::default());
        }
        let mut doc = filter.seed();
        doc.extend(set);
        let id = self.insert_one(collection, Value::Object(doc)).await?;
        Ok(UpdateResult {
            upserted_id: Some(id),
            ..UpdateResult::default()
        })
    }
}
