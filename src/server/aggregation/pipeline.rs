//! A small in-process aggregation pipeline.
//!
//! Stages are plain data; [`Pipeline::execute`] interprets them against the
//! primitive operations of a [`DocumentStore`]. A leading `Match` is pushed down
//! into the initial `find`, every `Lookup` is answered with one `find` using a
//! membership filter, and the remaining stages run over the materialized rows.
//! [`Pipeline::execute_by`] bounds all of those reads by a single deadline.

use std::collections::HashMap;

use derive_more::{Display, Error};
use serde_json::{Map, Number, Value};
use tokio::time::{self, Instant};

use crate::server::database::document::{key_of, resolve_field, same_value, set_field};
use crate::server::database::error::StoreError;
use crate::server::database::store::{Collection, DocumentStore, Filter};

/// Phase of the read path a failure is attributed to.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StageKind {
    #[display("match")]
    Match,
    #[display("join")]
    Join,
    #[display("group")]
    Group,
    #[display("slice")]
    Slice,
}

#[derive(Debug, Display, Error)]
#[display("{stage} stage failed, {source}")]
pub(crate) struct PipelineError {
    pub stage: StageKind,
    pub source: StoreError,
}

impl PipelineError {
    pub fn at(stage: StageKind) -> impl FnOnce(StoreError) -> PipelineError {
        move |source| PipelineError { stage, source }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Projection {
    /// keep the field under its own name
    Include,
    /// take the value found at a dotted path
    Path(String),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Accumulator {
    /// numeric sum of a path; non-numbers contribute nothing
    Sum(String),
    Count,
    /// collect every grouped row, in arrival order
    PushRoot,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Stage {
    Match(Filter),
    /// left-outer join: `as_field` receives the array of matching foreign documents
    Lookup {
        from: Collection,
        local_field: String,
        foreign_field: String,
        as_field: String,
    },
    /// one row per element of the array at `path`; with `preserve_null` rows with
    /// an empty or missing array are kept and the path is set to null
    Unwind { path: String, preserve_null: bool },
    Project(Vec<(String, Projection)>),
    /// group by a composite key of `(output name, path)` pairs; the key lands in `_id`
    Group {
        key: Vec<(String, String)>,
        accumulators: Vec<(String, Accumulator)>,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn extend(mut self, stages: impl IntoIterator<Item = Stage>) -> Self {
        self.stages.extend(stages);
        self
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub async fn execute<S: DocumentStore>(
        &self,
        store: &S,
        collection: Collection,
    ) -> Result<Vec<Value>, PipelineError> {
        self.run(store, collection, None).await
    }

    /// Like [`Pipeline::execute`], failing with a timeout attributed to the running
    /// stage once `deadline` passes.
    pub async fn execute_by<S: DocumentStore>(
        &self,
        store: &S,
        collection: Collection,
        deadline: Instant,
    ) -> Result<Vec<Value>, PipelineError> {
        self.run(store, collection, Some(deadline)).await
    }

    async fn run<S: DocumentStore>(
        &self,
        store: &S,
        collection: Collection,
        deadline: Option<Instant>,
    ) -> Result<Vec<Value>, PipelineError> {
        let (initial, rest) = match self.stages.split_first() {
            Some((Stage::Match(filter), rest)) => (filter.clone(), rest),
            _ => (Filter::all(), self.stages.as_slice()),
        };
        let mut rows = find_by(store, collection, &initial, deadline, StageKind::Match).await?;

        for stage in rest {
            rows = match stage {
                Stage::Match(filter) => rows.into_iter().filter(|r| filter.matches(r)).collect(),
                Stage::Lookup {
                    from,
                    local_field,
                    foreign_field,
                    as_field,
                } => {
                    let join = Join {
                        from: *from,
                        local_field,
                        foreign_field,
                        as_field,
                    };
                    lookup(store, rows, join, deadline).await?
                }
                Stage::Unwind {
                    path,
                    preserve_null,
                } => unwind(rows, path, *preserve_null),
                Stage::Project(fields) => project(rows, fields),
                Stage::Group { key, accumulators } => group(rows, key, accumulators),
            };
        }
        Ok(rows)
    }
}

async fn find_by<S: DocumentStore>(
    store: &S,
    collection: Collection,
    filter: &Filter,
    deadline: Option<Instant>,
    stage: StageKind,
) -> Result<Vec<Value>, PipelineError> {
    let found = match deadline {
        Some(deadline) => time::timeout_at(deadline, store.find(collection, filter))
            .await
            .unwrap_or(Err(StoreError::Timeout)),
        None => store.find(collection, filter).await,
    };
    found.map_err(PipelineError::at(stage))
}

struct Join<'a> {
    from: Collection,
    local_field: &'a str,
    foreign_field: &'a str,
    as_field: &'a str,
}

async fn lookup<S: DocumentStore>(
    store: &S,
    rows: Vec<Value>,
    join: Join<'_>,
    deadline: Option<Instant>,
) -> Result<Vec<Value>, PipelineError> {
    let Join {
        from,
        local_field,
        foreign_field,
        as_field,
    } = join;
    let mut wanted: Vec<Value> = Vec::new();
    for row in &rows {
        let local = resolve_field(row, local_field);
        if !local.is_null() && !wanted.iter().any(|w| same_value(w, &local)) {
            wanted.push(local);
        }
    }

    let mut by_key: HashMap<String, Vec<Value>> = HashMap::new();
    if !wanted.is_empty() {
        let filter = Filter::is_in(foreign_field, wanted);
        let foreign = find_by(store, from, &filter, deadline, StageKind::Join).await?;
        for doc in foreign {
            by_key
                .entry(key_of(&resolve_field(&doc, foreign_field)))
                .or_default()
                .push(doc);
        }
    }

    Ok(rows
        .into_iter()
        .map(|mut row| {
            let local = resolve_field(&row, local_field);
            let matched = if local.is_null() {
                vec![]
            } else {
                by_key.get(&key_of(&local)).cloned().unwrap_or_default()
            };
            set_field(&mut row, as_field, Value::Array(matched));
            row
        })
        .collect())
}

fn unwind(rows: Vec<Value>, path: &str, preserve_null: bool) -> Vec<Value> {
    let mut result = Vec::with_capacity(rows.len());
    for row in rows {
        match resolve_field(&row, path) {
            Value::Array(items) if !items.is_empty() => {
                for item in items {
                    let mut unwound = row.clone();
                    set_field(&mut unwound, path, item);
                    result.push(unwound);
                }
            }
            Value::Array(_) | Value::Null => {
                if preserve_null {
                    let mut kept = row;
                    set_field(&mut kept, path, Value::Null);
                    result.push(kept);
                }
            }
            _ => result.push(row),
        }
    }
    result
}

fn project(rows: Vec<Value>, fields: &[(String, Projection)]) -> Vec<Value> {
    rows.into_iter()
        .map(|row| {
            let projected: Map<String, Value> = fields
                .iter()
                .map(|(name, projection)| {
                    let value = match projection {
                        Projection::Include => resolve_field(&row, name),
                        Projection::Path(path) => resolve_field(&row, path),
                    };
                    (name.clone(), value)
                })
                .collect();
            Value::Object(projected)
        })
        .collect()
}

enum State {
    Sum(f64),
    Count(u64),
    Push(Vec<Value>),
}

fn group(
    rows: Vec<Value>,
    key: &[(String, String)],
    accumulators: &[(String, Accumulator)],
) -> Vec<Value> {
    let mut groups: HashMap<String, (Value, Vec<State>)> = HashMap::new();
    let mut first_seen: Vec<String> = Vec::new();

    for row in rows {
        let key_val = Value::Object(
            key.iter()
                .map(|(name, path)| (name.clone(), resolve_field(&row, path)))
                .collect(),
        );
        let key_str = key_of(&key_val);
        let (_, states) = groups.entry(key_str.clone()).or_insert_with(|| {
            first_seen.push(key_str);
            let initial = accumulators
                .iter()
                .map(|(_, acc)| match acc {
                    Accumulator::Sum(_) => State::Sum(0.0),
                    Accumulator::Count => State::Count(0),
                    Accumulator::PushRoot => State::Push(Vec::new()),
                })
                .collect();
            (key_val, initial)
        });

        for ((_, acc), state) in accumulators.iter().zip(states.iter_mut()) {
            match (acc, state) {
                (Accumulator::Sum(path), State::Sum(total)) => {
                    if let Some(n) = resolve_field(&row, path).as_f64() {
                        *total += n;
                    }
                }
                (Accumulator::Count, State::Count(count)) => *count += 1,
                (Accumulator::PushRoot, State::Push(items)) => items.push(row.clone()),
                _ => {}
            }
        }
    }

    first_seen
        .into_iter()
        .filter_map(|key_str| groups.remove(&key_str))
        .map(|(key_val, states)| {
            let mut doc = Map::new();
            doc.insert("_id".to_string(), key_val);
            for ((name, _), state) in accumulators.iter().zip(states) {
                let value = match state {
                    State::Sum(total) => Number::from_f64(total).map_or(Value::Null, Value::Number),
                    State::Count(count) => Value::from(count),
                    State::Push(items) => Value::Array(items),
                };
                doc.insert(name.clone(), value);
            }
            Value::Object(doc)
        })
        .collect()
}
