use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::server::database::store::Collection;
use crate::server::model::Entity;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Table {
    pub table_id: String,
    pub table_number: i64,
    pub number_of_guests: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Table {
    const COLLECTION: Collection = Collection::Table;
    const KEY: &'static str = "table_id";
    const NAME: &'static str = "table";
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TableRequest {
    pub table_number: Option<i64>,
    pub number_of_guests: Option<i64>,
}
