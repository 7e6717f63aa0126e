use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::server::database::store::Collection;
use crate::server::model::Entity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Order {
    pub order_id: String,
    /// only orders taken at a table carry one
    pub table_id: Option<String>,
    pub order_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Order {
    const COLLECTION: Collection = Collection::Order;
    const KEY: &'static str = "order_id";
    const NAME: &'static str = "order";
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct OrderRequest {
    pub table_id: Option<String>,
    pub order_date: Option<DateTime<Utc>>,
}
