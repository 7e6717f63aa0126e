use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::server::database::store::Collection;
use crate::server::model::Entity;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct OrderItem {
    pub order_item_id: String,
    pub order_id: String,
    pub food_id: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for OrderItem {
    const COLLECTION: Collection = Collection::OrderItem;
    const KEY: &'static str = "order_item_id";
    const NAME: &'static str = "order item";
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct OrderItemRequest {
    pub food_id: Option<String>,
    pub quantity: Option<i64>,
    pub unit_price: Option<f64>,
}

/// Body of `POST /orderItems`: a new order for `table_id` with its line-items.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct OrderItemPack {
    pub table_id: Option<String>,
    #[serde(default)]
    pub order_items: Vec<OrderItemRequest>,
}

#[derive(Debug, Serialize)]
pub(crate) struct OrderItemPackResponse {
    pub order_id: String,
    pub inserted_ids: Vec<String>,
}
