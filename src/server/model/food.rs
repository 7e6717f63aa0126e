use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::server::database::store::Collection;
use crate::server::model::Entity;

/// Documents created by an upserting update may lack fields; those decode to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Food {
    pub food_id: String,
    pub name: String,
    pub price: f64,
    pub food_image: String,
    pub menu_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Food {
    const COLLECTION: Collection = Collection::Food;
    const KEY: &'static str = "food_id";
    const NAME: &'static str = "food";
}

/// Body of `POST /foods` and `PATCH /foods/{id}`; every field is optional on update.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct FoodRequest {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub food_image: Option<String>,
    pub menu_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GetFoodsResponse {
    pub total_count: usize,
    pub food_items: Vec<Food>,
}
