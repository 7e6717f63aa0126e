use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::server::database::store::Collection;
use crate::server::model::Entity;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Menu {
    pub menu_id: String,
    pub name: String,
    pub category: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Menu {
    const COLLECTION: Collection = Collection::Menu;
    const KEY: &'static str = "menu_id";
    const NAME: &'static str = "menu";
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MenuRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}
