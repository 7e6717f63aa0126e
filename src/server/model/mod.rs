use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::server::database::store::Collection;

pub(crate) mod config;
pub(crate) mod food;
pub(crate) mod invoice;
pub(crate) mod menu;
pub(crate) mod order;
pub(crate) mod order_item;
pub(crate) mod order_view;
pub(crate) mod table;
pub(crate) mod user;

/// Raw paging query parameters. Kept as strings so that garbage falls back to defaults.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct PageParams {
    pub page: Option<String>,
    #[serde(rename = "recordPerPage")]
    pub record_per_page: Option<String>,
    #[serde(rename = "startIndex")]
    pub start_index: Option<String>,
}

/// A document type living in its own collection, addressed by a business id field.
pub(crate) trait Entity: Serialize + DeserializeOwned {
    const COLLECTION: Collection;
    /// name of the business id field
    const KEY: &'static str;
    /// used in not-found messages
    const NAME: &'static str;
}

/// `$set`-style field list of a partial update. Absent values are skipped.
pub(crate) struct SetFields(Map<String, Value>);

impl SetFields {
    pub fn new(updated_at: DateTime<Utc>) -> Self {
        let mut fields = Map::new();
        fields.insert("updated_at".to_string(), to_json(&updated_at));
        Self(fields)
    }

    pub fn set<T: Serialize>(mut self, key: &str, value: Option<T>) -> Self {
        if let Some(value) = value {
            self.0.insert(key.to_string(), to_json(&value));
        }
        self
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

fn to_json<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

#[derive(Debug, Serialize)]
pub(crate) struct CreatedResponse {
    pub inserted_id: String,
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_fields_skip_absent_values() {
        let now = DateTime::<Utc>::from_timestamp(0, 0).unwrap();
        let fields = SetFields::new(now)
            .set("name", Some("soup"))
            .set::<f64>("price", None)
            .into_inner();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["name"], json!("soup"));
        assert_eq!(fields["updated_at"], json!("1970-01-01T00:00:00Z"));
    }

    #[test]
    fn page_params_use_camel_case_names() {
        let params: PageParams =
            serde_json::from_value(json!({"page": "2", "recordPerPage": "5", "startIndex": "3"}))
                .unwrap();
        assert_eq!(params.record_per_page.as_deref(), Some("5"));
        assert_eq!(params.start_index.as_deref(), Some("3"));
    }
}
