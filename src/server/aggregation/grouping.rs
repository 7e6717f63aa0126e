use serde_json::Value;

use crate::server::aggregation::pipeline::{Accumulator, PipelineError, Projection, Stage, StageKind};
use crate::server::database::error::StoreError;
use crate::server::model::order_view::OrderView;

/// Flatten joined line-item rows and collapse them into one record per
/// `(order_id, table_id, table_number)`.
///
/// `payment_due` adds up the joined food price of every row and does not weigh
/// it by `quantity`.
pub(crate) fn order_view_stages() -> Vec<Stage> {
    vec![
        Stage::Project(vec![
            path("amount", "food.price"),
            path("food_name", "food.name"),
            path("food_image", "food.food_image"),
            path("table_number", "table.table_number"),
            path("table_id", "table.table_id"),
            path("order_id", "order.order_id"),
            path("price", "food.price"),
            ("quantity".to_string(), Projection::Include),
        ]),
        Stage::Group {
            key: vec![
                ("order_id".to_string(), "order_id".to_string()),
                ("table_id".to_string(), "table_id".to_string()),
                ("table_number".to_string(), "table_number".to_string()),
            ],
            accumulators: vec![
                ("payment_due".to_string(), Accumulator::Sum("amount".to_string())),
                ("total_count".to_string(), Accumulator::Count),
                ("order_items".to_string(), Accumulator::PushRoot),
            ],
        },
        Stage::Project(vec![
            path("table_number", "_id.table_number"),
            ("payment_due".to_string(), Projection::Include),
            ("total_count".to_string(), Projection::Include),
            ("order_items".to_string(), Projection::Include),
        ]),
    ]
}

fn path(name: &str, from: &str) -> (String, Projection) {
    (name.to_string(), Projection::Path(from.to_string()))
}

pub(crate) fn decode_views(rows: Vec<Value>) -> Result<Vec<OrderView>, PipelineError> {
    rows.into_iter()
        .map(|row| {
            serde_json::from_value(row)
                .map_err(StoreError::from)
                .map_err(PipelineError::at(StageKind::Group))
        })
        .collect()
}
