use crate::server::aggregation::pipeline::{Pipeline, Stage};
use crate::server::database::store::{Collection, Filter};

/// Left-outer join chain over order line-items: food, then order, then the
/// order's table. The table key is read from the joined order, so the order
/// join must come first.
pub(crate) fn order_item_joins(order_id: Option<&str>) -> Pipeline {
    let filter = match order_id {
        Some(id) => Filter::eq("order_id", id),
        None => Filter::all(),
    };
    Pipeline::new()
        .then(Stage::Match(filter))
        .extend(left_outer_join(Collection::Food, "food_id", "food_id", "food"))
        .extend(left_outer_join(Collection::Order, "order_id", "order_id", "order"))
        .extend(left_outer_join(Collection::Table, "order.table_id", "table_id", "table"))
}

fn left_outer_join(from: Collection, local_field: &str, foreign_field: &str, as_field: &str) -> [Stage; 2] {
    [
        Stage::Lookup {
            from,
            local_field: local_field.to_string(),
            foreign_field: foreign_field.to_string(),
            as_field: as_field.to_string(),
        },
        Stage::Unwind {
            path: as_field.to_string(),
            preserve_null: true,
        },
    ]
}
