use serde::{Deserialize, Serialize};

/// One line-item row of a reconstructed order. Joined fields are `None` when
/// the referenced food, order or table no longer resolves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct OrderLine {
    pub amount: Option<f64>,
    pub food_name: Option<String>,
    pub food_image: Option<String>,
    pub table_number: Option<i64>,
    pub table_id: Option<String>,
    pub order_id: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<i64>,
}

/// A billable order: its line-items grouped under one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct OrderView {
    pub table_number: Option<i64>,
    pub payment_due: f64,
    pub total_count: u64,
    pub order_items: Vec<OrderLine>,
}
