use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::server::database::store::Collection;
use crate::server::model::order_view::OrderLine;
use crate::server::model::Entity;

pub(crate) const DEFAULT_PAYMENT_STATUS: &str = "PENDING";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Invoice {
    pub invoice_id: String,
    pub order_id: String,
    pub payment_method: Option<String>,
    pub payment_status: String,
    pub payment_due_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Invoice {
    const COLLECTION: Collection = Collection::Invoice;
    const KEY: &'static str = "invoice_id";
    const NAME: &'static str = "invoice";
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct InvoiceRequest {
    pub order_id: Option<String>,
    pub payment_method: Option<String>,
    pub payment_status: Option<String>,
    pub payment_due_date: Option<DateTime<Utc>>,
}

/// An invoice together with the bill of its order.
#[derive(Debug, Serialize)]
pub(crate) struct InvoiceView {
    pub invoice_id: String,
    pub order_id: String,
    pub payment_method: Option<String>,
    pub payment_status: String,
    pub payment_due_date: DateTime<Utc>,
    pub payment_due: f64,
    pub table_number: Option<i64>,
    pub order_details: Vec<OrderLine>,
}
