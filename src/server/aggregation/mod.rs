//! Order reconstruction: joins line-items back to food, order and table,
//! groups them per order and pages through listings.

pub(crate) mod grouping;
pub(crate) mod joins;
pub(crate) mod paging;
pub(crate) mod pipeline;

use crate::server::aggregation::pipeline::PipelineError;
use crate::server::database::store::{Collection, DocumentStore};
use crate::server::model::order_view::OrderView;

/// Grouped order views for `order_id`, or for every order when `None`.
/// An order without line-items yields an empty vector.
pub(crate) async fn items_by_order<S: DocumentStore>(
    store: &S,
    order_id: Option<&str>,
) -> Result<Vec<OrderView>, PipelineError> {
    let pipeline = joins::order_item_joins(order_id).extend(grouping::order_view_stages());
    let rows = store.aggregate(Collection::OrderItem, &pipeline).await?;
    grouping::decode_views(rows)
}
