use actix_web::{get, patch, post, web, HttpResponse, Responder};
use chrono::{DateTime, Utc};
use log::info;

use crate::server::controller::error::CustomError;
use crate::server::controller::{ensure_exists, fetch, insert, list_all};
use crate::server::database::store::{DocumentStore, Filter, Store};
use crate::server::model::order::{Order, OrderRequest};
use crate::server::model::table::Table;
use crate::server::model::{CreatedResponse, Entity, SetFields};
use crate::server::state::AppState;
use crate::server::util::id::new_object_id;
use crate::server::util::time::helper::get_utc_now;

/// Check the table, then insert a new order for it. The two steps are separate
/// round-trips.
pub(crate) async fn create_order_record(
    store: &Store,
    table_id: Option<String>,
    order_date: Option<DateTime<Utc>>,
) -> Result<(String, Order), CustomError> {
    if let Some(table_id) = &table_id {
        ensure_exists::<Table>(store, table_id).await?;
    }
    let now = get_utc_now();
    let order = Order {
        order_id: new_object_id(),
        table_id,
        order_date: order_date.unwrap_or(now),
        created_at: now,
        updated_at: now,
    };
    let inserted_id = insert(store, &order).await?;
    info!("order {} created", order.order_id);
    Ok((inserted_id, order))
}

#[get("/orders")]
pub(crate) async fn get_orders(data: web::Data<AppState>) -> Result<impl Responder, CustomError> {
    Ok(web::Json(list_all::<Order>(data.store()).await?))
}

#[get("/orders/{order_id}")]
pub(crate) async fn get_order(
    order_id: web::Path<String>,
    data: web::Data<AppState>,
) -> Result<impl Responder, CustomError> {
    let order: Order = fetch(data.store(), &order_id).await?;
    Ok(web::Json(order))
}

#[post("/orders")]
pub(crate) async fn create_order(
    req: web::Json<OrderRequest>,
    data: web::Data<AppState>,
) -> Result<impl Responder, CustomError> {
    let req = req.into_inner();
    let (inserted_id, order) = create_order_record(data.store(), req.table_id, req.order_date).await?;
    Ok(HttpResponse::Created().json(CreatedResponse {
        inserted_id,
        id: order.order_id,
    }))
}

#[patch("/orders/{order_id}")]
pub(crate) async fn update_order(
    order_id: web::Path<String>,
    req: web::Json<OrderRequest>,
    data: web::Data<AppState>,
) -> Result<impl Responder, CustomError> {
    let req = req.into_inner();
    let store = data.store();
    if let Some(table_id) = &req.table_id {
        ensure_exists::<Table>(store, table_id).await?;
    }

    let set = SetFields::new(get_utc_now())
        .set("table_id", req.table_id)
        .set("order_date", req.order_date)
        .into_inner();
    let result = store
        .update_one(Order::COLLECTION, &Filter::eq(Order::KEY, order_id.as_str()), set, false)
        .await?;
    Ok(web::Json(result))
}
