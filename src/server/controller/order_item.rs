use std::collections::HashSet;

use actix_web::{get, patch, post, web, HttpResponse, Responder};
use log::{info, warn};
use serde_json::Value;

use crate::server::aggregation::items_by_order;
use crate::server::controller::error::CustomError;
use crate::server::controller::order::create_order_record;
use crate::server::controller::{encode, ensure_exists, fetch, list_all, within};
use crate::server::database::store::{DocumentStore, Filter, Store};
use crate::server::model::food::Food;
use crate::server::model::order::Order;
use crate::server::model::order_item::{
    OrderItem, OrderItemPack, OrderItemPackResponse, OrderItemRequest,
};
use crate::server::model::order_view::OrderView;
use crate::server::model::{Entity, SetFields};
use crate::server::state::AppState;
use crate::server::util::id::new_object_id;
use crate::server::util::price::normalize_price;
use crate::server::util::time::helper::get_utc_now;
use crate::server::util::validation::{
    required, required_text, validate_count, validate_price, validate_text, MAX_NAME_LEN,
};

/// The billable view of one order. Line-items decide; a missing order document
/// only matters when no line-item refers to it either.
pub(crate) async fn order_view(store: &Store, order_id: &str) -> Result<OrderView, CustomError> {
    let mut views = items_by_order(store, Some(order_id)).await?;
    if views.is_empty() {
        ensure_exists::<Order>(store, order_id).await?;
        warn!("order {} has no line items", order_id);
        return Err(CustomError::EmptyOrder);
    }
    if views.len() > 1 {
        warn!(
            "order {} resolved to {} groups, returning the first",
            order_id,
            views.len()
        );
    }
    Ok(views.swap_remove(0))
}

#[get("/orderItems")]
pub(crate) async fn get_order_items(
    data: web::Data<AppState>,
) -> Result<impl Responder, CustomError> {
    Ok(web::Json(list_all::<OrderItem>(data.store()).await?))
}

#[get("/orderItems/{order_item_id}")]
pub(crate) async fn get_order_item(
    order_item_id: web::Path<String>,
    data: web::Data<AppState>,
) -> Result<impl Responder, CustomError> {
    let item: OrderItem = fetch(data.store(), &order_item_id).await?;
    Ok(web::Json(item))
}

#[get("/orderItems-order/{order_id}")]
/// line-items of an order joined with food, order and table
pub(crate) async fn get_order_items_by_order(
    order_id: web::Path<String>,
    data: web::Data<AppState>,
) -> Result<impl Responder, CustomError> {
    let store = data.store();
    Ok(web::Json(within(store, order_view(store, &order_id)).await?))
}

struct ValidItem {
    food_id: String,
    quantity: i64,
    unit_price: f64,
}

fn validate_item(item: OrderItemRequest) -> Result<ValidItem, CustomError> {
    let food_id = required_text(item.food_id, "food_id", MAX_NAME_LEN)?;
    let quantity = required(item.quantity, "quantity")?;
    validate_count(quantity, "quantity")?;
    let unit_price = required(item.unit_price, "unit_price")?;
    validate_price(unit_price, "unit_price")?;
    Ok(ValidItem {
        food_id,
        quantity,
        unit_price,
    })
}

#[post("/orderItems")]
/// open an order for a table and record its line-items
pub(crate) async fn create_order_items(
    req: web::Json<OrderItemPack>,
    data: web::Data<AppState>,
) -> Result<impl Responder, CustomError> {
    let pack = req.into_inner();
    if pack.order_items.is_empty() {
        return Err(CustomError::BadRequest {
            detail: "order_items must not be empty".to_string(),
        });
    }
    let items = pack
        .order_items
        .into_iter()
        .map(validate_item)
        .collect::<Result<Vec<_>, _>>()?;

    let store = data.store();
    let wanted: HashSet<&str> = items.iter().map(|item| item.food_id.as_str()).collect();
    let found = store
        .find(
            Food::COLLECTION,
            &Filter::is_in(Food::KEY, wanted.iter().map(|id| Value::from(*id)).collect()),
        )
        .await?;
    if found.len() < wanted.len() {
        let known: HashSet<&str> = found
            .iter()
            .filter_map(|doc| doc.get(Food::KEY).and_then(Value::as_str))
            .collect();
        if wanted.iter().any(|id| !known.contains(id)) {
            warn!("order items reference unknown food");
            return Err(CustomError::not_found(Food::NAME));
        }
    }

    let (_, order) = create_order_record(store, pack.table_id, None).await?;
    let now = get_utc_now();
    let docs = items
        .into_iter()
        .map(|item| {
            encode(&OrderItem {
                order_item_id: new_object_id(),
                order_id: order.order_id.clone(),
                food_id: item.food_id,
                quantity: item.quantity,
                unit_price: normalize_price(item.unit_price),
                created_at: now,
                updated_at: now,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let inserted_ids = store.insert_many(OrderItem::COLLECTION, docs).await?;
    info!(
        "order {} created with {} items",
        order.order_id,
        inserted_ids.len()
    );
    Ok(HttpResponse::Created().json(OrderItemPackResponse {
        order_id: order.order_id,
        inserted_ids,
    }))
}

#[patch("/orderItems/{order_item_id}")]
pub(crate) async fn update_order_item(
    order_item_id: web::Path<String>,
    req: web::Json<OrderItemRequest>,
    data: web::Data<AppState>,
) -> Result<impl Responder, CustomError> {
    let req = req.into_inner();
    if let Some(food_id) = &req.food_id {
        validate_text(food_id, "food_id", MAX_NAME_LEN)?;
    }
    if let Some(quantity) = req.quantity {
        validate_count(quantity, "quantity")?;
    }
    if let Some(unit_price) = req.unit_price {
        validate_price(unit_price, "unit_price")?;
    }

    let set = SetFields::new(get_utc_now())
        .set("food_id", req.food_id)
        .set("quantity", req.quantity)
        .set("unit_price", req.unit_price)
        .into_inner();
    let result = data
        .store()
        .update_one(
            OrderItem::COLLECTION,
            &Filter::eq(OrderItem::KEY, order_item_id.as_str()),
            set,
            true,
        )
        .await?;
    Ok(web::Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::controller::testing;
    use crate::server::database::store::Collection;
    use crate::server::routes;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::json;

    async fn restaurant() -> web::Data<AppState> {
        let state = testing::state();
        testing::seed(&state, Collection::Table, vec![json!({"table_id": "T1", "table_number": 3})]).await;
        testing::seed(
            &state,
            Collection::Food,
            vec![
                json!({"food_id": "F1", "name": "ramen", "price": 9.99, "food_image": "r.png", "menu_id": "m1"}),
                json!({"food_id": "F2", "name": "gyoza", "price": 4.50, "food_image": "g.png", "menu_id": "m1"}),
            ],
        )
        .await;
        state
    }

    #[actix_web::test]
    async fn pack_creates_order_and_view() {
        let state = restaurant().await;
        let app = test::init_service(App::new().app_data(state.clone()).configure(routes::configure)).await;

        let req = test::TestRequest::post()
            .uri("/orderItems")
            .set_json(json!({
                "table_id": "T1",
                "order_items": [
                    {"food_id": "F1", "quantity": 1, "unit_price": 9.994},
                    {"food_id": "F2", "quantity": 2, "unit_price": 4.5},
                ]
            }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let created: Value = test::read_body_json(res).await;
        assert_eq!(created["inserted_ids"].as_array().unwrap().len(), 2);
        let order_id = created["order_id"].as_str().unwrap().to_string();

        let req = test::TestRequest::get()
            .uri(&format!("/orderItems-order/{order_id}"))
            .to_request();
        let view: OrderView = test::call_and_read_body_json(&app, req).await;
        assert!((view.payment_due - 14.49).abs() < 1e-9);
        assert_eq!(view.total_count, 2);
        assert_eq!(view.table_number, Some(3));

        let req = test::TestRequest::get().uri("/orderItems").to_request();
        let items: Vec<OrderItem> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(items[0].unit_price, 9.99);
        assert_eq!(items[1].quantity, 2);
    }

    #[actix_web::test]
    async fn pack_is_validated_before_anything_is_written() {
        let state = restaurant().await;
        let app = test::init_service(App::new().app_data(state.clone()).configure(routes::configure)).await;

        let req = test::TestRequest::post()
            .uri("/orderItems")
            .set_json(json!({
                "table_id": "T1",
                "order_items": [
                    {"food_id": "F1", "quantity": 1, "unit_price": 9.99},
                    {"food_id": "F2", "quantity": 0, "unit_price": 4.5},
                ]
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/orderItems")
            .set_json(json!({
                "table_id": "T1",
                "order_items": [{"food_id": "GONE", "quantity": 1, "unit_price": 1.0}]
            }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body, json!({"error": "food not found"}));

        let orders = state.store().find(Collection::Order, &Filter::all()).await.unwrap();
        assert!(orders.is_empty());
    }

    #[actix_web::test]
    async fn view_of_missing_or_empty_order() {
        let state = restaurant().await;
        testing::seed(&state, Collection::Order, vec![json!({"order_id": "O1", "table_id": "T1"})]).await;
        let app = test::init_service(App::new().app_data(state.clone()).configure(routes::configure)).await;

        let req = test::TestRequest::get().uri("/orderItems-order/O9").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get().uri("/orderItems-order/O1").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body, json!({"error": "order has no line items"}));
    }

    #[actix_web::test]
    async fn dangling_food_keeps_the_row() {
        let state = restaurant().await;
        testing::seed(&state, Collection::Order, vec![json!({"order_id": "O1", "table_id": "T1"})]).await;
        testing::seed(
            &state,
            Collection::OrderItem,
            vec![
                json!({"order_item_id": "i1", "order_id": "O1", "food_id": "F1", "quantity": 1}),
                json!({"order_item_id": "i2", "order_id": "O1", "food_id": "REMOVED", "quantity": 1}),
            ],
        )
        .await;
        let app = test::init_service(App::new().app_data(state.clone()).configure(routes::configure)).await;

        let req = test::TestRequest::get().uri("/orderItems-order/O1").to_request();
        let view: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(view["total_count"], json!(2));
        assert_eq!(view["order_items"][1]["food_name"], Value::Null);
        assert_eq!(view["order_items"][1]["amount"], Value::Null);
    }

    #[actix_web::test]
    async fn view_survives_a_missing_order_document() {
        let state = restaurant().await;
        testing::seed(
            &state,
            Collection::OrderItem,
            vec![json!({"order_item_id": "i1", "order_id": "O1", "food_id": "F1", "quantity": 1})],
        )
        .await;
        let app = test::init_service(App::new().app_data(state.clone()).configure(routes::configure)).await;

        let req = test::TestRequest::get().uri("/orderItems-order/O1").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let view: OrderView = test::read_body_json(res).await;
        assert_eq!(view.total_count, 1);
        assert!((view.payment_due - 9.99).abs() < 1e-9);
        assert_eq!(view.table_number, None);
        assert_eq!(view.order_items[0].order_id, None);
    }
}
