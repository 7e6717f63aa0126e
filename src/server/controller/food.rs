use actix_web::{get, patch, post, web, HttpResponse, Responder};
use log::info;

use crate::server::aggregation::paging::{list_page, PageRequest};
use crate::server::controller::error::CustomError;
use crate::server::controller::{ensure_exists, fetch, insert};
use crate::server::database::store::{DocumentStore, Filter};
use crate::server::model::food::{Food, FoodRequest, GetFoodsResponse};
use crate::server::model::menu::Menu;
use crate::server::model::{CreatedResponse, Entity, PageParams, SetFields};
use crate::server::state::AppState;
use crate::server::util::id::new_object_id;
use crate::server::util::price::normalize_price;
use crate::server::util::time::helper::get_utc_now;
use crate::server::util::validation::{
    required, required_text, validate_price, validate_text, MAX_NAME_LEN, MAX_URL_LEN,
};

#[get("/foods")]
/// one page of foods plus the overall count
pub(crate) async fn get_foods(
    query: web::Query<PageParams>,
    data: web::Data<AppState>,
) -> Result<impl Responder, CustomError> {
    let request = PageRequest::from(&query.into_inner());
    let page = list_page::<_, Food>(data.store(), Food::COLLECTION, request).await?;
    Ok(web::Json(GetFoodsResponse {
        total_count: page.total_count,
        food_items: page.items,
    }))
}

#[get("/foods/{food_id}")]
pub(crate) async fn get_food(
    food_id: web::Path<String>,
    data: web::Data<AppState>,
) -> Result<impl Responder, CustomError> {
    let food: Food = fetch(data.store(), &food_id).await?;
    Ok(web::Json(food))
}

#[post("/foods")]
pub(crate) async fn create_food(
    req: web::Json<FoodRequest>,
    data: web::Data<AppState>,
) -> Result<impl Responder, CustomError> {
    let req = req.into_inner();
    let name = required_text(req.name, "name", MAX_NAME_LEN)?;
    let price = required(req.price, "price")?;
    validate_price(price, "price")?;
    let food_image = required_text(req.food_image, "food_image", MAX_URL_LEN)?;
    let menu_id = required_text(req.menu_id, "menu_id", MAX_NAME_LEN)?;

    let store = data.store();
    ensure_exists::<Menu>(store, &menu_id).await?;

    let now = get_utc_now();
    let food = Food {
        food_id: new_object_id(),
        name,
        price: normalize_price(price),
        food_image,
        menu_id,
        created_at: now,
        updated_at: now,
    };
    let inserted_id = insert(store, &food).await?;
    info!("food {} created", food.food_id);
    Ok(HttpResponse::Created().json(CreatedResponse {
        inserted_id,
        id: food.food_id,
    }))
}

#[patch("/foods/{food_id}")]
/// partial update; an unknown id creates the food from the given fields
pub(crate) async fn update_food(
    food_id: web::Path<String>,
    req: web::Json<FoodRequest>,
    data: web::Data<AppState>,
) -> Result<impl Responder, CustomError> {
    let req = req.into_inner();
    if let Some(name) = &req.name {
        validate_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(price) = req.price {
        validate_price(price, "price")?;
    }
    if let Some(food_image) = &req.food_image {
        validate_text(food_image, "food_image", MAX_URL_LEN)?;
    }

    let store = data.store();
    if let Some(menu_id) = &req.menu_id {
        ensure_exists::<Menu>(store, menu_id).await?;
    }

    let set = SetFields::new(get_utc_now())
        .set("name", req.name)
        .set("price", req.price)
        .set("food_image", req.food_image)
        .set("menu_id", req.menu_id)
        .into_inner();
    let result = store
        .update_one(Food::COLLECTION, &Filter::eq(Food::KEY, food_id.as_str()), set, true)
        .await?;
    Ok(web::Json(result))
}
