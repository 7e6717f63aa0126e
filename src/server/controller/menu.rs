use actix_web::{get, patch, post, web, HttpResponse, Responder};
use log::{info, warn};

use crate::server::controller::error::CustomError;
use crate::server::controller::{fetch, insert, list_all};
use crate::server::database::store::{DocumentStore, Filter};
use crate::server::model::menu::{Menu, MenuRequest};
use crate::server::model::{CreatedResponse, Entity, SetFields};
use crate::server::state::AppState;
use crate::server::util::id::new_object_id;
use crate::server::util::time::helper::get_utc_now;
use crate::server::util::time::in_time_span;
use crate::server::util::validation::{required_text, validate_text, MAX_NAME_LEN};

#[get("/menus")]
pub(crate) async fn get_menus(data: web::Data<AppState>) -> Result<impl Responder, CustomError> {
    Ok(web::Json(list_all::<Menu>(data.store()).await?))
}

#[get("/menus/{menu_id}")]
pub(crate) async fn get_menu(
    menu_id: web::Path<String>,
    data: web::Data<AppState>,
) -> Result<impl Responder, CustomError> {
    let menu: Menu = fetch(data.store(), &menu_id).await?;
    Ok(web::Json(menu))
}

#[post("/menus")]
pub(crate) async fn create_menu(
    req: web::Json<MenuRequest>,
    data: web::Data<AppState>,
) -> Result<impl Responder, CustomError> {
    let req = req.into_inner();
    let name = required_text(req.name, "name", MAX_NAME_LEN)?;
    let category = required_text(req.category, "category", MAX_NAME_LEN)?;

    let now = get_utc_now();
    let menu = Menu {
        menu_id: new_object_id(),
        name,
        category,
        start_date: req.start_date,
        end_date: req.end_date,
        created_at: now,
        updated_at: now,
    };
    let inserted_id = insert(data.store(), &menu).await?;
    info!("menu {} created", menu.menu_id);
    Ok(HttpResponse::Created().json(CreatedResponse {
        inserted_id,
        id: menu.menu_id,
    }))
}

#[patch("/menus/{menu_id}")]
/// partial update with upsert; a new sales window must start in the future
pub(crate) async fn update_menu(
    menu_id: web::Path<String>,
    req: web::Json<MenuRequest>,
    data: web::Data<AppState>,
) -> Result<impl Responder, CustomError> {
    let req = req.into_inner();
    let now = get_utc_now();
    if let (Some(start), Some(end)) = (req.start_date, req.end_date) {
        if !in_time_span(start, end, now) {
            warn!("menu {} rejected window {} .. {}", menu_id, start, end);
            return Err(CustomError::BadRequest {
                detail: "Invalid time span, please re-enter the dates".to_string(),
            });
        }
    }
    if let Some(name) = &req.name {
        validate_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(category) = &req.category {
        validate_text(category, "category", MAX_NAME_LEN)?;
    }

    let set = SetFields::new(now)
        .set("name", req.name)
        .set("category", req.category)
        .set("start_date", req.start_date)
        .set("end_date", req.end_date)
        .into_inner();
    let result = data
        .store()
        .update_one(Menu::COLLECTION, &Filter::eq(Menu::KEY, menu_id.as_str()), set, true)
        .await?;
    Ok(web::Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::controller::testing;
    use crate::server::routes;
    use crate::server::util::time::helper::set_mock_now;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::{json, Value};

    #[actix_web::test]
    async fn create_then_list() {
        let state = testing::state();
        let app = test::init_service(App::new().app_data(state.clone()).configure(routes::configure)).await;

        let req = test::TestRequest::post()
            .uri("/menus")
            .set_json(json!({"name": "dinner", "category": "main"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        let req = test::TestRequest::post()
            .uri("/menus")
            .set_json(json!({"name": "dinner"}))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body, json!({"error": "category is required"}));

        let req = test::TestRequest::get().uri("/menus").to_request();
        let menus: Vec<Menu> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(menus.len(), 1);
        assert_eq!(menus[0].category, "main");
    }

    #[actix_web::test]
    async fn window_must_start_in_the_future() {
        set_mock_now(1_700_000_000);
        let state = testing::state();
        let app = test::init_service(App::new().app_data(state.clone()).configure(routes::configure)).await;

        // 2023-11-14T22:13:20Z is "now"
        let past = json!({"start_date": "2023-01-01T00:00:00Z", "end_date": "2024-01-01T00:00:00Z"});
        let req = test::TestRequest::patch().uri("/menus/m1").set_json(past).to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body, json!({"error": "Invalid time span, please re-enter the dates"}));

        let reversed = json!({"start_date": "2024-02-01T00:00:00Z", "end_date": "2024-01-01T00:00:00Z"});
        let req = test::TestRequest::patch().uri("/menus/m1").set_json(reversed).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let ok = json!({"start_date": "2024-01-01T00:00:00Z", "end_date": "2024-02-01T00:00:00Z"});
        let req = test::TestRequest::patch().uri("/menus/m1").set_json(ok).to_request();
        let result: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(result["matched_count"], json!(0));
        assert!(result["upserted_id"].is_string());

        let req = test::TestRequest::get().uri("/menus/m1").to_request();
        let menu: Menu = test::call_and_read_body_json(&app, req).await;
        assert!(menu.start_date.is_some());
    }
}
