use actix_web::{get, patch, post, web, HttpResponse, Responder};
use log::info;

use crate::server::controller::error::CustomError;
use crate::server::controller::order_item::order_view;
use crate::server::controller::{ensure_exists, fetch, insert, list_all, within};
use crate::server::database::store::{DocumentStore, Filter};
use crate::server::model::invoice::{Invoice, InvoiceRequest, InvoiceView, DEFAULT_PAYMENT_STATUS};
use crate::server::model::order::Order;
use crate::server::model::{CreatedResponse, Entity, SetFields};
use crate::server::state::AppState;
use crate::server::util::id::new_object_id;
use crate::server::util::time::helper::get_utc_now;
use crate::server::util::time::payment_due_date;
use crate::server::util::validation::{required_text, validate_text, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN};

const PAYMENT_STATUSES: [&str; 2] = ["PENDING", "PAID"];

fn validate_status(status: &str) -> Result<(), CustomError> {
    if !PAYMENT_STATUSES.contains(&status) {
        return Err(CustomError::BadRequest {
            detail: format!("payment_status must be one of {}", PAYMENT_STATUSES.join(", ")),
        });
    }
    Ok(())
}

#[get("/invoices")]
pub(crate) async fn get_invoices(data: web::Data<AppState>) -> Result<impl Responder, CustomError> {
    Ok(web::Json(list_all::<Invoice>(data.store()).await?))
}

#[get("/invoices/{invoice_id}")]
/// the invoice together with the bill of its order
pub(crate) async fn get_invoice(
    invoice_id: web::Path<String>,
    data: web::Data<AppState>,
) -> Result<impl Responder, CustomError> {
    let store = data.store();
    let (invoice, view) = within(store, async {
        let invoice: Invoice = fetch(store, &invoice_id).await?;
        let view = order_view(store, &invoice.order_id).await?;
        Ok::<_, CustomError>((invoice, view))
    })
    .await?;
    Ok(web::Json(InvoiceView {
        invoice_id: invoice.invoice_id,
        order_id: invoice.order_id,
        payment_method: invoice.payment_method,
        payment_status: invoice.payment_status,
        payment_due_date: invoice.payment_due_date,
        payment_due: view.payment_due,
        table_number: view.table_number,
        order_details: view.order_items,
    }))
}

#[post("/invoices")]
pub(crate) async fn create_invoice(
    req: web::Json<InvoiceRequest>,
    data: web::Data<AppState>,
) -> Result<impl Responder, CustomError> {
    let req = req.into_inner();
    let order_id = required_text(req.order_id, "order_id", MAX_NAME_LEN)?;
    if let Some(method) = &req.payment_method {
        validate_text(method, "payment_method", MAX_SHORT_TEXT_LEN)?;
    }
    let payment_status = req
        .payment_status
        .unwrap_or_else(|| DEFAULT_PAYMENT_STATUS.to_string());
    validate_status(&payment_status)?;

    let store = data.store();
    ensure_exists::<Order>(store, &order_id).await?;

    let now = get_utc_now();
    let invoice = Invoice {
        invoice_id: new_object_id(),
        order_id,
        payment_method: req.payment_method,
        payment_status,
        payment_due_date: payment_due_date(now),
        created_at: now,
        updated_at: now,
    };
    let inserted_id = insert(store, &invoice).await?;
    info!("invoice {} created for order {}", invoice.invoice_id, invoice.order_id);
    Ok(HttpResponse::Created().json(CreatedResponse {
        inserted_id,
        id: invoice.invoice_id,
    }))
}

#[patch("/invoices/{invoice_id}")]
/// partial update of an existing invoice, answered with the updated document
pub(crate) async fn update_invoice(
    invoice_id: web::Path<String>,
    req: web::Json<InvoiceRequest>,
    data: web::Data<AppState>,
) -> Result<impl Responder, CustomError> {
    let req = req.into_inner();
    if let Some(method) = &req.payment_method {
        validate_text(method, "payment_method", MAX_SHORT_TEXT_LEN)?;
    }
    if let Some(status) = &req.payment_status {
        validate_status(status)?;
    }

    let store = data.store();
    if let Some(order_id) = &req.order_id {
        ensure_exists::<Order>(store, order_id).await?;
    }
    ensure_exists::<Invoice>(store, &invoice_id).await?;

    let set = SetFields::new(get_utc_now())
        .set("order_id", req.order_id)
        .set("payment_method", req.payment_method)
        .set("payment_status", req.payment_status)
        .set("payment_due_date", req.payment_due_date)
        .into_inner();
    store
        .update_one(Invoice::COLLECTION, &Filter::eq(Invoice::KEY, invoice_id.as_str()), set, false)
        .await?;
    let invoice: Invoice = fetch(store, &invoice_id).await?;
    Ok(web::Json(invoice))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::controller::testing;
    use crate::server::database::store::Collection;
    use crate::server::routes;
    use crate::server::util::time::helper::set_mock_now;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::{json, Value};

    async fn billed_order() -> web::Data<AppState> {
        let state = testing::state();
        testing::seed(&state, Collection::Table, vec![json!({"table_id": "T1", "table_number": 3})]).await;
        testing::seed(&state, Collection::Order, vec![json!({"order_id": "O1", "table_id": "T1"})]).await;
        testing::seed(
            &state,
            Collection::Food,
            vec![
                json!({"food_id": "F1", "name": "ramen", "price": 9.99}),
                json!({"food_id": "F2", "name": "gyoza", "price": 4.50}),
            ],
        )
        .await;
        testing::seed(
            &state,
            Collection::OrderItem,
            vec![
                json!({"order_item_id": "i1", "order_id": "O1", "food_id": "F1", "quantity": 1}),
                json!({"order_item_id": "i2", "order_id": "O1", "food_id": "F2", "quantity": 1}),
            ],
        )
        .await;
        state
    }

    #[actix_web::test]
    async fn invoice_carries_the_bill() {
        set_mock_now(1_700_000_000);
        let state = billed_order().await;
        let app = test::init_service(App::new().app_data(state.clone()).configure(routes::configure)).await;

        let req = test::TestRequest::post()
            .uri("/invoices")
            .set_json(json!({"order_id": "O1", "payment_method": "CARD"}))
            .to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;
        let invoice_id = created["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::get().uri(&format!("/invoices/{invoice_id}")).to_request();
        let view: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(view["payment_status"], json!("PENDING"));
        assert_eq!(view["payment_due_date"], json!("2023-11-15T22:13:20Z"));
        assert_eq!(view["table_number"], json!(3));
        assert_eq!(view["order_details"].as_array().unwrap().len(), 2);
        assert!((view["payment_due"].as_f64().unwrap() - 14.49).abs() < 1e-9);
    }

    #[actix_web::test]
    async fn invoice_needs_an_order() {
        let state = billed_order().await;
        let app = test::init_service(App::new().app_data(state.clone()).configure(routes::configure)).await;

        let req = test::TestRequest::post()
            .uri("/invoices")
            .set_json(json!({"order_id": "O9"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get().uri("/invoices/nope").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn invoice_of_an_empty_order_is_500() {
        let state = billed_order().await;
        testing::seed(&state, Collection::Order, vec![json!({"order_id": "O2"})]).await;
        testing::seed(
            &state,
            Collection::Invoice,
            vec![json!({
                "invoice_id": "v1",
                "order_id": "O2",
                "payment_method": null,
                "payment_status": "PENDING",
                "payment_due_date": "2024-01-02T00:00:00Z",
                "created_at": "2024-01-01T00:00:00Z",
                "updated_at": "2024-01-01T00:00:00Z"
            })],
        )
        .await;
        let app = test::init_service(App::new().app_data(state.clone()).configure(routes::configure)).await;

        let req = test::TestRequest::get().uri("/invoices/v1").to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[actix_web::test]
    async fn update_returns_the_invoice() {
        let state = billed_order().await;
        let app = test::init_service(App::new().app_data(state.clone()).configure(routes::configure)).await;

        let req = test::TestRequest::post()
            .uri("/invoices")
            .set_json(json!({"order_id": "O1"}))
            .to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;
        let invoice_id = created["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::patch()
            .uri(&format!("/invoices/{invoice_id}"))
            .set_json(json!({"payment_status": "PAID", "payment_method": "CASH"}))
            .to_request();
        let invoice: Invoice = test::call_and_read_body_json(&app, req).await;
        assert_eq!(invoice.payment_status, "PAID");
        assert_eq!(invoice.payment_method.as_deref(), Some("CASH"));

        let req = test::TestRequest::patch()
            .uri(&format!("/invoices/{invoice_id}"))
            .set_json(json!({"payment_status": "LATER"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::patch()
            .uri("/invoices/missing")
            .set_json(json!({"payment_status": "PAID"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn invoice_of_an_order_without_its_document() {
        let state = testing::state();
        testing::seed(&state, Collection::Food, vec![json!({"food_id": "F1", "name": "ramen", "price": 9.99})]).await;
        testing::seed(
            &state,
            Collection::OrderItem,
            vec![json!({"order_item_id": "i1", "order_id": "O1", "food_id": "F1", "quantity": 1})],
        )
        .await;
        testing::seed(
            &state,
            Collection::Invoice,
            vec![json!({
                "invoice_id": "v1",
                "order_id": "O1",
                "payment_method": "CARD",
                "payment_status": "PENDING",
                "payment_due_date": "2024-01-02T00:00:00Z",
                "created_at": "2024-01-01T00:00:00Z",
                "updated_at": "2024-01-01T00:00:00Z"
            })],
        )
        .await;
        let app = test::init_service(App::new().app_data(state.clone()).configure(routes::configure)).await;

        let req = test::TestRequest::get().uri("/invoices/v1").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let view: Value = test::read_body_json(res).await;
        assert!((view["payment_due"].as_f64().unwrap() - 9.99).abs() < 1e-9);
        assert_eq!(view["table_number"], Value::Null);
        assert_eq!(view["order_details"][0]["food_name"], json!("ramen"));
    }
}
