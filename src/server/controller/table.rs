use actix_web::{get, patch, post, web, HttpResponse, Responder};
use log::info;

use crate::server::controller::error::CustomError;
use crate::server::controller::{fetch, insert, list_all};
use crate::server::database::store::{DocumentStore, Filter};
use crate::server::model::table::{Table, TableRequest};
use crate::server::model::{CreatedResponse, Entity, SetFields};
use crate::server::state::AppState;
use crate::server::util::id::new_object_id;
use crate::server::util::time::helper::get_utc_now;
use crate::server::util::validation::{required, validate_count};

#[get("/tables")]
/// get tables
pub(crate) async fn get_tables(data: web::Data<AppState>) -> Result<impl Responder, CustomError> {
    Ok(web::Json(list_all::<Table>(data.store()).await?))
}

#[get("/tables/{table_id}")]
pub(crate) async fn get_table(
    table_id: web::Path<String>,
    data: web::Data<AppState>,
) -> Result<impl Responder, CustomError> {
    let table: Table = fetch(data.store(), &table_id).await?;
    Ok(web::Json(table))
}

#[post("/tables")]
pub(crate) async fn create_table(
    req: web::Json<TableRequest>,
    data: web::Data<AppState>,
) -> Result<impl Responder, CustomError> {
    let req = req.into_inner();
    let table_number = required(req.table_number, "table_number")?;
    validate_count(table_number, "table_number")?;
    let number_of_guests = required(req.number_of_guests, "number_of_guests")?;
    validate_count(number_of_guests, "number_of_guests")?;

    let now = get_utc_now();
    let table = Table {
        table_id: new_object_id(),
        table_number,
        number_of_guests,
        created_at: now,
        updated_at: now,
    };
    let inserted_id = insert(data.store(), &table).await?;
    info!("table {} created with number {}", table.table_id, table.table_number);
    Ok(HttpResponse::Created().json(CreatedResponse {
        inserted_id,
        id: table.table_id,
    }))
}

#[patch("/tables/{table_id}")]
pub(crate) async fn update_table(
    table_id: web::Path<String>,
    req: web::Json<TableRequest>,
    data: web::Data<AppState>,
) -> Result<impl Responder, CustomError> {
    let req = req.into_inner();
    if let Some(table_number) = req.table_number {
        validate_count(table_number, "table_number")?;
    }
    if let Some(number_of_guests) = req.number_of_guests {
        validate_count(number_of_guests, "number_of_guests")?;
    }

    let set = SetFields::new(get_utc_now())
        .set("table_number", req.table_number)
        .set("number_of_guests", req.number_of_guests)
        .into_inner();
    let result = data
        .store()
        .update_one(Table::COLLECTION, &Filter::eq(Table::KEY, table_id.as_str()), set, true)
        .await?;
    Ok(web::Json(result))
}
