use actix_web::{error, web, HttpRequest};
use log::warn;

use crate::server::controller::error::CustomError;
use crate::server::controller::{food, invoice, menu, order, order_item, table, user};

fn json_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    warn!("rejected body of {} {}, {}", req.method(), req.path(), err);
    CustomError::BadRequest {
        detail: err.to_string(),
    }
    .into()
}

/// Register every route of the service.
pub(crate) fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .service(food::get_foods)
        .service(food::get_food)
        .service(food::create_food)
        .service(food::update_food)
        .service(menu::get_menus)
        .service(menu::get_menu)
        .service(menu::create_menu)
        .service(menu::update_menu)
        .service(table::get_tables)
        .service(table::get_table)
        .service(table::create_table)
        .service(table::update_table)
        .service(order::get_orders)
        .service(order::get_order)
        .service(order::create_order)
        .service(order::update_order)
        .service(order_item::get_order_items)
        .service(order_item::get_order_item)
        .service(order_item::get_order_items_by_order)
        .service(order_item::create_order_items)
        .service(order_item::update_order_item)
        .service(invoice::get_invoices)
        .service(invoice::get_invoice)
        .service(invoice::create_invoice)
        .service(invoice::update_invoice)
        .service(user::get_users)
        .service(user::get_user)
        .service(user::sign_up)
        .service(user::login);
}
