//! main file for the server

pub(crate) mod aggregation;
pub(crate) mod controller;
pub(crate) mod database;
pub(crate) mod model;
mod routes;
pub(crate) mod state;
pub(crate) mod util;

use std::io;

use actix_web::{middleware::Logger, web, App, HttpServer};
use log::info;

use crate::server::database::memory::MemoryStore;
use crate::server::database::postgres::PgDocumentStore;
use crate::server::database::store::Store;
use crate::server::model::config::{ServerConfig, StoreBackend};
use crate::server::state::AppState;

/// Run the server
pub async fn run(config: ServerConfig) -> io::Result<()> {
    let ServerConfig {
        addr,
        backend,
        pool,
        db_timeout,
    } = config;
    let store = match backend {
        StoreBackend::Postgres => {
            let pg = PgDocumentStore::connect(&pool, db_timeout)
                .await
                .map_err(|e| io::Error::new(io::ErrorKind::ConnectionRefused, e.to_string()))?;
            Store::postgres(pg, db_timeout)
        }
        StoreBackend::Memory => Store::memory(MemoryStore::default(), db_timeout),
    };
    info!("store ready, backend={}", backend);

    let state = web::Data::new(AppState::new(store));
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(routes::configure)
    })
    .bind(addr)?
    .run()
    .await
}
