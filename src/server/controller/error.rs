use actix_web::http::StatusCode;
use actix_web::{error, HttpResponse};
use derive_more::{Display, Error};
use log::error;
use serde_json::json;

use crate::server::aggregation::pipeline::PipelineError;
use crate::server::database::error::StoreError;

#[derive(Debug, Display, Error)]
pub(crate) enum CustomError {
    #[display("{detail}")]
    BadRequest { detail: String },
    #[display("{entity} not found")]
    NotFound { entity: &'static str },
    #[display("this email or phone number already exists")]
    Conflict,
    #[display("order has no line items")]
    EmptyOrder,
    #[display("database error")]
    DbError,
    #[display("timeout occurred")]
    Timeout,
    #[display("internal error")]
    Internal,
}

impl CustomError {
    pub fn not_found(entity: &'static str) -> Self {
        CustomError::NotFound { entity }
    }
}

impl error::ResponseError for CustomError {
    fn status_code(&self) -> StatusCode {
        match *self {
            CustomError::BadRequest { .. } | CustomError::Conflict => StatusCode::BAD_REQUEST,
            CustomError::NotFound { .. } => StatusCode::NOT_FOUND,
            CustomError::EmptyOrder
            | CustomError::DbError
            | CustomError::Timeout
            | CustomError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}

impl From<StoreError> for CustomError {
    fn from(e: StoreError) -> Self {
        error!("store operation failed, {}", e);
        match e {
            StoreError::Timeout => CustomError::Timeout,
            _ => CustomError::DbError,
        }
    }
}

impl From<PipelineError> for CustomError {
    fn from(e: PipelineError) -> Self {
        error!("aggregation failed at {} stage, {}", e.stage, e.source);
        match e.source {
            StoreError::Timeout => CustomError::Timeout,
            _ => CustomError::DbError,
        }
    }
}
