use derive_more::{Display, Error};

/// Failures raised by a document store backend.
#[derive(Debug, Display, Error)]
pub(crate) enum StoreError {
    #[display("store operation timed out")]
    Timeout,
    #[display("no connection available in pool")]
    PoolExhausted,
    #[display("backend failure, {detail}")]
    Backend { detail: String },
    #[display("codec failure, {detail}")]
    Codec { detail: String },
    #[display("document must be a json object")]
    InvalidDocument,
}

impl From<tokio_postgres::Error> for StoreError {
    fn from(e: tokio_postgres::Error) -> Self {
        StoreError::Backend {
            detail: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Codec {
            detail: e.to_string(),
        }
    }
}
