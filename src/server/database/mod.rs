pub(crate) mod connection;
pub(crate) mod document;
pub(crate) mod error;
pub(crate) mod memory;
pub(crate) mod pool;
pub(crate) mod pool_config;
pub(crate) mod postgres;
pub(crate) mod store;
