use std::net::SocketAddrV4;
use std::str::FromStr;
use std::time::Duration;

use derive_more::Display;

use crate::server::database::pool_config::PoolConfig;

pub(crate) const DEFAULT_DB_TIMEOUT: Duration = Duration::from_secs(100);

/// Which document store backs the service.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StoreBackend {
    #[display("postgres")]
    Postgres,
    #[display("memory")]
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "postgres" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            s => Err(format!("Invalid store backend: {s}")),
        }
    }
}

/// Server configs
#[derive(Debug)]
pub(crate) struct ServerConfig {
    pub addr: SocketAddrV4,
    pub backend: StoreBackend,
    pub pool: PoolConfig,
    /// bound of every store operation
    pub db_timeout: Duration,
}

impl ServerConfig {
    pub fn new(
        addr: SocketAddrV4,
        backend: StoreBackend,
        pool: PoolConfig,
        db_timeout: Duration,
    ) -> Self {
        Self {
            addr,
            backend,
            pool,
            db_timeout,
        }
    }
}
