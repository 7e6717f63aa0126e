/// Settings for the postgres connection pool.
#[derive(Debug, Clone)]
pub(crate) struct PoolConfig {
    /// connection pool size
    pub size: usize,
    /// connection string
    pub conn_str: String,
}

impl PoolConfig {
    pub const DEFAULT_SIZE: usize = 10;

    pub fn new(size: usize, conn_str: String) -> Self {
        Self {
            size: size.max(1),
            conn_str,
        }
    }
}
