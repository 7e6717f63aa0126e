use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::error;
use tokio::sync::Semaphore;
use tokio::time;

use crate::server::database::connection::Connection;

pub(crate) struct CommonPool<C> {
    /// clients in the pool, accessed in a FIFO manner
    connections: Mutex<VecDeque<C>>,
    /// one permit per idle client
    available: Semaphore,
}

/// A fixed set of database clients shared by every request.
pub(crate) struct Pool<C>(Arc<CommonPool<C>>);

impl<C> Clone for Pool<C> {
    fn clone(&self) -> Pool<C> {
        Pool(self.0.clone())
    }
}

impl<C> Pool<C>
where
    C: Send + 'static,
{
    /// create an empty pool
    pub fn new() -> Self {
        Self(Arc::new(CommonPool {
            connections: Mutex::new(VecDeque::new()),
            available: Semaphore::new(0),
        }))
    }

    /// hand a freshly opened client to the pool
    pub fn add(&self, client: C) {
        self.release(client);
    }

    /// acquire a client, bail out if `timeout` elapses first.
    pub async fn acquire(&self, timeout: Duration) -> Option<Connection<C>> {
        match time::timeout(timeout, self.0.available.acquire()).await {
            // the permit comes back through `release`
            Ok(Ok(permit)) => permit.forget(),
            Ok(Err(_)) => return None,
            Err(_) => {
                error!("timed out to acquire a connection from pool after {:?}", timeout);
                return None;
            }
        }
        let client = self
            .0
            .connections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front()?;
        Some(Connection::new(client, self.clone()))
    }

    pub fn release(&self, client: C) {
        self.0
            .connections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(client);
        self.0.available.add_permits(1);
    }

    pub fn idle(&self) -> usize {
        self.0.available.available_permits()
    }
}
