use std::ops::Deref;

use crate::server::database::pool::Pool;

/// A client checked out of a [`Pool`]. The client goes back to the pool on drop.
pub(crate) struct Connection<C>
where
    C: Send + 'static,
{
    pub(crate) client: Option<C>,
    pub(crate) pool: Pool<C>,
}

impl<C> Connection<C>
where
    C: Send + 'static,
{
    pub fn new(client: C, pool: Pool<C>) -> Self {
        Self {
            client: Some(client),
            pool,
        }
    }
}

impl<C> Deref for Connection<C>
where
    C: Send + 'static,
{
    type Target = C;

    fn deref(&self) -> &C {
        // only `None` while dropping
        self.client.as_ref().expect("connection used after release")
    }
}

impl<C> Drop for Connection<C>
where
    C: Send + 'static,
{
    fn drop(&mut self) {
        if let Some(client) = self.client.take() {
            self.pool.release(client);
        }
    }
}
