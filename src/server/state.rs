use crate::server::database::store::Store;

/// Shared by every handler through `web::Data`.
pub(crate) struct AppState {
    store: Store,
}

impl AppState {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }
}
