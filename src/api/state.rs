//! API server state

use std::sync::Arc;

use crate::storage::RecordStore;

/// API server state, cloned into every handler
#[derive(Clone)]
pub struct AppState {
    /// Shared record store
    pub store: Arc<dyn RecordStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}
