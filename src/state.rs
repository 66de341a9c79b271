//! Shared application state for all routes.

use crate::store::CustomerStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CustomerStore>,
    /// Owner recorded on creation when the body has no `idUsuario`.
    pub default_owner_id: i64,
}

impl AppState {
    pub fn new(store: Arc<dyn CustomerStore>, default_owner_id: i64) -> Self {
        AppState {
            store,
            default_owner_id,
        }
    }
}
