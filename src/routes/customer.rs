//! Customer CRUD routes under `/clientes`.

use crate::handlers::{create, delete as delete_handler, list, read, update};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn customer_routes(state: AppState) -> Router {
    Router::new()
        .route("/clientes", get(list).post(create))
        .route(
            "/clientes/:id",
            get(read).put(update).delete(delete_handler),
        )
        .with_state(state)
}
