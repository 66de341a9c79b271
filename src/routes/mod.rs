//! Router assembly: common and customer routes, JSON fallback, and HTTP middleware.

mod common;
mod customer;

pub use common::common_routes;
pub use customer::customer_routes;

use crate::config::AppConfig;
use crate::handlers::not_found;
use crate::state::AppState;
use axum::http::{HeaderValue, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Full application router.
pub fn app(state: AppState, config: &AppConfig) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .merge(customer_routes(state))
        .fallback(not_found)
        .layer(RequestBodyLimitLayer::new(config.body_limit_bytes))
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);
    match &config.cors_allowed_origins {
        None => cors.allow_origin(Any),
        Some(origins) => {
            let values: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|o| match o.parse::<HeaderValue>() {
                    Ok(v) => Some(v),
                    Err(_) => {
                        tracing::warn!(origin = %o, "ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();
            cors.allow_origin(AllowOrigin::list(values))
        }
    }
}
