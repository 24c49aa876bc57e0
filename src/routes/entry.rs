use std::sync::Arc;

use axum::{Router, http::StatusCode, middleware};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::{
    middleware::{catch_panic_layer, cors_layer, json_error_middleware, options_short_circuit},
    state::AppState,
};

use super::{api, health};

pub const API_PREFIX: &str = "/api";

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest(API_PREFIX, api::router(state))
        .merge(health::router())
}

/// The router with the full middleware stack, as served by the binary.
pub fn app(state: Arc<AppState>) -> Router {
    let request_timeout = state.config.general.request_timeout();

    router(state)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(middleware::from_fn(json_error_middleware))
        .layer(middleware::from_fn(options_short_circuit))
        .layer(cors_layer())
        .layer(catch_panic_layer())
        .layer(TraceLayer::new_for_http())
}
