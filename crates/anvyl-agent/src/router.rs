use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AgentState;

pub fn build_router(state: AgentState) -> Router {
    Router::new()
        .route("/query", post(handlers::query))
        .route("/health", get(handlers::health))
        .route("/info", get(handlers::info))
        .route("/hosts", post(handlers::add_known_host))
        .route("/hosts", get(handlers::list_known_hosts))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .with_state(state)
}
