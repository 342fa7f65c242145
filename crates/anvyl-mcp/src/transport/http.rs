//! HTTP POST transport: one JSON object per
//! request body at `/mcp`, default port 4201.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::protocol::RpcRequest;
use crate::server::McpServer;

pub fn build_router(server: Arc<McpServer>) -> Router {
    Router::new()
        .route("/mcp", post(handle))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .with_state(server)
}

async fn handle(State(server): State<Arc<McpServer>>, Json(request): Json<RpcRequest>) -> Json<Value> {
    match server.dispatch(request).await {
        Some(response) => Json(serde_json::to_value(response).unwrap_or(Value::Null)),
        None => Json(Value::Null),
    }
}
