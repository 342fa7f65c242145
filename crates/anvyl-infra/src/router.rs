//! HTTP routing: nested `/hosts` and `/containers` sub-routers under
//! the root.

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{containers, hosts, system};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let host_routes = Router::new()
        .route("/", get(hosts::list_hosts))
        .route("/", post(hosts::create_host))
        .route("/:id", get(hosts::get_host))
        .route("/:id", put(hosts::update_host))
        .route("/:id", delete(hosts::delete_host))
        .route("/:id/metrics", get(hosts::host_metrics));

    let container_routes = Router::new()
        .route("/", get(containers::list_containers))
        .route("/", post(containers::create_container))
        .route("/:id", get(containers::get_container))
        .route("/:id/stop", post(containers::stop_container))
        .route("/:id", delete(containers::delete_container))
        .route("/:id/logs", get(containers::container_logs))
        .route("/:id/exec", post(containers::exec_container));

    Router::new()
        .route("/health", get(system::health))
        .route("/system/status", get(system::system_status))
        .nest("/hosts", host_routes)
        .nest("/containers", container_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
