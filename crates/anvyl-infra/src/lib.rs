//! Infrastructure Service library: owns persistence, the
//! Docker adapter, and the HTTP API that is the single authority for
//! host and container state on this node.

pub mod bootstrap;
pub mod error;
pub mod handlers;
pub mod reconciler;
pub mod resources;
pub mod router;
pub mod state;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use anvyl_db::Database;
use anvyl_docker::DockerAdapter;

pub use error::{InfraError, InfraResult};
pub use state::AppState;

/// Build process-wide state and run bootstrap.
pub async fn build_state(db: Arc<Database>, docker: DockerAdapter) -> InfraResult<AppState> {
    let local_host_id = bootstrap::ensure_local_host(&db).await?;

    Ok(AppState {
        db,
        docker,
        local_host_id,
        container_locks: Arc::new(dashmap::DashMap::new()),
        host_lock: Arc::new(Mutex::new(())),
    })
}

/// Start the reconciler background task. Returns its join handle and the
/// cancellation token the caller should trigger on shutdown.
pub fn start_reconciler(state: AppState, interval_seconds: u64) -> (tokio::task::JoinHandle<()>, CancellationToken) {
    let token = CancellationToken::new();
    let handle = reconciler::spawn(state, Duration::from_secs(interval_seconds), token.clone());
    (handle, token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower::ServiceExt;

    async fn test_state() -> AppState {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let docker = DockerAdapter::connect().unwrap_or_else(|_| {
            panic!("docker adapter requires a reachable engine socket in this test environment")
        });
        build_state(db, docker).await.unwrap()
    }

    #[tokio::test]
    #[ignore = "requires a live Docker engine socket"]
    async fn health_endpoint_reports_ok_status() {
        let state = test_state().await;
        let app = router::build_router(state);

        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/health")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }
}
