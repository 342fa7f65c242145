//! Infrastructure Service binary: owns the DB file and the Docker
//! engine socket, serves the HTTP API, and runs the background
//! reconciler.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

use anvyl_core::env_config;
use anvyl_db::Database;
use anvyl_docker::DockerAdapter;
use anvyl_infra::{build_state, router, start_reconciler};

#[tokio::main]
async fn main() -> Result<()> {
    env_config::init_tracing("anvyl_infra");

    let db_path = env_config::db_path();
    info!(path = %db_path.display(), "opening database");
    let db = Arc::new(Database::open(&db_path)?);

    info!("connecting to Docker engine");
    let docker = DockerAdapter::connect()?;
    if !docker.ping().await {
        anyhow::bail!("failed to connect to Docker engine");
    }

    let state = build_state(db, docker).await?;
    info!(local_host_id = %state.local_host_id, "bootstrap complete");

    let interval = env_config::reconcile_interval_secs();
    let (reconciler_handle, reconciler_token) = start_reconciler(state.clone(), interval);
    info!(interval_seconds = interval, "reconciler started");

    let app = router::build_router(state);
    let port = env_config::infra_port();
    let addr: SocketAddr = format!("0.0.0.0:{port}").parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "infrastructure service listening");

    let shutdown = shutdown_signal();
    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown);

    if let Err(e) = server.await {
        error!(error = %e, "server error");
    }

    reconciler_token.cancel();
    let _ = reconciler_handle.await;
    info!("infrastructure service stopped");

    Ok(())
}

/// Waits for SIGTERM (supervisor stop) or Ctrl+C, giving handlers up to
/// the supervisor's 10 s grace window to finish in-flight requests.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("install Ctrl+C handler");
    };

    let terminate = async {
        signal(SignalKind::terminate())
            .expect("install SIGTERM handler")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
