//! `/health` and `/system/status` handlers.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::error::InfraResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthComponents {
    pub db: bool,
    pub docker: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub components: HealthComponents,
}

#[derive(Debug, Serialize)]
pub struct ContainerCounts {
    pub running: u64,
    pub stopped: u64,
    pub total: u64,
}

#[derive(Debug, Serialize)]
pub struct SystemStatusResponse {
    pub hosts: u64,
    pub containers: ContainerCounts,
    pub engine: &'static str,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_ok = state.db.list_hosts().await.is_ok();
    let docker_ok = state.docker.ping().await;

    Json(HealthResponse {
        status: if db_ok && docker_ok { "ok" } else { "degraded" },
        components: HealthComponents {
            db: db_ok,
            docker: docker_ok,
        },
    })
}

pub async fn system_status(State(state): State<AppState>) -> InfraResult<Json<SystemStatusResponse>> {
    let hosts = state.db.list_hosts().await?.len() as u64;
    let (running, stopped, total) = state.db.count_containers_by_status().await?;
    let engine_ok = state.docker.ping().await;

    Ok(Json(SystemStatusResponse {
        hosts,
        containers: ContainerCounts {
            running,
            stopped,
            total,
        },
        engine: if engine_ok { "ok" } else { "down" },
    }))
}
