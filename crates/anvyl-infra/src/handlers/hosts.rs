//! `/hosts` handlers.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use anvyl_core::model::{Host, HostStatus};
use anvyl_core::AnvylError;
use anvyl_db::hosts::{HostUpdate, NewHost};

use crate::error::InfraResult;
use crate::resources::sample_local;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateHostBody {
    pub name: String,
    pub ip: String,
    pub os: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateHostBody {
    pub name: Option<String>,
    pub status: Option<String>,
    pub tags: Option<Vec<String>>,
    pub resources: Option<serde_json::Value>,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub cpu_percent: f64,
    pub memory_used_bytes: u64,
    pub memory_total_bytes: u64,
    pub disk_used_bytes: u64,
    pub disk_total_bytes: u64,
    pub load_avg_1m: f64,
}

pub async fn list_hosts(State(state): State<AppState>) -> InfraResult<Json<Vec<Host>>> {
    Ok(Json(state.db.list_hosts().await?))
}

pub async fn get_host(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> InfraResult<Json<Host>> {
    let host = state
        .db
        .get_host(&id)
        .await?
        .ok_or_else(|| AnvylError::NotFound(format!("host {id} not found")))?;
    Ok(Json(host))
}

pub async fn create_host(
    State(state): State<AppState>,
    Json(body): Json<CreateHostBody>,
) -> InfraResult<Json<Host>> {
    let _guard = state.host_lock.lock().await;
    let host = state
        .db
        .add_host(NewHost {
            name: body.name,
            ip: body.ip,
            os: body.os.unwrap_or_else(|| "unknown".to_string()),
            tags: body.tags.unwrap_or_default(),
            is_local: false,
        })
        .await?;
    Ok(Json(host))
}

pub async fn update_host(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateHostBody>,
) -> InfraResult<Json<Host>> {
    let _guard = state.host_lock.lock().await;

    let status = match body.status {
        Some(s) => Some(
            s.parse::<HostStatus>()
                .map_err(AnvylError::Validation)?,
        ),
        None => None,
    };

    let update = HostUpdate {
        name: body.name,
        status,
        tags: body.tags,
        resources: body.resources.map(|v| v.to_string()),
        metadata: body.metadata.map(|v| v.to_string()),
        last_heartbeat: None,
    };

    Ok(Json(state.db.update_host(&id, update).await?))
}

pub async fn delete_host(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> InfraResult<Json<serde_json::Value>> {
    let _guard = state.host_lock.lock().await;
    state.db.remove_host(&id).await?;
    Ok(Json(serde_json::json!({"removed": true})))
}

pub async fn host_metrics(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> InfraResult<Json<MetricsResponse>> {
    let host = state
        .db
        .get_host(&id)
        .await?
        .ok_or_else(|| AnvylError::NotFound(format!("host {id} not found")))?;

    if host.is_local {
        let sample = sample_local();
        return Ok(Json(MetricsResponse {
            cpu_percent: sample.cpu_percent as f64,
            memory_used_bytes: sample.memory_used_bytes,
            memory_total_bytes: sample.memory_total_bytes,
            disk_used_bytes: sample.disk_used_bytes,
            disk_total_bytes: sample.disk_total_bytes,
            load_avg_1m: sample.load_avg_1m,
        }));
    }

    let cached: crate::resources::ResourceSample =
        serde_json::from_str(&host.resources).unwrap_or_default();
    Ok(Json(MetricsResponse {
        cpu_percent: cached.cpu_percent as f64,
        memory_used_bytes: cached.memory_used_bytes,
        memory_total_bytes: cached.memory_total_bytes,
        disk_used_bytes: cached.disk_used_bytes,
        disk_total_bytes: cached.disk_total_bytes,
        load_avg_1m: cached.load_avg_1m,
    }))
}
