//! `/containers` handlers (endpoint table and create-container
//! semantics").

use std::collections::HashMap;
use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::response::sse::{Event, Sse};
use axum::response::IntoResponse;
use axum::Json;
use futures_util::{Stream, StreamExt};
use serde::{Deserialize, Serialize};

use anvyl_core::model::{Container, ContainerStatus};
use anvyl_core::time::now_ms;
use anvyl_core::AnvylError;
use anvyl_db::containers::{ContainerUpdate, NewContainer};
use anvyl_docker::{ContainerSpec, PortSpec, VolumeSpec, LABEL_CONTAINER_ID, LABEL_MANAGED};

use crate::error::InfraResult;
use crate::state::AppState;

#[derive(Debug, Deserialize, Serialize)]
pub struct PortBody {
    pub container_port: u16,
    pub host_port: Option<u16>,
    #[serde(default = "default_protocol")]
    pub protocol: String,
}

fn default_protocol() -> String {
    "tcp".to_string()
}

#[derive(Debug, Deserialize, Serialize)]
pub struct VolumeBody {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub read_only: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateContainerBody {
    pub name: String,
    pub image: String,
    pub host_id: Option<String>,
    #[serde(default)]
    pub ports: Vec<PortBody>,
    #[serde(default)]
    pub volumes: Vec<VolumeBody>,
    #[serde(default)]
    pub environment: HashMap<String, String>,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    pub command: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct ListContainersQuery {
    pub host_id: Option<String>,
    #[serde(default)]
    pub all: bool,
}

#[derive(Debug, Deserialize)]
pub struct StopBody {
    pub timeout: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    #[serde(default = "default_tail")]
    pub tail: u32,
    #[serde(default)]
    pub follow: bool,
}

fn default_tail() -> u32 {
    100
}

#[derive(Debug, Deserialize)]
pub struct ExecBody {
    pub command: Vec<String>,
    #[serde(default)]
    pub tty: bool,
}

#[derive(Debug, Serialize)]
pub struct ExecResponse {
    pub exit_code: i64,
    pub stdout: String,
    pub stderr: String,
}

pub async fn list_containers(
    State(state): State<AppState>,
    Query(query): Query<ListContainersQuery>,
) -> InfraResult<Json<Vec<Container>>> {
    let containers = state.db.list_containers(query.host_id.as_deref()).await?;
    let containers = if query.all {
        containers
    } else {
        containers
            .into_iter()
            .filter(|c| c.status != ContainerStatus::Stopped && c.status != ContainerStatus::Exited)
            .collect()
    };
    Ok(Json(containers))
}

pub async fn get_container(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> InfraResult<Json<Container>> {
    let container = state
        .db
        .get_container(&id)
        .await?
        .ok_or_else(|| AnvylError::NotFound(format!("container {id} not found")))?;
    Ok(Json(container))
}

pub async fn create_container(
    State(state): State<AppState>,
    Json(body): Json<CreateContainerBody>,
) -> InfraResult<Json<Container>> {
    let host_id = match &body.host_id {
        Some(id) if *id != state.local_host_id => {
            return Err(AnvylError::Validation(
                "host_id must be the local host (single-node scope)".to_string(),
            )
            .into());
        }
        _ => state.local_host_id.clone(),
    };

    let ports_json = serde_json::to_string(&body.ports).map_err(|e| AnvylError::Internal(e.to_string()))?;
    let volumes_json =
        serde_json::to_string(&body.volumes).map_err(|e| AnvylError::Internal(e.to_string()))?;
    let env_json =
        serde_json::to_string(&body.environment).map_err(|e| AnvylError::Internal(e.to_string()))?;
    let labels_json =
        serde_json::to_string(&body.labels).map_err(|e| AnvylError::Internal(e.to_string()))?;
    let command_json =
        serde_json::to_string(&body.command).map_err(|e| AnvylError::Internal(e.to_string()))?;

    // Step 2: persist the row before the engine call.
    let container = state
        .db
        .add_container(NewContainer {
            name: body.name.clone(),
            image: body.image.clone(),
            host_id,
            labels: labels_json,
            ports: ports_json,
            volumes: volumes_json,
            environment: env_json,
            command: command_json,
        })
        .await?;

    let lock = state.container_lock(&container.id);
    let _guard = lock.lock().await;

    let mut labels = body.labels.clone();
    labels.insert(LABEL_MANAGED.to_string(), "true".to_string());
    labels.insert(LABEL_CONTAINER_ID.to_string(), container.id.clone());

    let spec = ContainerSpec {
        name: body.name,
        image: body.image,
        ports: body
            .ports
            .iter()
            .map(|p| PortSpec {
                container_port: p.container_port,
                host_port: p.host_port,
                protocol: p.protocol.clone(),
            })
            .collect(),
        volumes: body
            .volumes
            .iter()
            .map(|v| VolumeSpec {
                source: v.source.clone(),
                target: v.target.clone(),
                read_only: v.read_only,
            })
            .collect(),
        environment: body.environment,
        labels,
        command: body.command,
    };

    // Step 3-5: create + start on the engine, or roll back the row.
    match state.docker.create_container(&spec).await {
        Ok(docker_id) => {
            let updated = state
                .db
                .update_container(
                    &container.id,
                    ContainerUpdate {
                        docker_id: Some(Some(docker_id)),
                        status: Some(ContainerStatus::Running),
                        started_at: Some(Some(now_ms())),
                        ..Default::default()
                    },
                )
                .await?;
            Ok(Json(updated))
        }
        Err(e) => {
            state.db.remove_container(&container.id).await.ok();
            Err(anvyl_core::AnvylError::from(e).into())
        }
    }
}

pub async fn stop_container(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<StopBody>,
) -> InfraResult<Json<Container>> {
    let container = state
        .db
        .get_container(&id)
        .await?
        .ok_or_else(|| AnvylError::NotFound(format!("container {id} not found")))?;

    let lock = state.container_lock(&container.id);
    let _guard = lock.lock().await;

    let docker_id = container
        .docker_id
        .clone()
        .ok_or_else(|| AnvylError::Invariant("container has no engine id yet".to_string()))?;

    state
        .docker
        .stop(&docker_id, body.timeout.unwrap_or(10))
        .await
        .map_err(anvyl_core::AnvylError::from)?;

    let updated = state
        .db
        .update_container(
            &container.id,
            ContainerUpdate {
                status: Some(ContainerStatus::Stopped),
                finished_at: Some(Some(now_ms())),
                ..Default::default()
            },
        )
        .await?;

    Ok(Json(updated))
}

pub async fn delete_container(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> InfraResult<Json<serde_json::Value>> {
    let container = state
        .db
        .get_container(&id)
        .await?
        .ok_or_else(|| AnvylError::NotFound(format!("container {id} not found")))?;

    let lock = state.container_lock(&container.id);
    let _guard = lock.lock().await;

    if let Some(docker_id) = &container.docker_id {
        if query.force {
            state
                .docker
                .remove(docker_id, true)
                .await
                .map_err(anvyl_core::AnvylError::from)?;
        } else {
            state.docker.stop(docker_id, 10).await.ok();
            state
                .docker
                .remove(docker_id, false)
                .await
                .map_err(anvyl_core::AnvylError::from)?;
        }
    }

    state.db.remove_container(&container.id).await?;
    state.container_locks.remove(&container.id);
    Ok(Json(serde_json::json!({"removed": true})))
}

pub async fn container_logs(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<LogsQuery>,
) -> InfraResult<impl IntoResponse> {
    let container = state
        .db
        .get_container(&id)
        .await?
        .ok_or_else(|| AnvylError::NotFound(format!("container {id} not found")))?;
    let docker_id = container
        .docker_id
        .ok_or_else(|| AnvylError::Invariant("container has no engine id yet".to_string()))?;

    let line_stream = state.docker.logs(&docker_id, query.tail, query.follow);
    let event_stream: std::pin::Pin<Box<dyn Stream<Item = Result<Event, Infallible>> + Send>> =
        Box::pin(line_stream.map(|line| {
            let text = line.unwrap_or_else(|e| format!("error reading log stream: {e}"));
            Ok(Event::default().event("log").data(text))
        }));

    Ok(Sse::new(event_stream).keep_alive(
        axum::response::sse::KeepAlive::new().interval(Duration::from_secs(15)),
    ))
}

pub async fn exec_container(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<ExecBody>,
) -> InfraResult<Json<ExecResponse>> {
    let container = state
        .db
        .get_container(&id)
        .await?
        .ok_or_else(|| AnvylError::NotFound(format!("container {id} not found")))?;
    let docker_id = container
        .docker_id
        .ok_or_else(|| AnvylError::Invariant("container has no engine id yet".to_string()))?;

    let result = state
        .docker
        .exec(&docker_id, body.command, body.tty)
        .await
        .map_err(anvyl_core::AnvylError::from)?;

    Ok(Json(ExecResponse {
        exit_code: result.exit_code,
        stdout: result.stdout,
        stderr: result.stderr,
    }))
}
