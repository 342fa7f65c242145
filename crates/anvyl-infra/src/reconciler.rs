//! Background reconciler built on the usual periodic-sync task shape
//! (`tokio::select! { _ = token.cancelled() => ..., _ = interval.tick()
//! => ... }`).

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use anvyl_core::model::ContainerStatus;
use anvyl_db::containers::ContainerUpdate;
use anvyl_docker::LABEL_CONTAINER_ID;

use crate::state::AppState;

/// Consecutive ticks a store row's `docker_id` may be missing from the
/// engine response before it is dropped.
const MISS_THRESHOLD: u8 = 2;

pub fn spawn(state: AppState, interval: Duration, token: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await; // skip the immediate first tick
        let mut misses: HashMap<String, u8> = HashMap::new();
        let busy = Mutex::new(());

        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!("reconciler stopped");
                    return;
                }
                _ = ticker.tick() => {
                    let Ok(_guard) = busy.try_lock() else {
                        debug!("reconciler tick still in progress, skipping");
                        continue;
                    };
                    if let Err(e) = run_once(&state, &mut misses).await {
                        error!(error = %e, "reconciler tick failed");
                    }
                }
            }
        }
    })
}

async fn run_once(state: &AppState, misses: &mut HashMap<String, u8>) -> anyhow::Result<()> {
    // Step 1: list engine containers with all=true.
    let engine_containers = match state.docker.list_containers(true).await {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "reconciler: engine unavailable, skipping tick");
            return Ok(());
        }
    };

    let mut seen_docker_ids = std::collections::HashSet::new();

    // Step 2: reconcile each managed engine container against the store.
    for summary in &engine_containers {
        if summary.labels.get("anvyl.managed").map(String::as_str) != Some("true") {
            continue;
        }
        seen_docker_ids.insert(summary.docker_id.clone());
        misses.remove(&summary.docker_id);

        let internal_id = summary.labels.get(LABEL_CONTAINER_ID).cloned();

        let detail = match state.docker.inspect(&summary.docker_id).await {
            Ok(d) => d,
            Err(e) => {
                warn!(docker_id = %summary.docker_id, error = %e, "reconciler: inspect failed");
                continue;
            }
        };

        let status = engine_state_to_status(&detail.state, detail.running);

        let existing = match &internal_id {
            Some(id) => state.db.get_container(id).await?,
            None => state.db.get_container_by_docker_id(&summary.docker_id).await?,
        };

        match existing {
            Some(row) => {
                let lock = state.container_lock(&row.id);
                let _guard = lock.lock().await;
                state
                    .db
                    .update_container(
                        &row.id,
                        ContainerUpdate {
                            status: Some(status),
                            started_at: Some(detail.started_at),
                            finished_at: Some(detail.finished_at),
                            exit_code: Some(detail.exit_code),
                            ..Default::default()
                        },
                    )
                    .await?;
            }
            None => {
                // Recover a row lost to store corruption.
                let name = detail
                    .name
                    .trim_start_matches('/')
                    .to_string();
                let recovered = state
                    .db
                    .add_container(anvyl_db::containers::NewContainer {
                        name,
                        image: detail.image.clone(),
                        host_id: state.local_host_id.clone(),
                        labels: serde_json::to_string(&detail.labels).unwrap_or_default(),
                        ports: "[]".to_string(),
                        volumes: "[]".to_string(),
                        environment: "{}".to_string(),
                        command: "[]".to_string(),
                    })
                    .await;
                if let Ok(recovered) = recovered {
                    let lock = state.container_lock(&recovered.id);
                    let _guard = lock.lock().await;
                    state
                        .db
                        .update_container(
                            &recovered.id,
                            ContainerUpdate {
                                docker_id: Some(Some(summary.docker_id.clone())),
                                status: Some(status),
                                started_at: Some(detail.started_at),
                                finished_at: Some(detail.finished_at),
                                exit_code: Some(detail.exit_code),
                            },
                        )
                        .await?;
                }
            }
        }
    }

    // Step 3: drop store rows absent from the engine for two consecutive ticks.
    let store_containers = state.db.list_containers(None).await?;
    for row in store_containers {
        let Some(docker_id) = &row.docker_id else {
            continue;
        };
        if seen_docker_ids.contains(docker_id) {
            continue;
        }

        let count = misses.entry(docker_id.clone()).or_insert(0);
        *count += 1;

        if *count >= MISS_THRESHOLD {
            let lock = state.container_lock(&row.id);
            let _guard = lock.lock().await;
            state
                .db
                .update_container(
                    &row.id,
                    ContainerUpdate {
                        status: Some(ContainerStatus::Removed),
                        ..Default::default()
                    },
                )
                .await
                .ok();
            state.db.remove_container(&row.id).await.ok();
            state.container_locks.remove(&row.id);
            misses.remove(docker_id);
        }
    }

    // Step 4: refresh the local host's resources blob.
    let sample = crate::resources::sample_local();
    let resources_json = serde_json::to_string(&sample).unwrap_or_else(|_| "{}".to_string());
    state
        .db
        .update_host(
            &state.local_host_id,
            anvyl_db::hosts::HostUpdate {
                resources: Some(resources_json),
                last_heartbeat: Some(anvyl_core::time::now_ms()),
                ..Default::default()
            },
        )
        .await
        .ok();

    Ok(())
}

fn engine_state_to_status(state: &str, running: bool) -> ContainerStatus {
    if running {
        return ContainerStatus::Running;
    }
    match state {
        "exited" => ContainerStatus::Exited,
        "created" => ContainerStatus::Created,
        _ => ContainerStatus::Stopped,
    }
}
