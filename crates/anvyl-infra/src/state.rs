//! Process-wide state for the Infrastructure Service:
//! one persistence handle, one Docker adapter handle, one local host
//! id, and the concurrency primitives, all behind `axum::extract::State`.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use anvyl_db::Database;
use anvyl_docker::DockerAdapter;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub docker: DockerAdapter,
    pub local_host_id: String,
    /// Per-container write lock, keyed by internal container id
    /// (create/stop/remove/reconcile on different containers must
    /// not block each other).
    pub container_locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
    /// Serializes host inventory mutations.
    pub host_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn container_lock(&self, container_id: &str) -> Arc<Mutex<()>> {
        self.container_locks
            .entry(container_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
