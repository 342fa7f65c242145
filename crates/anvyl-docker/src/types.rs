//! Types crossing the Docker adapter boundary.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// What the Infrastructure Service asks the adapter to create.
#[derive(Debug, Clone, Default)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    pub ports: Vec<PortSpec>,
    pub volumes: Vec<VolumeSpec>,
    pub environment: HashMap<String, String>,
    pub labels: HashMap<String, String>,
    pub command: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct PortSpec {
    pub container_port: u16,
    pub host_port: Option<u16>,
    pub protocol: String,
}

#[derive(Debug, Clone)]
pub struct VolumeSpec {
    pub source: String,
    pub target: String,
    pub read_only: bool,
}

/// One engine container as reported by `list_containers`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineContainerSummary {
    pub docker_id: String,
    pub names: Vec<String>,
    pub image: String,
    pub state: String,
    pub status: String,
    pub labels: HashMap<String, String>,
}

/// Full engine record, as returned by `inspect`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineContainerDetail {
    pub docker_id: String,
    pub name: String,
    pub image: String,
    pub state: String,
    pub running: bool,
    pub started_at: Option<i64>,
    pub finished_at: Option<i64>,
    pub exit_code: Option<i32>,
    pub labels: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecResult {
    pub exit_code: i64,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSample {
    pub cpu_percent: f64,
    pub memory_used_bytes: u64,
    pub memory_limit_bytes: u64,
}

/// Label Anvyl stamps on every container it creates.
pub const LABEL_MANAGED: &str = "anvyl.managed";
/// Label carrying the back-reference to the internal store row id.
pub const LABEL_CONTAINER_ID: &str = "anvyl.container_id";
