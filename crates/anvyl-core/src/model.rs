//! Host and Container domain types.

use serde::{Deserialize, Serialize};

/// A machine recognized by Anvyl. Exactly one row has `is_local = true`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Host {
    pub id: String,
    pub name: String,
    pub ip: String,
    pub os: String,
    pub status: HostStatus,
    /// Opaque JSON blob of CPU/memory/disk snapshot.
    pub resources: String,
    pub tags: Vec<String>,
    /// Opaque JSON blob.
    pub metadata: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub last_heartbeat: i64,
    pub is_local: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostStatus {
    Active,
    Inactive,
    Unknown,
}

impl std::fmt::Display for HostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HostStatus::Active => "active",
            HostStatus::Inactive => "inactive",
            HostStatus::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for HostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(HostStatus::Active),
            "inactive" => Ok(HostStatus::Inactive),
            "unknown" => Ok(HostStatus::Unknown),
            other => Err(format!("unknown host status: {other}")),
        }
    }
}

/// A Docker engine container managed by Anvyl.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Container {
    pub id: String,
    pub docker_id: Option<String>,
    pub name: String,
    pub image: String,
    pub host_id: String,
    pub status: ContainerStatus,
    /// Opaque JSON-encoded strings.
    pub labels: String,
    pub ports: String,
    pub volumes: String,
    pub environment: String,
    pub command: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub started_at: Option<i64>,
    pub finished_at: Option<i64>,
    pub exit_code: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerStatus {
    Created,
    Running,
    Exited,
    Stopped,
    Removed,
    Unknown,
}

impl std::fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ContainerStatus::Created => "created",
            ContainerStatus::Running => "running",
            ContainerStatus::Exited => "exited",
            ContainerStatus::Stopped => "stopped",
            ContainerStatus::Removed => "removed",
            ContainerStatus::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for ContainerStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(ContainerStatus::Created),
            "running" => Ok(ContainerStatus::Running),
            "exited" => Ok(ContainerStatus::Exited),
            "stopped" => Ok(ContainerStatus::Stopped),
            "removed" => Ok(ContainerStatus::Removed),
            "unknown" => Ok(ContainerStatus::Unknown),
            other => Err(format!("unknown container status: {other}")),
        }
    }
}
