use serde::{Deserialize, Serialize};
use std::fmt;

/// The three services the supervisor can start, stop, and monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceId {
    Infra,
    Mcp,
    Agent,
}

impl ServiceId {
    pub const ALL_STARTUP_ORDER: [ServiceId; 3] = [ServiceId::Infra, ServiceId::Mcp, ServiceId::Agent];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceId::Infra => "infra",
            ServiceId::Mcp => "mcp",
            ServiceId::Agent => "agent",
        }
    }

    /// Binary name for this service under `bin/`.
    pub fn binary_name(&self) -> &'static str {
        match self {
            ServiceId::Infra => "anvyl-infra",
            ServiceId::Mcp => "anvyl-mcp",
            ServiceId::Agent => "anvyl-agent",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            ServiceId::Infra => 4200,
            ServiceId::Mcp => 4201,
            ServiceId::Agent => 4202,
        }
    }

    pub fn shutdown_order() -> [ServiceId; 3] {
        [ServiceId::Agent, ServiceId::Mcp, ServiceId::Infra]
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartOptions {
    /// Extra environment variables passed to the child, on top of the
    /// ones the supervisor sets unconditionally (state dir, port).
    pub env: Vec<(String, String)>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogsOptions {
    pub tail: Option<usize>,
    pub follow: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub service: ServiceId,
    pub running: bool,
    pub pid: Option<u32>,
    pub uptime_seconds: Option<u64>,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateStatus {
    pub services: Vec<ServiceStatus>,
    pub all_running: bool,
}
