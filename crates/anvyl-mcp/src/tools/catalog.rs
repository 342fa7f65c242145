//! The nine tools exposed by the server,
//! each proxying one call to the Infrastructure Service and wrapping
//! the result in the MCP content-array convention:
//! `{content: [{type: "text", text: ...}]}`.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::protocol::RpcError;

use super::infra_client::InfraClient;
use super::{ToolDescriptor, ToolHandler};

fn text_result(text: impl Into<String>) -> Value {
    json!({ "content": [{ "type": "text", "text": text.into() }] })
}

fn json_result(value: &Value) -> Value {
    text_result(serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()))
}

fn require_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, RpcError> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| RpcError::new(RpcError::INVALID_PARAMS, format!("missing required argument: {key}")))
}

pub fn all() -> Vec<Box<dyn ToolHandler>> {
    vec![
        Box::new(ListHosts),
        Box::new(AddHost),
        Box::new(GetHostMetrics),
        Box::new(ListContainers),
        Box::new(CreateContainer),
        Box::new(RemoveContainer),
        Box::new(GetContainerLogs),
        Box::new(ExecContainerCommand),
        Box::new(GetSystemStatus),
    ]
}

struct ListHosts;

#[async_trait]
impl ToolHandler for ListHosts {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "list_hosts",
            description: "List every host known to this node.",
            input_schema: json!({"type": "object", "properties": {}}),
            required: vec![],
        }
    }

    async fn call(&self, infra: &InfraClient, _arguments: Value) -> Result<Value, RpcError> {
        let hosts = infra.get("/hosts").await?;
        Ok(json_result(&hosts))
    }
}

struct AddHost;

#[async_trait]
impl ToolHandler for AddHost {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "add_host",
            description: "Register a new host by name and IP address.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string"},
                    "ip": {"type": "string"},
                    "os": {"type": "string"},
                    "tags": {"type": "array", "items": {"type": "string"}}
                }
            }),
            required: vec!["name", "ip"],
        }
    }

    async fn call(&self, infra: &InfraClient, arguments: Value) -> Result<Value, RpcError> {
        require_str(&arguments, "name")?;
        require_str(&arguments, "ip")?;
        let host = infra.post("/hosts", arguments).await?;
        Ok(json_result(&host))
    }
}

struct GetHostMetrics;

#[async_trait]
impl ToolHandler for GetHostMetrics {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "get_host_metrics",
            description: "Fetch CPU, memory, disk and load metrics for a host.",
            input_schema: json!({
                "type": "object",
                "properties": {"host_id": {"type": "string"}}
            }),
            required: vec!["host_id"],
        }
    }

    async fn call(&self, infra: &InfraClient, arguments: Value) -> Result<Value, RpcError> {
        let host_id = require_str(&arguments, "host_id")?;
        let metrics = infra.get(&format!("/hosts/{host_id}/metrics")).await?;
        Ok(json_result(&metrics))
    }
}

struct ListContainers;

#[async_trait]
impl ToolHandler for ListContainers {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "list_containers",
            description: "List containers, optionally filtered by host and including stopped ones.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "host_id": {"type": "string"},
                    "all": {"type": "boolean"}
                }
            }),
            required: vec![],
        }
    }

    async fn call(&self, infra: &InfraClient, arguments: Value) -> Result<Value, RpcError> {
        let mut query = Vec::new();
        if let Some(host_id) = arguments.get("host_id").and_then(Value::as_str) {
            query.push(format!("host_id={host_id}"));
        }
        if arguments.get("all").and_then(Value::as_bool).unwrap_or(false) {
            query.push("all=true".to_string());
        }
        let path = if query.is_empty() {
            "/containers".to_string()
        } else {
            format!("/containers?{}", query.join("&"))
        };
        let containers = infra.get(&path).await?;
        Ok(json_result(&containers))
    }
}

struct CreateContainer;

#[async_trait]
impl ToolHandler for CreateContainer {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "create_container",
            description: "Create and start a container on the local host.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string"},
                    "image": {"type": "string"},
                    "ports": {"type": "array"},
                    "volumes": {"type": "array"},
                    "environment": {"type": "object"},
                    "labels": {"type": "object"},
                    "command": {"type": "array", "items": {"type": "string"}}
                }
            }),
            required: vec!["name", "image"],
        }
    }

    async fn call(&self, infra: &InfraClient, arguments: Value) -> Result<Value, RpcError> {
        require_str(&arguments, "name")?;
        require_str(&arguments, "image")?;
        let container = infra.post("/containers", arguments).await?;
        Ok(json_result(&container))
    }
}

struct RemoveContainer;

#[async_trait]
impl ToolHandler for RemoveContainer {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "remove_container",
            description: "Stop and remove a container.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "id": {"type": "string"},
                    "force": {"type": "boolean"}
                }
            }),
            required: vec!["id"],
        }
    }

    async fn call(&self, infra: &InfraClient, arguments: Value) -> Result<Value, RpcError> {
        let id = require_str(&arguments, "id")?;
        let force = arguments.get("force").and_then(Value::as_bool).unwrap_or(false);
        let path = if force {
            format!("/containers/{id}?force=true")
        } else {
            format!("/containers/{id}")
        };
        let result = infra.delete(&path).await?;
        Ok(json_result(&result))
    }
}

struct GetContainerLogs;

#[async_trait]
impl ToolHandler for GetContainerLogs {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "get_container_logs",
            description: "Fetch the most recent log lines from a container (non-streaming).",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "id": {"type": "string"},
                    "tail": {"type": "integer"}
                }
            }),
            required: vec!["id"],
        }
    }

    async fn call(&self, infra: &InfraClient, arguments: Value) -> Result<Value, RpcError> {
        let id = require_str(&arguments, "id")?;
        let tail = arguments.get("tail").and_then(Value::as_u64).unwrap_or(100);
        // `follow` is never requested here: a tool call is a single
        // request/response exchange, not a stream.
        let path = format!("/containers/{id}/logs?tail={tail}&follow=false");
        let logs = infra.get(&path).await?;
        Ok(json_result(&logs))
    }
}

struct ExecContainerCommand;

#[async_trait]
impl ToolHandler for ExecContainerCommand {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "exec_container_command",
            description: "Run a command inside a running container and return its output.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "id": {"type": "string"},
                    "command": {"type": "array", "items": {"type": "string"}},
                    "tty": {"type": "boolean"}
                }
            }),
            required: vec!["id", "command"],
        }
    }

    async fn call(&self, infra: &InfraClient, arguments: Value) -> Result<Value, RpcError> {
        let id = require_str(&arguments, "id")?;
        if !arguments.get("command").is_some_and(Value::is_array) {
            return Err(RpcError::new(RpcError::INVALID_PARAMS, "command must be an array"));
        }
        let body = json!({
            "command": arguments.get("command"),
            "tty": arguments.get("tty").and_then(Value::as_bool).unwrap_or(false),
        });
        let result = infra.post(&format!("/containers/{id}/exec"), body).await?;
        Ok(json_result(&result))
    }
}

struct GetSystemStatus;

#[async_trait]
impl ToolHandler for GetSystemStatus {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "get_system_status",
            description: "Report host count, container counts by state, and engine reachability.",
            input_schema: json!({"type": "object", "properties": {}}),
            required: vec![],
        }
    }

    async fn call(&self, infra: &InfraClient, _arguments: Value) -> Result<Value, RpcError> {
        let status = infra.get("/system/status").await?;
        Ok(json_result(&status))
    }
}
