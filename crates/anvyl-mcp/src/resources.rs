//! Static resource catalog for `resources/list` and `resources/read`.

use serde_json::{json, Value};

use crate::protocol::RpcError;
use crate::tools::InfraClient;

pub struct ResourceDescriptor {
    pub uri: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub fn list() -> Vec<ResourceDescriptor> {
    vec![
        ResourceDescriptor {
            uri: "anvyl://hosts",
            name: "hosts",
            description: "The current list of hosts known to this node.",
        },
        ResourceDescriptor {
            uri: "anvyl://system/status",
            name: "system status",
            description: "Live host/container counts and engine reachability.",
        },
    ]
}

pub async fn read(infra: &InfraClient, uri: &str) -> Result<Value, RpcError> {
    let body = match uri {
        "anvyl://hosts" => infra.get("/hosts").await?,
        "anvyl://system/status" => infra.get("/system/status").await?,
        other => {
            return Err(RpcError::new(
                RpcError::NOT_FOUND,
                format!("unknown resource: {other}"),
            ))
        }
    };

    Ok(json!({
        "contents": [{
            "uri": uri,
            "text": serde_json::to_string_pretty(&body).unwrap_or_else(|_| body.to_string()),
        }]
    }))
}
