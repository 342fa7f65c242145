//! JSON-RPC HTTP client for talking to the MCP server
//! 1 and step 3c).

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value};

use crate::error::{AgentError, AgentResult};

const MCP_TIMEOUT: Duration = Duration::from_secs(30);

pub struct McpClient {
    client: Client,
    mcp_url: String,
    next_id: AtomicI64,
}

impl McpClient {
    pub fn new(mcp_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(MCP_TIMEOUT)
            .build()
            .expect("mcp http client builds");

        Self {
            client,
            mcp_url: mcp_url.into(),
            next_id: AtomicI64::new(1),
        }
    }

    async fn call(&self, method: &str, params: Value) -> AgentResult<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(&self.mcp_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                anvyl_core::AnvylError::ProviderUnavailable(format!("mcp server unreachable: {e}"))
            })?;

        let envelope: Value = response
            .json()
            .await
            .map_err(|e| AgentError::MalformedProviderResponse(e.to_string()))?;

        if let Some(error) = envelope.get("error") {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("mcp call failed")
                .to_string();
            return Err(anvyl_core::AnvylError::Internal(message).into());
        }

        Ok(envelope.get("result").cloned().unwrap_or(Value::Null))
    }

    pub async fn list_tools(&self) -> AgentResult<Value> {
        self.call("tools/list", json!({})).await
    }

    pub async fn call_tool(&self, name: &str, arguments: Value) -> AgentResult<Value> {
        self.call("tools/call", json!({"name": name, "arguments": arguments}))
            .await
    }
}
