//! Process-wide state for the Agent Service.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, OnceCell};

use crate::chat::{ToolFunctionSchema, ToolSchema};
use crate::error::AgentResult;
use crate::mcp_client::McpClient;

pub const DEFAULT_MAX_ITERATIONS: u32 = 8;
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnownHost {
    pub id: String,
    pub ip: String,
}

#[derive(Clone)]
pub struct AgentState {
    pub provider_url: String,
    pub model: String,
    pub mcp_url: String,
    pub max_iterations: u32,
    pub local_host_id: String,
    pub provider_client: Client,
    pub mcp_client: Arc<McpClient>,
    tool_catalog: Arc<OnceCell<Vec<ToolSchema>>>,
    known_hosts: Arc<Mutex<HashMap<String, KnownHost>>>,
}

impl AgentState {
    pub fn new(
        provider_url: String,
        model: String,
        mcp_url: String,
        local_host_id: String,
        max_iterations: u32,
        request_timeout_seconds: u64,
    ) -> Self {
        let provider_client = Client::builder()
            .timeout(Duration::from_secs(request_timeout_seconds))
            .build()
            .expect("provider http client builds");

        Self {
            mcp_client: Arc::new(McpClient::new(mcp_url.clone())),
            provider_url,
            model,
            mcp_url,
            max_iterations,
            local_host_id,
            provider_client,
            tool_catalog: Arc::new(OnceCell::new()),
            known_hosts: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Fetches the tool catalog from the MCP server once per service
    /// lifetime and caches it.
    pub async fn tool_catalog(&self) -> AgentResult<&Vec<ToolSchema>> {
        self.tool_catalog
            .get_or_try_init(|| async {
                let result = self.mcp_client.list_tools().await?;
                let tools = result
                    .get("tools")
                    .and_then(|t| t.as_array())
                    .cloned()
                    .unwrap_or_default();

                Ok(tools
                    .into_iter()
                    .filter_map(|t| {
                        Some(ToolSchema {
                            kind: "function",
                            function: ToolFunctionSchema {
                                name: t.get("name")?.as_str()?.to_string(),
                                description: t.get("description").and_then(|d| d.as_str()).unwrap_or("").to_string(),
                                parameters: t.get("input_schema").cloned().unwrap_or(serde_json::json!({})),
                            },
                        })
                    })
                    .collect())
            })
            .await
    }

    pub async fn add_known_host(&self, host: KnownHost) {
        self.known_hosts.lock().await.insert(host.id.clone(), host);
    }

    pub async fn list_known_hosts(&self) -> Vec<KnownHost> {
        self.known_hosts.lock().await.values().cloned().collect()
    }
}
