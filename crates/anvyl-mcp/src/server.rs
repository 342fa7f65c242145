//! Shared dispatch core, written once and reused by both
//! the stdio and HTTP transports.

use serde_json::{json, Value};

use crate::protocol::{RpcError, RpcRequest, RpcResponse, PROTOCOL_VERSION};
use crate::tools::{InfraClient, ToolRegistry};
use crate::{prompts, resources};

pub struct McpServer {
    infra: InfraClient,
    tools: ToolRegistry,
}

impl McpServer {
    pub fn new(infra_url: impl Into<String>) -> Self {
        Self {
            infra: InfraClient::new(infra_url),
            tools: ToolRegistry::new(),
        }
    }

    /// Dispatch one decoded request. Returns `None` for notifications
    /// (no `id`, no reply expected).
    pub async fn dispatch(&self, request: RpcRequest) -> Option<RpcResponse> {
        if request.is_notification() {
            return None;
        }
        let id = request.id.clone().unwrap_or(Value::Null);

        let result = self.handle(&request.method, request.params).await;
        Some(match result {
            Ok(value) => RpcResponse::ok(id, value),
            Err(err) => RpcResponse::err(id, err),
        })
    }

    async fn handle(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        match method {
            "initialize" => Ok(json!({
                "protocol_version": PROTOCOL_VERSION,
                "capabilities": {"tools": true, "resources": true, "prompts": true},
                "server_info": {"name": "anvyl-mcp", "version": env!("CARGO_PKG_VERSION")},
            })),
            "ping" => Ok(json!({})),
            "tools/list" => {
                let tools: Vec<Value> = self
                    .tools
                    .list()
                    .into_iter()
                    .map(|t| {
                        json!({
                            "name": t.name,
                            "description": t.description,
                            "input_schema": t.input_schema,
                            "required": t.required,
                        })
                    })
                    .collect();
                Ok(json!({ "tools": tools }))
            }
            "tools/call" => {
                let name = params
                    .get("name")
                    .and_then(Value::as_str)
                    .ok_or_else(|| RpcError::new(RpcError::INVALID_PARAMS, "missing tool name"))?;
                let arguments = params.get("arguments").cloned().unwrap_or(json!({}));
                self.tools.call(&self.infra, name, arguments).await
            }
            "resources/list" => {
                let items: Vec<Value> = resources::list()
                    .into_iter()
                    .map(|r| json!({"uri": r.uri, "name": r.name, "description": r.description}))
                    .collect();
                Ok(json!({ "resources": items }))
            }
            "resources/read" => {
                let uri = params
                    .get("uri")
                    .and_then(Value::as_str)
                    .ok_or_else(|| RpcError::new(RpcError::INVALID_PARAMS, "missing uri"))?;
                resources::read(&self.infra, uri).await
            }
            "prompts/list" => Ok(json!({ "prompts": prompts::list() })),
            "prompts/get" => {
                let name = params
                    .get("name")
                    .and_then(Value::as_str)
                    .ok_or_else(|| RpcError::new(RpcError::INVALID_PARAMS, "missing prompt name"))?;
                prompts::get(name)
            }
            other => Err(RpcError::new(
                RpcError::METHOD_NOT_FOUND,
                format!("unknown method: {other}"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(method: &str, params: Value) -> RpcRequest {
        RpcRequest {
            jsonrpc: "2.0".to_string(),
            id: Some(json!(1)),
            method: method.to_string(),
            params,
        }
    }

    #[tokio::test]
    async fn initialize_reports_capabilities() {
        let server = McpServer::new("http://localhost:4200");
        let response = server.dispatch(request("initialize", json!({}))).await.unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["protocol_version"], PROTOCOL_VERSION);
        assert_eq!(result["capabilities"]["tools"], true);
    }

    #[tokio::test]
    async fn tools_list_returns_nine_tools() {
        let server = McpServer::new("http://localhost:4200");
        let response = server.dispatch(request("tools/list", json!({}))).await.unwrap();
        let tools = response.result.unwrap()["tools"].as_array().unwrap().len();
        assert_eq!(tools, 9);
    }

    #[tokio::test]
    async fn unknown_method_is_method_not_found() {
        let server = McpServer::new("http://localhost:4200");
        let response = server.dispatch(request("bogus", json!({}))).await.unwrap();
        assert_eq!(response.error.unwrap().code, RpcError::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn notification_produces_no_response() {
        let server = McpServer::new("http://localhost:4200");
        let mut req = request("ping", json!({}));
        req.id = None;
        assert!(server.dispatch(req).await.is_none());
    }

    #[tokio::test]
    async fn tools_call_with_unknown_tool_is_method_not_found() {
        let server = McpServer::new("http://localhost:4200");
        let response = server
            .dispatch(request("tools/call", json!({"name": "nope", "arguments": {}})))
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, RpcError::METHOD_NOT_FOUND);
    }
}
