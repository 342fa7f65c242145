//! Tool catalog and dispatch: one
//! `ToolHandler` per Infrastructure API operation, registered in a
//! `HashMap<&'static str, Box<dyn ToolHandler>>` keyed by tool name.

mod catalog;
mod infra_client;

pub use infra_client::InfraClient;

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::protocol::RpcError;

#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
    pub required: Vec<&'static str>,
}

#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn descriptor(&self) -> ToolDescriptor;
    async fn call(&self, infra: &InfraClient, arguments: Value) -> Result<Value, RpcError>;
}

pub struct ToolRegistry {
    handlers: HashMap<&'static str, Box<dyn ToolHandler>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        let mut handlers: HashMap<&'static str, Box<dyn ToolHandler>> = HashMap::new();
        for handler in catalog::all() {
            handlers.insert(handler.descriptor().name, handler);
        }
        Self { handlers }
    }

    pub fn list(&self) -> Vec<ToolDescriptor> {
        let mut tools: Vec<_> = self.handlers.values().map(|h| h.descriptor()).collect();
        tools.sort_by_key(|t| t.name);
        tools
    }

    pub async fn call(
        &self,
        infra: &InfraClient,
        name: &str,
        arguments: Value,
    ) -> Result<Value, RpcError> {
        let handler = self
            .handlers
            .get(name)
            .ok_or_else(|| RpcError::new(RpcError::METHOD_NOT_FOUND, format!("unknown tool: {name}")))?;
        handler.call(infra, arguments).await
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
