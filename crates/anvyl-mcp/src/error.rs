//! Startup-time errors for the MCP server binary (the JSON-RPC layer
//! itself reports failures as `RpcError`, never as an HTTP status, so
//! this enum only covers bringing the transports up).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum McpError {
    #[error("failed to bind MCP HTTP listener: {0}")]
    Bind(#[from] std::io::Error),
}
