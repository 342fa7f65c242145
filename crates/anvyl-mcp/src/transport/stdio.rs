//! Stdio transport: newline-delimited JSON,
//! one object per line, read from stdin and written to stdout.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, warn};

use crate::protocol::{RpcError, RpcRequest, RpcResponse};
use crate::server::McpServer;

pub async fn run(server: Arc<McpServer>) -> anyhow::Result<()> {
    let stdin = tokio::io::stdin();
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(stdin).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<RpcRequest>(&line) {
            Ok(request) => server.dispatch(request).await,
            Err(e) => {
                warn!(error = %e, "malformed JSON-RPC line");
                Some(RpcResponse::err(
                    serde_json::Value::Null,
                    RpcError::new(RpcError::PARSE_ERROR, "invalid JSON"),
                ))
            }
        };

        if let Some(response) = response {
            let encoded = serde_json::to_string(&response)?;
            if let Err(e) = stdout.write_all(encoded.as_bytes()).await {
                error!(error = %e, "failed writing MCP response to stdout");
                break;
            }
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }
    }

    Ok(())
}
