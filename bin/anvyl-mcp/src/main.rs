//! MCP Server binary: exposes the Infrastructure Service's operations
//! as JSON-RPC 2.0 tools, over stdio (for direct model-client wiring)
//! or HTTP POST (default).

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use anvyl_core::env_config;
use anvyl_mcp::{transport, McpServer};

#[derive(Parser)]
#[command(name = "anvyl-mcp")]
#[command(about = "MCP tool server exposing Anvyl's Infrastructure API")]
struct Cli {
    /// Serve over newline-delimited stdio instead of HTTP POST.
    #[arg(long)]
    stdio: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_config::init_tracing("anvyl_mcp");

    let cli = Cli::parse();
    let infra_url = env_config::infra_url();
    let server = Arc::new(McpServer::new(infra_url.clone()));
    info!(infra_url, "MCP server built");

    if cli.stdio {
        info!("serving over stdio");
        transport::stdio::run(server).await?;
    } else {
        let app = transport::http::build_router(server);
        let port = env_config::mcp_port();
        let addr: SocketAddr = format!("0.0.0.0:{port}").parse()?;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!(%addr, "MCP server listening");
        axum::serve(listener, app).await?;
    }

    Ok(())
}
