//! Agent Service binary: translates natural-language instructions
//! into MCP tool calls by looping against an OpenAI-compatible chat
//! completions endpoint.

use std::net::SocketAddr;

use anyhow::Result;
use tracing::info;

use anvyl_agent::state::{DEFAULT_MAX_ITERATIONS, DEFAULT_REQUEST_TIMEOUT_SECONDS};
use anvyl_agent::{router, AgentState};
use anvyl_core::env_config;

#[tokio::main]
async fn main() -> Result<()> {
    env_config::init_tracing("anvyl_agent");

    let provider_url = env_config::model_provider_url();
    let model = env_config::model();
    let mcp_url = env_config::mcp_url();
    // The agent does not open the DB or the Docker socket itself; its
    // only notion of "local" is the host id the Infrastructure Service
    // reports for this node, discovered on first use.
    let local_host_id = local_host_id(&env_config::infra_url()).await?;

    let state = AgentState::new(
        provider_url.clone(),
        model.clone(),
        mcp_url.clone(),
        local_host_id,
        DEFAULT_MAX_ITERATIONS,
        DEFAULT_REQUEST_TIMEOUT_SECONDS,
    );
    info!(provider_url, model, mcp_url, "agent service built");

    let app = router::build_router(state);
    let port = env_config::agent_port();
    let addr: SocketAddr = format!("0.0.0.0:{port}").parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "agent service listening");
    axum::serve(listener, app).await?;

    Ok(())
}

async fn local_host_id(infra_url: &str) -> Result<String> {
    let url = format!("{}/hosts", infra_url.trim_end_matches('/'));
    let client = reqwest_lite();
    match client.get(&url).send().await {
        Ok(response) if response.status().is_success() => {
            let hosts: Vec<serde_json::Value> = response.json().await.unwrap_or_default();
            let local = hosts
                .iter()
                .find(|h| h.get("is_local").and_then(|v| v.as_bool()).unwrap_or(false))
                .and_then(|h| h.get("id"))
                .and_then(|v| v.as_str());
            Ok(local.unwrap_or("local").to_string())
        }
        _ => {
            tracing::warn!("could not reach infra service at startup, defaulting local host id to \"local\"");
            Ok("local".to_string())
        }
    }
}

fn reqwest_lite() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}
