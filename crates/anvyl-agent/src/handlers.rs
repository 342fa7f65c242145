//! `/query`, `/health`, `/info`, `/hosts` handlers.
//! table).

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::AgentResult;
use crate::orchestrator::{self, QueryOutcome};
use crate::state::{AgentState, KnownHost};

#[derive(Debug, Deserialize)]
pub struct QueryBody {
    pub query: String,
    pub host_id: Option<String>,
}

pub async fn query(
    State(state): State<AgentState>,
    Json(body): Json<QueryBody>,
) -> AgentResult<Json<QueryOutcome>> {
    let outcome = orchestrator::run_query(&state, &body.query, body.host_id.as_deref()).await?;
    Ok(Json(outcome))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub model: String,
    pub provider_url: String,
    pub mcp_url: String,
    pub tools: Vec<String>,
}

pub async fn info(State(state): State<AgentState>) -> AgentResult<Json<InfoResponse>> {
    let tools = state
        .tool_catalog()
        .await?
        .iter()
        .map(|t| t.function.name.clone())
        .collect();

    Ok(Json(InfoResponse {
        model: state.model.clone(),
        provider_url: state.provider_url.clone(),
        mcp_url: state.mcp_url.clone(),
        tools,
    }))
}

pub async fn add_known_host(State(state): State<AgentState>, Json(host): Json<KnownHost>) -> Json<KnownHost> {
    state.add_known_host(host.clone()).await;
    Json(host)
}

pub async fn list_known_hosts(State(state): State<AgentState>) -> Json<Vec<KnownHost>> {
    Json(state.list_known_hosts().await)
}
