//! The bounded tool-call loop.

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::chat::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use crate::error::{AgentError, AgentResult};
use crate::state::AgentState;

const SYSTEM_PREAMBLE: &str = "You are Anvyl's operating agent: a single-node Docker \
orchestrator assistant. You can inspect and manage hosts and containers through \
the tools provided. Use a tool whenever the user's request requires reading or \
changing system state; answer directly otherwise.";

#[derive(Debug, Clone, Serialize)]
pub struct ToolCallTrace {
    pub name: String,
    pub arguments: Value,
    pub result: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryOutcome {
    pub reply: String,
    pub tool_calls: Vec<ToolCallTrace>,
    pub model: String,
}

pub async fn run_query(state: &AgentState, query: &str, host_id: Option<&str>) -> AgentResult<QueryOutcome> {
    let tools = state.tool_catalog().await?.clone();

    let mut system_message = SYSTEM_PREAMBLE.to_string();
    system_message.push_str("\n\nAvailable tools:\n");
    for tool in &tools {
        system_message.push_str(&format!("- {}: {}\n", tool.function.name, tool.function.description));
    }

    if let Some(host_id) = host_id {
        if host_id != state.local_host_id {
            // Single-node scope: cross-host forwarding is a stub.
            system_message.push_str(&format!(
                "\nThe user asked to target host {host_id}. Remote-host forwarding is not \
                 implemented in this deployment; explain that to the user if relevant.\n"
            ));
        }
    }

    let mut messages = vec![ChatMessage::system(system_message), ChatMessage::user(query)];
    let mut trace = Vec::new();

    for iteration in 0..state.max_iterations {
        let response = call_provider(state, &messages, &tools).await?;
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::MalformedProviderResponse("no choices in response".to_string()))?;

        let message = choice.message;

        match &message.tool_calls {
            None => {
                return Ok(QueryOutcome {
                    reply: message.content.unwrap_or_default(),
                    tool_calls: trace,
                    model: state.model.clone(),
                });
            }
            Some(calls) if calls.is_empty() => {
                return Ok(QueryOutcome {
                    reply: message.content.unwrap_or_default(),
                    tool_calls: trace,
                    model: state.model.clone(),
                });
            }
            Some(calls) => {
                let calls = calls.clone();
                messages.push(message);

                for call in calls {
                    let arguments: Value = serde_json::from_str(&call.function.arguments)
                        .unwrap_or_else(|_| Value::Object(Default::default()));

                    let result = match state.mcp_client.call_tool(&call.function.name, arguments.clone()).await {
                        Ok(result) => result,
                        Err(e) => {
                            warn!(tool = %call.function.name, error = %e, "tool call failed");
                            Value::String(format!("error: {e}"))
                        }
                    };

                    trace.push(ToolCallTrace {
                        name: call.function.name.clone(),
                        arguments: arguments.clone(),
                        result: result.clone(),
                    });

                    let result_text = serde_json::to_string(&result).unwrap_or_else(|_| result.to_string());
                    messages.push(ChatMessage::tool_result(call.id.clone(), result_text));
                }
            }
        }

        if iteration + 1 == state.max_iterations {
            return Ok(QueryOutcome {
                reply: "exceeded tool-call budget".to_string(),
                tool_calls: trace,
                model: state.model.clone(),
            });
        }
    }

    Ok(QueryOutcome {
        reply: "exceeded tool-call budget".to_string(),
        tool_calls: trace,
        model: state.model.clone(),
    })
}

async fn call_provider(
    state: &AgentState,
    messages: &[ChatMessage],
    tools: &[crate::chat::ToolSchema],
) -> AgentResult<ChatCompletionResponse> {
    let request = ChatCompletionRequest {
        model: state.model.clone(),
        messages: messages.to_vec(),
        tools: tools.to_vec(),
        tool_choice: Some("auto"),
    };

    let response = state
        .provider_client
        .post(format!("{}/chat/completions", state.provider_url.trim_end_matches('/')))
        .json(&request)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                AgentError::ProviderTimeout
            } else {
                anvyl_core::AnvylError::ProviderUnavailable(e.to_string()).into()
            }
        })?;

    response
        .json::<ChatCompletionResponse>()
        .await
        .map_err(|e| AgentError::MalformedProviderResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering as AtomicOrdering};
    use std::sync::Arc;
    use tokio::net::TcpListener;

    async fn spawn_server(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn stub_mcp_server() -> String {
        async fn handle(Json(req): Json<Value>) -> Json<Value> {
            let method = req["method"].as_str().unwrap_or_default();
            let id = req["id"].clone();
            let result = match method {
                "tools/list" => json!({"tools": [{"name": "get_system_status", "description": "status", "input_schema": {}}]}),
                "tools/call" => json!({"content": [{"type": "text", "text": "3 containers running"}]}),
                _ => json!({}),
            };
            Json(json!({"jsonrpc": "2.0", "id": id, "result": result}))
        }
        spawn_server(Router::new().route("/mcp", post(handle))).await
    }

    async fn stub_state(provider_url: String, max_iterations: u32) -> AgentState {
        let mcp_url = format!("{}/mcp", stub_mcp_server().await);
        AgentState::new(provider_url, "test-model".to_string(), mcp_url, "local".to_string(), max_iterations, 5)
    }

    #[tokio::test]
    async fn direct_answer_without_tool_calls() {
        async fn handle(Json(_req): Json<Value>) -> Json<Value> {
            Json(json!({
                "choices": [{"message": {"role": "assistant", "content": "all good"}, "finish_reason": "stop"}]
            }))
        }
        let provider_url = spawn_server(Router::new().route("/chat/completions", post(handle))).await;
        let state = stub_state(provider_url, 8).await;

        let outcome = run_query(&state, "how are things", None).await.unwrap();
        assert_eq!(outcome.reply, "all good");
        assert!(outcome.tool_calls.is_empty());
    }

    #[tokio::test]
    async fn tool_call_then_final_answer() {
        let call_count = Arc::new(AtomicU32::new(0));
        let counter = call_count.clone();

        async fn handle(
            axum::extract::State(counter): axum::extract::State<Arc<AtomicU32>>,
            Json(_req): Json<Value>,
        ) -> Json<Value> {
            let n = counter.fetch_add(1, AtomicOrdering::SeqCst);
            if n == 0 {
                Json(json!({
                    "choices": [{
                        "message": {
                            "role": "assistant",
                            "content": null,
                            "tool_calls": [{"id": "call_1", "type": "function", "function": {"name": "get_system_status", "arguments": "{}"}}]
                        },
                        "finish_reason": "tool_calls"
                    }]
                }))
            } else {
                Json(json!({
                    "choices": [{"message": {"role": "assistant", "content": "3 containers running"}, "finish_reason": "stop"}]
                }))
            }
        }

        let router = Router::new()
            .route("/chat/completions", post(handle))
            .with_state(counter);
        let provider_url = spawn_server(router).await;
        let state = stub_state(provider_url, 8).await;

        let outcome = run_query(&state, "how many containers are running?", None).await.unwrap();
        assert_eq!(outcome.reply, "3 containers running");
        assert_eq!(outcome.tool_calls.len(), 1);
        assert_eq!(outcome.tool_calls[0].name, "get_system_status");
    }

    #[tokio::test]
    async fn budget_exhaustion_returns_explanatory_reply() {
        async fn handle(Json(_req): Json<Value>) -> Json<Value> {
            Json(json!({
                "choices": [{
                    "message": {
                        "role": "assistant",
                        "content": null,
                        "tool_calls": [{"id": "call_1", "type": "function", "function": {"name": "get_system_status", "arguments": "{}"}}]
                    },
                    "finish_reason": "tool_calls"
                }]
            }))
        }
        let provider_url = spawn_server(Router::new().route("/chat/completions", post(handle))).await;
        let state = stub_state(provider_url, 2).await;

        let outcome = run_query(&state, "loop forever", None).await.unwrap();
        assert_eq!(outcome.reply, "exceeded tool-call budget");
    }
}
