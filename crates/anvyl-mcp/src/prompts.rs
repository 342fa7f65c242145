//! Static prompt template catalog for `prompts/list` and `prompts/get`.

use serde_json::{json, Value};

use crate::protocol::RpcError;

const TRIAGE_TEMPLATE: &str = "You are operating Anvyl, a single-node Docker orchestrator. \
Given the current system status and container list, identify any containers \
that are unexpectedly stopped or missing resources, and propose next actions.";

pub fn list() -> Value {
    json!([{
        "name": "triage_containers",
        "description": "Summarize node health and flag containers needing attention.",
    }])
}

pub fn get(name: &str) -> Result<Value, RpcError> {
    match name {
        "triage_containers" => Ok(json!({
            "description": "Summarize node health and flag containers needing attention.",
            "messages": [{
                "role": "system",
                "content": {"type": "text", "text": TRIAGE_TEMPLATE},
            }],
        })),
        other => Err(RpcError::new(
            RpcError::NOT_FOUND,
            format!("unknown prompt: {other}"),
        )),
    }
}
