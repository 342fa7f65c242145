//! Thin HTTP client the CLI uses to call the Infrastructure and Agent
//! APIs directly (no MCP hop; that indirection is for model clients).

use std::time::Duration;

use serde_json::Value;

use crate::error::CliError;

pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("reqwest client"),
            base_url: base_url.into(),
        }
    }

    pub async fn get(&self, path: &str) -> Result<Value, CliError> {
        let url = format!("{}{path}", self.base_url);
        let response = self.client.get(&url).send().await.map_err(unreachable)?;
        decode(response).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<Value, CliError> {
        let url = format!("{}{path}", self.base_url);
        let response = self.client.post(&url).json(body).send().await.map_err(unreachable)?;
        decode(response).await
    }

}

fn unreachable(err: reqwest::Error) -> CliError {
    CliError::backend_unavailable(format!("could not reach backend: {err}"))
}

async fn decode(response: reqwest::Response) -> Result<Value, CliError> {
    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);

    if status.is_success() {
        return Ok(body);
    }

    let message = body
        .get("message")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| format!("request failed with status {status}"));
    let kind = body.get("kind").and_then(|v| v.as_str()).unwrap_or("Internal");
    let summary = format!("{kind}: {message}");

    Err(if status.as_u16() == 503 {
        CliError::backend_unavailable(summary)
    } else {
        CliError::generic(summary)
    })
}
