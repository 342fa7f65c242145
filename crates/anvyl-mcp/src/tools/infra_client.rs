//! Thin HTTP client the tool handlers use to reach the Infrastructure
//! Service: a plain `Client::builder()` + timeout shape (no retry: a
//! 30 s MCP→infra deadline is a hard unavailability signal, not a
//! transient condition to paper over).

use std::time::Duration;

use reqwest::{Client, Method, StatusCode};
use serde_json::Value;

use crate::protocol::{map_http_status, RpcError};

const MCP_TO_INFRA_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct InfraClient {
    client: Client,
    base_url: String,
}

impl InfraClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(MCP_TO_INFRA_TIMEOUT)
            .build()
            .expect("infra http client builds");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn get(&self, path: &str) -> Result<Value, RpcError> {
        self.request(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<Value, RpcError> {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, RpcError> {
        self.request(Method::DELETE, path, None).await
    }

    async fn request(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, RpcError> {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.client.request(method, &url);
        if let Some(body) = &body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            RpcError::new(RpcError::ENGINE_UNAVAILABLE, "infrastructure service unreachable")
                .with_data(e.to_string())
        })?;

        let status = response.status();
        if status == StatusCode::OK {
            return response
                .json::<Value>()
                .await
                .map_err(|e| RpcError::new(RpcError::INTERNAL_ERROR, e.to_string()));
        }

        let code = map_http_status(status.as_u16());
        let body = response
            .json::<Value>()
            .await
            .unwrap_or_else(|_| Value::String("request failed".to_string()));
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("infrastructure request failed")
            .to_string();

        Err(RpcError::new(code, message))
    }
}
