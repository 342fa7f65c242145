use anvyl_core::AnvylError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Provider timeout (504) and malformed provider JSON (502) are kept
/// as distinct variants here rather than folded into
/// `AnvylError::ProviderUnavailable` (which always maps to 502 —
/// the two failure modes get distinct status codes.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Core(#[from] AnvylError),

    #[error("model provider request timed out")]
    ProviderTimeout,

    #[error("model provider returned malformed JSON: {0}")]
    MalformedProviderResponse(String),
}

pub type AgentResult<T> = Result<T, AgentError>;

impl IntoResponse for AgentError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match self {
            AgentError::Core(e) => e.into_response(),
            AgentError::ProviderTimeout => (
                StatusCode::GATEWAY_TIMEOUT,
                Json(json!({"error": true, "kind": "ProviderTimeout", "message": message})),
            )
                .into_response(),
            AgentError::MalformedProviderResponse(_) => (
                StatusCode::BAD_GATEWAY,
                Json(json!({"error": true, "kind": "MalformedProviderResponse", "message": message})),
            )
                .into_response(),
        }
    }
}
