//! Error taxonomy shared across every Anvyl service.
//!
//! Component-local error enums (`DbError` in `anvyl-db`,
//! `DockerAdapterError` in `anvyl-docker`, ...) classify failures at
//! their own boundary and convert `Into<AnvylError>`, so callers above
//! a boundary never have to match on a lower layer's concrete error
//! type — only on [`ErrorKind`]. The same taxonomy drives both the
//! HTTP status mapping below and the MCP error-code table.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// The error kinds in the shared taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Invariant,
    EngineUnavailable,
    ProviderUnavailable,
    SpawnError,
    Internal,
}

#[derive(Debug, Error)]
pub enum AnvylError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invariant violated: {0}")]
    Invariant(String),

    #[error("docker engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("model provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("failed to spawn service: {0}")]
    SpawnError(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AnvylError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnvylError::Validation(_) => ErrorKind::Validation,
            AnvylError::NotFound(_) => ErrorKind::NotFound,
            AnvylError::Conflict(_) => ErrorKind::Conflict,
            AnvylError::Invariant(_) => ErrorKind::Invariant,
            AnvylError::EngineUnavailable(_) => ErrorKind::EngineUnavailable,
            AnvylError::ProviderUnavailable(_) => ErrorKind::ProviderUnavailable,
            AnvylError::SpawnError(_) => ErrorKind::SpawnError,
            AnvylError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// One-line summary with a remediation hint, for the CLI to print
    /// alongside the error.
    pub fn remediation_hint(&self) -> &'static str {
        match self.kind() {
            ErrorKind::EngineUnavailable => "check that Docker is running",
            ErrorKind::NotFound => "check the id and try again",
            ErrorKind::Conflict => "the resource already exists",
            ErrorKind::Invariant => "this operation is not permitted on this resource",
            ErrorKind::ProviderUnavailable => "check the model provider endpoint",
            ErrorKind::SpawnError => "check the service log for details",
            ErrorKind::Validation => "check the request body",
            ErrorKind::Internal => "an unexpected error occurred",
        }
    }
}

impl IntoResponse for AnvylError {
    fn into_response(self) -> Response {
        let status = match self.kind() {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Invariant => StatusCode::CONFLICT,
            ErrorKind::EngineUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::ProviderUnavailable => StatusCode::BAD_GATEWAY,
            ErrorKind::SpawnError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": true,
            "kind": format!("{:?}", self.kind()),
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}
