use anvyl_core::AnvylError;
use thiserror::Error;

/// The four boundary error kinds at this adapter. `bollard::errors::Error`
/// is named only here and in [`classify`] — no caller above this crate
/// inspects bollard's concrete error type.
#[derive(Debug, Error)]
pub enum DockerAdapterError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("state error: {0}")]
    StateError(String),

    #[error("invalid spec: {0}")]
    InvalidSpec(String),

    #[error("docker engine unavailable: {0}")]
    EngineUnavailable(String),
}

pub type DockerAdapterResult<T> = Result<T, DockerAdapterError>;

impl From<DockerAdapterError> for AnvylError {
    fn from(err: DockerAdapterError) -> Self {
        match err {
            DockerAdapterError::NotFound(msg) => AnvylError::NotFound(msg),
            DockerAdapterError::StateError(msg) => AnvylError::Internal(msg),
            DockerAdapterError::InvalidSpec(msg) => AnvylError::Validation(msg),
            DockerAdapterError::EngineUnavailable(msg) => AnvylError::EngineUnavailable(msg),
        }
    }
}

pub(crate) fn classify(err: bollard::errors::Error) -> DockerAdapterError {
    match &err {
        bollard::errors::Error::DockerResponseServerError { status_code: 404, .. } => {
            DockerAdapterError::NotFound(err.to_string())
        }
        bollard::errors::Error::DockerResponseServerError { status_code: 409, .. } => {
            DockerAdapterError::StateError(err.to_string())
        }
        bollard::errors::Error::DockerResponseServerError { status_code: 400, .. } => {
            DockerAdapterError::InvalidSpec(err.to_string())
        }
        _ => DockerAdapterError::EngineUnavailable(err.to_string()),
    }
}
