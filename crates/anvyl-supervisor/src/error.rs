use anvyl_core::AnvylError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("failed to spawn {service}: {reason}")]
    SpawnFailed { service: String, reason: String },

    #[error("service {0} is not running")]
    NotRunning(String),

    #[error("health check for {service} timed out after {seconds}s")]
    HealthCheckTimeout { service: String, seconds: u64 },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SupervisorResult<T> = Result<T, SupervisorError>;

impl From<SupervisorError> for AnvylError {
    fn from(err: SupervisorError) -> Self {
        match err {
            SupervisorError::NotRunning(msg) => AnvylError::NotFound(msg),
            other => AnvylError::SpawnError(other.to_string()),
        }
    }
}
