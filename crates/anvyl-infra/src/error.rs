use anvyl_core::AnvylError;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InfraError {
    #[error(transparent)]
    Core(#[from] AnvylError),

    #[error(transparent)]
    Db(#[from] anvyl_db::DbError),

    #[error(transparent)]
    Docker(#[from] anvyl_docker::DockerAdapterError),
}

pub type InfraResult<T> = Result<T, InfraError>;

impl IntoResponse for InfraError {
    fn into_response(self) -> Response {
        let core: AnvylError = match self {
            InfraError::Core(e) => e,
            InfraError::Db(e) => e.into(),
            InfraError::Docker(e) => e.into(),
        };
        core.into_response()
    }
}
