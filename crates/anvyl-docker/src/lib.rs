//! Docker Engine adapter: the only crate in the workspace
//! that imports `bollard` directly. Everything above this layer talks
//! in terms of [`types::ContainerSpec`] and the `Engine*` result types.

pub mod adapter;
pub mod error;
pub mod types;

pub use adapter::DockerAdapter;
pub use error::{DockerAdapterError, DockerAdapterResult};
pub use types::{
    ContainerSpec, EngineContainerDetail, EngineContainerSummary, ExecResult, PortSpec,
    StatsSample, VolumeSpec, LABEL_CONTAINER_ID, LABEL_MANAGED,
};
