pub mod agent;
pub mod container;
pub mod host;
pub mod service;
