//! State directory layout: `pids/`, `logs/`,
//! and `db.sqlite` under `anvyl_core::env_config::state_dir()`.

use std::path::PathBuf;

use crate::types::ServiceId;

pub fn pids_dir() -> PathBuf {
    anvyl_core::env_config::state_dir().join("pids")
}

pub fn logs_dir() -> PathBuf {
    anvyl_core::env_config::state_dir().join("logs")
}

pub fn pid_file(service: ServiceId) -> PathBuf {
    pids_dir().join(format!("{}.pid", service.as_str()))
}

pub fn log_file(service: ServiceId) -> PathBuf {
    logs_dir().join(format!("{}.log", service.as_str()))
}

pub fn ensure_dirs() -> std::io::Result<()> {
    std::fs::create_dir_all(pids_dir())?;
    std::fs::create_dir_all(logs_dir())?;
    Ok(())
}
