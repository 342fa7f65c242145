//! Typed readers for the environment variables, each with
//! its documented default. `default_api_port()`-style free functions,
//! reading from the process environment instead of a TOML file since
//! env vars are the external interface here, not a config file format.

use std::path::PathBuf;

fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

pub fn state_dir() -> PathBuf {
    var("ANVYL_STATE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let home = dirs_home();
            home.join(".anvyl")
        })
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

pub fn db_path() -> PathBuf {
    var("ANVYL_DB_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|| state_dir().join("db.sqlite"))
}

pub fn infra_port() -> u16 {
    var("ANVYL_INFRA_PORT")
        .and_then(|v| v.parse().ok())
        .unwrap_or(4200)
}

pub fn mcp_port() -> u16 {
    var("ANVYL_MCP_PORT")
        .and_then(|v| v.parse().ok())
        .unwrap_or(4201)
}

pub fn agent_port() -> u16 {
    var("ANVYL_AGENT_PORT")
        .and_then(|v| v.parse().ok())
        .unwrap_or(4202)
}

pub fn infra_url() -> String {
    var("ANVYL_INFRA_URL").unwrap_or_else(|| "http://localhost:4200".to_string())
}

pub fn mcp_url() -> String {
    var("ANVYL_MCP_URL").unwrap_or_else(|| "http://localhost:4201/mcp".to_string())
}

pub fn model_provider_url() -> String {
    var("ANVYL_MODEL_PROVIDER_URL").unwrap_or_else(|| "http://localhost:11434/v1".to_string())
}

pub fn model() -> String {
    var("ANVYL_MODEL").unwrap_or_else(|| "llama-3.2-3b-instruct".to_string())
}

pub fn reconcile_interval_secs() -> u64 {
    var("ANVYL_RECONCILE_INTERVAL")
        .and_then(|v| v.parse().ok())
        .unwrap_or(15)
}

pub fn log_level() -> String {
    var("ANVYL_LOG_LEVEL").unwrap_or_else(|| "info".to_string())
}

/// Initializes `tracing-subscriber` honoring `ANVYL_LOG_LEVEL`, via the
/// usual `tracing_subscriber::fmt().with_env_filter(...)` pattern.
pub fn init_tracing(service: &str) {
    let level = log_level();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{service}={level},anvyl={level}").into()),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_table() {
        // SAFETY: test-only env manipulation; restored before returning so
        // parallel tests in this module never observe a half-set variable.
        unsafe {
            std::env::remove_var("ANVYL_INFRA_PORT");
            std::env::remove_var("ANVYL_MCP_PORT");
            std::env::remove_var("ANVYL_AGENT_PORT");
            std::env::remove_var("ANVYL_RECONCILE_INTERVAL");
        }
        assert_eq!(infra_port(), 4200);
        assert_eq!(mcp_port(), 4201);
        assert_eq!(agent_port(), 4202);
        assert_eq!(reconcile_interval_secs(), 15);
        assert_eq!(model(), "llama-3.2-3b-instruct");
    }
}
