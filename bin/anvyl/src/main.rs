//! Command-line entry point: dispatches service lifecycle verbs to the
//! supervisor and data-plane verbs to the Infrastructure/Agent HTTP
//! APIs.

mod cli;
mod commands;
mod error;
mod exitcode;
mod infra_client;

use clap::Parser;

use anvyl_core::env_config;
use anvyl_supervisor::{ServiceId, Supervisor};
use cli::{Cli, Commands};
use error::CliError;
use infra_client::ApiClient;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "anvyl=warn".into()),
        )
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => std::process::exit(exitcode::SUCCESS),
        Err(err) => {
            eprintln!("{}: {}", remediation_prefix(&err), err);
            std::process::exit(err.code);
        }
    }
}

fn remediation_prefix(err: &CliError) -> &'static str {
    match err.code {
        exitcode::SERVICE_NOT_RUNNING => "not running",
        exitcode::BACKEND_UNAVAILABLE => "unavailable",
        exitcode::INVALID_ARGUMENTS => "invalid arguments",
        _ => "error",
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let supervisor = Supervisor::new();
    let infra_url = env_config::infra_url();
    let agent_url = agent_base_url();
    let infra = ApiClient::new(infra_url.clone());
    let agent = ApiClient::new(agent_url.clone());

    match cli.command {
        Commands::Up => commands::service::up_all(&supervisor).await,
        Commands::Down => commands::service::down_all(&supervisor),
        Commands::Restart => commands::service::restart_all(&supervisor).await,
        Commands::Status => commands::service::status_all(&supervisor),
        Commands::Infra { action } => commands::service::dispatch(&supervisor, ServiceId::Infra, action).await,
        Commands::Mcp { action } => commands::service::dispatch(&supervisor, ServiceId::Mcp, action).await,
        Commands::Agent { action } => match action {
            cli::AgentAction::Query { text, host_id } => commands::agent::query(&agent, text, host_id).await,
            cli::AgentAction::Up => commands::service::dispatch(&supervisor, ServiceId::Agent, cli::ServiceAction::Up).await,
            cli::AgentAction::Down => {
                commands::service::dispatch(&supervisor, ServiceId::Agent, cli::ServiceAction::Down).await
            }
            cli::AgentAction::Status => {
                commands::service::dispatch(&supervisor, ServiceId::Agent, cli::ServiceAction::Status).await
            }
            cli::AgentAction::Logs { follow, tail } => {
                commands::service::dispatch(&supervisor, ServiceId::Agent, cli::ServiceAction::Logs { follow, tail }).await
            }
        },
        Commands::Host { action } => commands::host::dispatch(&infra, action).await,
        Commands::Container { action } => commands::container::dispatch(&infra, &infra_url, action).await,
    }
}

fn agent_base_url() -> String {
    format!("http://localhost:{}", env_config::agent_port())
}
