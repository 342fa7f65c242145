use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "anvyl")]
#[command(about = "Single-node Docker orchestrator: supervises the Infrastructure, MCP, and Agent services and talks to their APIs")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start infra, mcp, and agent in order, waiting for each to become healthy.
    Up,
    /// Stop agent, mcp, and infra in reverse order.
    Down,
    /// Stop then start all three services.
    Restart,
    /// Report per-service running state.
    Status,
    /// Control the Infrastructure Service process.
    Infra {
        #[command(subcommand)]
        action: ServiceAction,
    },
    /// Control the MCP server process.
    Mcp {
        #[command(subcommand)]
        action: ServiceAction,
    },
    /// Control the Agent service process, or send it a query.
    Agent {
        #[command(subcommand)]
        action: AgentAction,
    },
    /// Inspect or register hosts through the Infrastructure API.
    Host {
        #[command(subcommand)]
        action: HostAction,
    },
    /// Inspect or manage containers through the Infrastructure API.
    Container {
        #[command(subcommand)]
        action: ContainerAction,
    },
}

#[derive(Subcommand)]
pub enum ServiceAction {
    Up,
    Down,
    Status,
    Logs {
        #[arg(long)]
        follow: bool,
        #[arg(long)]
        tail: Option<usize>,
    },
}

#[derive(Subcommand)]
pub enum AgentAction {
    Up,
    Down,
    Status,
    Logs {
        #[arg(long)]
        follow: bool,
        #[arg(long)]
        tail: Option<usize>,
    },
    /// Ask the agent a natural-language question; it may call tools on your behalf.
    Query {
        text: String,
        #[arg(long = "host-id")]
        host_id: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum HostAction {
    List,
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        ip: String,
        #[arg(long)]
        os: Option<String>,
    },
    Metrics {
        id: String,
    },
}

#[derive(Subcommand)]
pub enum ContainerAction {
    List {
        #[arg(long = "host-id")]
        host_id: Option<String>,
        #[arg(long)]
        all: bool,
    },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        image: String,
        #[arg(long = "host-id")]
        host_id: Option<String>,
        /// Repeatable `HOST:CONTAINER[/PROTO]` port mapping, e.g. `8080:80/tcp`.
        #[arg(long = "port")]
        ports: Vec<String>,
        /// Repeatable `SOURCE:TARGET[:ro]` volume mount.
        #[arg(long = "volume")]
        volumes: Vec<String>,
        /// Repeatable `KEY=VALUE` environment variable.
        #[arg(long = "env")]
        env: Vec<String>,
    },
    Stop {
        id: String,
        #[arg(long)]
        timeout: Option<i64>,
    },
    Logs {
        id: String,
        #[arg(long)]
        tail: Option<u32>,
        #[arg(long)]
        follow: bool,
    },
    Exec {
        id: String,
        command: Vec<String>,
    },
}
