//! Site check orchestrator.
//!
//! ```text
//!                 ┌──────────────────────────────┐
//!   POST /orch    │         orchestrator          │
//!   ─────────────▶│  normalize → dispatch ──────┐ │
//!                 │      ▲          │ cache    │ │
//!   response      │      │          ▼          │ │
//!   ◀─────────────│   merge ◀── demultiplex    │ │
//!                 └──────────────────┬─────────┘ │
//!                                    │ POST      │
//!                       ┌────────────┴───────┐   │
//!                       ▼                    ▼
//!                ┌────────────┐       ┌────────────┐
//!                │ /wordpress │       │  /regular  │
//!                └────────────┘       └────────────┘
//! ```
//!
//! All three roles ship in this binary: `site-orchestrator serve <role>`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::net::TcpListener;

use site_orchestrator::config::{load_config, loader::parse_config};
use site_orchestrator::lifecycle::signals::spawn_signal_handler;
use site_orchestrator::observability::{logging, metrics};
use site_orchestrator::{HttpServer, ServiceRole, Shutdown};

#[derive(Parser)]
#[command(name = "site-orchestrator")]
#[command(about = "Site check orchestrator and capability services", long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one service role
    Serve {
        #[arg(value_enum)]
        role: ServiceRole,

        /// Override the listener bind address
        #[arg(short, long)]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => parse_config("")?,
    };
    logging::init_logging(&config.observability);

    let Commands::Serve { role, bind } = cli.command;
    tracing::info!(role = %role, "site-orchestrator v{} starting", env!("CARGO_PKG_VERSION"));

    if role == ServiceRole::Orchestrator && config.auth.orch_token.is_empty() {
        config.auth.orch_token = uuid::Uuid::new_v4().to_string();
        println!("Orch-Token: {}", config.auth.orch_token);
    }

    let bind_address = bind
        .or_else(|| config.listener.bind_address.clone())
        .unwrap_or_else(|| role.default_bind_address().to_string());

    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    spawn_signal_handler(shutdown);

    let server = HttpServer::new(role, config)?;
    server.run(listener, receiver).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
