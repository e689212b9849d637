//! Endpoint reachability sentinel.
//!
//! Probes every configured endpoint, opens a PagerDuty incident once an
//! endpoint has failed often enough, resolves it on recovery and persists the
//! per-endpoint state between passes.
//!
//! # Architecture Overview
//!
//! ```text
//!   trigger (HTTP / scheduler / CLI)
//!          │
//!          ▼
//!   ┌──────────────┐   list/get/set   ┌──────────────┐
//!   │ BatchRunner  │─────────────────▶│  StateStore  │
//!   │  Reconciler  │                  └──────────────┘
//!   └──────┬───────┘
//!          │ probe            open / resolve      increment / timing
//!          ▼                        ▼                     ▼
//!   ┌──────────────┐       ┌────────────────┐     ┌──────────────┐
//!   │    Prober    │       │ IncidentClient │     │   Metrics    │
//!   └──────────────┘       └────────────────┘     └──────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use endpoint_sentinel::config::{load_config, SentinelConfig};
use endpoint_sentinel::http::HttpServer;
use endpoint_sentinel::lifecycle::{build_runner, signals, Shutdown};
use endpoint_sentinel::observability::{logging, metrics};
use endpoint_sentinel::reconcile::Scheduler;

#[derive(Parser)]
#[command(name = "endpoint-sentinel", version)]
#[command(about = "Probe endpoints and keep PagerDuty incidents in sync", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP trigger (and the scheduler when enabled)
    Serve,
    /// Run one reconciliation pass and exit
    Run {
        /// Print the full pass report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Reconcile a single endpoint
    Check { handle: String },
    /// Print persisted endpoint state
    Show { handle: Option<String> },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    logging::init_logging(&config.observability);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "endpoint-sentinel starting");

    let config = Arc::new(config);
    match cli.command {
        Commands::Serve => serve(config).await,
        Commands::Run { json } => {
            let runner = build_runner(config)?;
            let report = runner.reconcile_all().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report.outcome);
            }
            Ok(exit_code(report.outcome.is_ok()))
        }
        Commands::Check { handle } => {
            let runner = build_runner(config)?;
            let outcome = runner.reconcile_one(&handle).await;
            println!("{outcome}");
            Ok(exit_code(outcome.is_ok()))
        }
        Commands::Show { handle } => show(config, handle).await,
    }
}

fn exit_code(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

async fn serve(config: Arc<SentinelConfig>) -> Result<ExitCode, Box<dyn std::error::Error>> {
    if config.metrics.prometheus_enabled {
        match config.metrics.prometheus_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_prometheus(addr),
            Err(e) => tracing::error!(
                address = %config.metrics.prometheus_address,
                error = %e,
                "Failed to parse Prometheus address"
            ),
        }
    }

    let runner = Arc::new(build_runner(config.clone())?);
    let shutdown = Arc::new(Shutdown::new());

    let scheduler = if config.schedule.enabled {
        let scheduler = Scheduler::new(runner.as_ref().clone(), config.schedule.clone());
        let receiver = shutdown.subscribe();
        Some(tokio::spawn(scheduler.run(receiver)))
    } else {
        None
    };

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    let server = HttpServer::new(runner, config.server.clone());
    let server_shutdown = shutdown.subscribe();

    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        signals::trigger_on_signal(&signal_shutdown).await;
    });

    server.run(listener, server_shutdown).await?;

    if let Some(handle) = scheduler {
        if let Err(e) = handle.await {
            tracing::error!(error = %e, "Scheduler task failed");
        }
    }

    tracing::info!("Shutdown complete");
    Ok(ExitCode::SUCCESS)
}

async fn show(
    config: Arc<SentinelConfig>,
    handle: Option<String>,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let runner = build_runner(config)?;
    let store = runner.reconciler().store();

    let handles = match handle {
        Some(handle) => vec![handle],
        None => store.list_handles().await?,
    };

    let mut document = serde_json::Map::new();
    for handle in handles {
        let state = store.get(&handle).await?;
        document.insert(handle, serde_json::to_value(&state)?);
    }
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(ExitCode::SUCCESS)
}
