//! Calculator service.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌───────────────────────────────────────────────────┐
//!                       │                 CALCULATOR SERVICE                │
//!                       │                                                   │
//!     Client Request    │  ┌───────────┐   ┌──────────┐   ┌─────────────┐   │
//!     ──────────────────┼─▶│  request  │──▶│ calculate│──▶│ calculator  │   │
//!                       │  │ lifecycle │   │ handler  │   │ (validate,  │   │
//!                       │  └───────────┘   └──────────┘   │  compute)   │   │
//!                       │                                 └──────┬──────┘   │
//!                       │                                        ▼          │
//!     Client Response   │                                 ┌─────────────┐   │
//!     ◀─────────────────┼─────────────────────────────────│   session   │◀──┼──▶ MySQL
//!                       │                                 │ (tx scope)  │   │
//!                       │                                 └─────────────┘   │
//!                       │                                                   │
//!                       │  Startup: config → logging → bootstrap (probe,    │
//!                       │           provision) → listener                   │
//!                       └───────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use calc_service::config::load_config;
use calc_service::lifecycle::{self, signals, Shutdown};
use calc_service::observability::init_logging;

#[derive(Parser)]
#[command(name = "calc-service")]
#[command(about = "Calculator HTTP service with durable calculation records", long_about = None)]
struct Args {
    /// Optional TOML config file; environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    init_logging(&config.observability)?;

    tracing::info!("Application starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        database = ?config.database,
        max_attempts = config.bootstrap.max_attempts,
        interval_ms = config.bootstrap.interval_ms,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(&shutdown);

    if let Err(e) = lifecycle::start(config, &shutdown).await {
        tracing::error!(error = %e, "Startup failed");
        return Err(e.into());
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
