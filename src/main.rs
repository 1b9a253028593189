//! REST API server.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────────────┐
//!                    │                       REST API                            │
//!                    │                                                           │
//!   Client Request   │  ┌─────────┐    ┌──────────┐    ┌────────────────────┐   │
//!   ─────────────────┼─▶│  http   │───▶│ routing  │───▶│ presenter          │   │
//!                    │  │ server  │    │ (resource│    │  validate (rules)  │   │
//!                    │  └─────────┘    │  strict) │    │  handle → Resource │   │
//!                    │                 └──────────┘    └─────────┬──────────┘   │
//!                    │                                           │              │
//!   Client Response  │  ┌─────────┐    ┌──────────────────┐      │              │
//!   ◀────────────────┼──│response │◀───│ negotiation +    │◀─────┘              │
//!                    │  │ (text,  │    │ mapper context   │                     │
//!                    │  │  jsonp) │    └──────────────────┘                     │
//!                    │  └─────────┘                                              │
//!                    │  ┌─────────────────────────────────────────────────────┐ │
//!                    │  │ config │ observability │ lifecycle (startup/shutdown)│ │
//!                    │  └─────────────────────────────────────────────────────┘ │
//!                    └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Presenters are application code. The stock binary answers every route
//! with [`EchoPresenter`], which is enough to exercise route configuration.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use restful_api::application::{EchoPresenter, PresenterRegistry};
use restful_api::config::{load_config, AppConfig};
use restful_api::lifecycle::{build_pipeline, signals, Shutdown};
use restful_api::observability::{logging, metrics};
use restful_api::HttpServer;

#[derive(Parser)]
#[command(name = "restful-api")]
#[command(about = "REST API server with resource routing and content negotiation", long_about = None)]
struct Args {
    /// Path to the TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability);
    tracing::info!("restful-api v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        strict_prefix = ?config.routing.strict_prefix,
        resources = config.routing.resources.len(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let presenters = PresenterRegistry::new().with_fallback(Arc::new(EchoPresenter));
    let pipeline = Arc::new(build_pipeline(&config, presenters)?);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    let grace = std::time::Duration::from_secs(config.timeouts.shutdown_secs);
    let stopping = shutdown.clone();
    let server = HttpServer::new(config, pipeline);
    let serve = server.run(listener, shutdown);
    tokio::pin!(serve);

    tokio::select! {
        result = &mut serve => result?,
        _ = stopping.wait() => {
            match tokio::time::timeout(grace, &mut serve).await {
                Ok(result) => result?,
                Err(_) => tracing::warn!(grace_secs = grace.as_secs(), "Shutdown deadline passed, exiting"),
            }
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
