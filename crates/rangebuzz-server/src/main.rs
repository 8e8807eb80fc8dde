//! # `rangebuzz-server`
//!
//! HTTP front end for [`rangebuzz`].
//!
//! ## Highlights
//! - **Single endpoint**: `GET /range-fizzbuzz?from=<int>&to=<int>`.
//! - **Bounded work**: a shared permit pool caps concurrent element tasks.
//! - **Per-request deadline**: slow tails degrade to empty slots.
//! - **Graceful shutdown**: Ctrl+C or SIGTERM stops accepting connections and
//!   gives in-flight requests a bounded grace period.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin rangebuzz-server --release
//! curl 'http://127.0.0.1:3000/range-fizzbuzz?from=1&to=15'
//! ```

mod server;

use clap::Parser;
use server::config::{CliArgs, ServerConfig};
use server::service::handler::RangeService;
use server::telemetry::init_telemetry;
use tokio::{net::TcpListener, signal, time::timeout};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = ServerConfig::try_from(args)?;

    let providers = init_telemetry()?;
    let res = run_server(config).await;
    providers.shutdown();
    res
}

fn log_startup_info(addr: &str, config: &ServerConfig) {
    if cfg!(debug_assertions) {
        tracing::info!(
            "Starting range service on {} with full config: {:#?}",
            addr,
            config
        );
    } else {
        tracing::info!(
            "Starting range service on {} with {} permits and a {:?} deadline",
            addr,
            config.max_concurrency,
            config.request_timeout
        );
    }
}

async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&config.server_addr).await?;
    log_startup_info(&config.server_addr, &config);

    let service = RangeService::new(config);
    let grace = service.config().shutdown_grace;

    let serve = axum::serve(listener, service.router())
        .with_graceful_shutdown(service.shutdown_token().cancelled_owned());
    let mut server = tokio::spawn(async move { serve.await });

    tokio::select! {
        res = &mut server => {
            // The listener stopped on its own before any signal.
            res??;
            return Ok(());
        }
        () = shutdown_signal() => {},
    }

    tracing::info!("Shutdown signal received, terminating gracefully...");
    service.shutdown();

    match timeout(grace, &mut server).await {
        Ok(res) => {
            res??;
            tracing::info!("Service shut down successfully");
            Ok(())
        }
        Err(_) => {
            service.abort();
            server.abort();
            anyhow::bail!(
                "Server forced to shutdown: grace period of {:?} elapsed with {} requests in flight",
                grace,
                service.inflight()
            )
        }
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM signal");
        },
    }
}
