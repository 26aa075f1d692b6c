// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{debug, error, info};
use unbound_webhook::{
    constants::TOKIO_WORKER_THREADS, webhook, Config, OpnsenseClient, UnboundProvider,
};

fn main() -> Result<()> {
    let config = Config::parse();

    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("unbound-webhook")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(config))
}

async fn async_main(config: Config) -> Result<()> {
    init_tracing();

    info!("Starting Unbound webhook for external-dns");
    debug!("Configuration: {config:?}");

    let client = OpnsenseClient::new(&config.opnsense()).context("Failed to create OPNsense client")?;
    info!("OPNsense API at {}", client.base_url());

    let ingress_classes = config.ingress_classes();
    info!("Loaded {} ingress class mapping(s)", ingress_classes.len());

    let domain_filter = config.domain_filter();
    info!(
        include = ?domain_filter.include,
        exclude = ?domain_filter.exclude,
        "Domain filter configured"
    );

    let provider = Arc::new(UnboundProvider::new(
        Arc::new(client),
        domain_filter,
        ingress_classes,
    ));

    let webhook_listener = TcpListener::bind(config.webhook_addr)
        .await
        .with_context(|| format!("Failed to bind webhook listener on {}", config.webhook_addr))?;
    let health_listener = TcpListener::bind(config.health_addr)
        .await
        .with_context(|| format!("Failed to bind health listener on {}", config.health_addr))?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let webhook_server = webhook::serve(
        webhook_listener,
        webhook::router(provider),
        wait_for_shutdown(shutdown_rx.clone()),
    );
    let health_server = webhook::serve(
        health_listener,
        webhook::health_router(),
        wait_for_shutdown(shutdown_rx),
    );
    let mut servers =
        tokio::spawn(async move { tokio::try_join!(webhook_server, health_server) });

    // Servers should never exit on their own - if one does, exit the main process
    let signal = tokio::select! {
        result = shutdown_signal() => result,
        result = &mut servers => {
            error!("CRITICAL: HTTP servers exited unexpectedly: {:?}", result);
            result.context("HTTP server task panicked")?.context("HTTP server failed")?;
            anyhow::bail!("HTTP servers exited unexpectedly without error")
        }
    };
    signal?;

    info!("Stopping HTTP servers...");
    shutdown_tx.send_replace(true);
    servers
        .await
        .context("HTTP server task panicked")?
        .context("HTTP server failed during shutdown")?;

    info!("Shutdown complete");
    Ok(())
}

/// Initialize logging.
///
/// Respects `RUST_LOG` if set, otherwise defaults to INFO level.
/// `RUST_LOG_FORMAT=json` switches to JSON output.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

/// Resolve once SIGINT or SIGTERM is received.
async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm =
            signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;

        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.context("Failed to listen for SIGINT")?;
                info!("Received SIGINT, initiating graceful shutdown...");
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM (pod termination), initiating graceful shutdown...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for SIGINT")?;
        info!("Received SIGINT, initiating graceful shutdown...");
    }

    Ok(())
}

/// Resolve once `true` is sent on the shutdown channel or the sender is dropped.
async fn wait_for_shutdown(mut shutdown: watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stopping| *stopping).await;
}
