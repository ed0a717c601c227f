// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `loomworkd`: binds `ServerConfig` to a running HTTP server. Loads
//! config, sets up logging, scans for crash-recovered state, spawns
//! background tasks, then serves on an axum listener until shutdown,
//! with a periodic outbox-poller task running alongside it.

use clap::Parser;
use lw_core::clock::{Clock, SystemClock};
use lw_server::config::{CliArgs, ServerConfig};
use lw_server::{poller, routes, state};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliArgs::parse();
    let config = ServerConfig::load(&cli.config)?.apply_cli(&cli);

    let _log_guard = setup_logging(&config);

    info!(bind_addr = %config.bind_addr, "starting loomworkd");

    let stale_after_ms = config.round_timeout_ms;
    let now_ms = SystemClock.now_ms();
    match lw_storage::recover_stale_jobs(&config.session_store_root, now_ms, stale_after_ms) {
        Ok(0) => {}
        Ok(n) => info!(reverted = n, "recovered stale in-flight jobs to pending"),
        Err(err) => tracing::warn!(error = %err, "crash recovery scan failed"),
    }

    let bind_addr = config.bind_addr.clone();
    let rt = tokio::runtime::Handle::current();
    let app_state = state::build_state(config, rt)?;

    poller::spawn(app_state.clone());

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(bind_addr = %bind_addr, "listening");

    let router = routes::build_router(app_state);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("loomworkd stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        #[allow(clippy::expect_used)]
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}

/// Logs to `config.log_path` if set, otherwise stderr. Both paths use
/// the env-filter-configurable `tracing_subscriber` pipeline.
fn setup_logging(config: &ServerConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match &config.log_path {
        Some(path) => {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
            let file_name = path.file_name().unwrap_or_else(|| std::ffi::OsStr::new("loomworkd.log"));
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(non_blocking))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry().with(filter).with(fmt::layer()).init();
            None
        }
    }
}
