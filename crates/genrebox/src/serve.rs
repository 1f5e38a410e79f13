// SPDX-FileCopyrightText: 2026 Genrebox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `genrebox serve` command implementation.
//!
//! Wires the SQLite track catalog, the genre registry, the router and the
//! Telegram channel into a [`BotLoop`], then runs it until SIGTERM/SIGINT.
//! Metrics go to a Prometheus recorder whose snapshot is logged on shutdown.

use std::sync::Arc;
use std::time::Duration;

use genrebox_agent::BotLoop;
use genrebox_agent::shutdown;
use genrebox_config::model::GenreboxConfig;
use genrebox_core::{
    ChannelAdapter, GenreboxError, HealthStatus, PluginAdapter, StorageAdapter,
};
use genrebox_router::{GenreRegistry, Router};
use genrebox_storage::SqliteStorage;
use genrebox_telegram::TelegramChannel;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::telemetry::Telemetry;

/// How often allocator statistics are sampled and the recorder maintained.
const MEMORY_SAMPLE_INTERVAL: Duration = Duration::from_secs(60);

/// Run the `genrebox serve` command.
pub async fn run_serve(config: GenreboxConfig) -> Result<(), GenreboxError> {
    init_tracing(&config.bot.log_level);

    info!(bot_name = config.bot.name.as_str(), "starting genrebox serve");

    let telemetry = Telemetry::install()?;

    let registry = Arc::new(GenreRegistry::new(&config.genres)?);
    info!(commands = registry.len(), "genre registry loaded");

    let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
    storage.initialize().await?;
    info!(path = config.storage.database_path.as_str(), "track catalog ready");

    let mut telegram = match TelegramChannel::new(config.telegram.clone()) {
        Ok(channel) => channel,
        Err(e) => {
            storage.close().await?;
            return Err(e);
        }
    };
    if let Err(e) = telegram.connect().await {
        storage.close().await?;
        return Err(e);
    }
    match telegram.health_check().await {
        Ok(HealthStatus::Healthy) => info!("telegram channel connected"),
        Ok(status) => warn!(?status, "telegram channel reports degraded health"),
        Err(e) => warn!(error = %e, "telegram health check failed"),
    }
    let username = telegram.username().map(str::to_string);
    let channel: Arc<dyn ChannelAdapter> = Arc::new(telegram);

    let router = Arc::new(Router::new(registry, storage.clone()).with_username(username));
    let cancel = shutdown::install_signal_handler();

    let monitor = tokio::spawn(memory_monitor(
        cancel.child_token(),
        telemetry.handle().clone(),
    ));

    let bot = BotLoop::new(channel.clone(), router, storage, config.bot.clone());
    let result = bot.run(cancel.clone()).await;

    cancel.cancel();
    let _ = monitor.await;

    if let Err(e) = channel.shutdown().await {
        error!(error = %e, "telegram channel shutdown failed");
    }

    info!(snapshot = %telemetry.render(), "final metrics");
    info!("genrebox serve shutdown complete");
    result
}

/// Periodically logs and exports jemalloc heap statistics.
#[cfg(not(target_env = "msvc"))]
async fn memory_monitor(cancel: CancellationToken, recorder: PrometheusHandle) {
    let mut interval = tokio::time::interval(MEMORY_SAMPLE_INTERVAL);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                // Stats are cached until the epoch advances.
                let _ = tikv_jemalloc_ctl::epoch::advance();
                let allocated = tikv_jemalloc_ctl::stats::allocated::read().unwrap_or(0);
                let resident = tikv_jemalloc_ctl::stats::resident::read().unwrap_or(0);

                metrics::gauge!("genrebox_memory_heap_bytes").set(allocated as f64);
                metrics::gauge!("genrebox_memory_resident_bytes").set(resident as f64);
                tracing::debug!(allocated, resident, "allocator stats");
                recorder.run_upkeep();
            }
            _ = cancel.cancelled() => {
                tracing::debug!("memory monitor shutting down");
                break;
            }
        }
    }
}

/// Recorder upkeep only on MSVC (no jemalloc).
#[cfg(target_env = "msvc")]
async fn memory_monitor(cancel: CancellationToken, recorder: PrometheusHandle) {
    let mut interval = tokio::time::interval(MEMORY_SAMPLE_INTERVAL);
    loop {
        tokio::select! {
            _ = interval.tick() => recorder.run_upkeep(),
            _ = cancel.cancelled() => break,
        }
    }
}

/// Initializes the tracing subscriber with the given log level.
///
/// `RUST_LOG` takes precedence when set.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("genrebox={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
