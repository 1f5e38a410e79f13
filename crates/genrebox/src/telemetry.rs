// SPDX-FileCopyrightText: 2026 Genrebox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prometheus recorder for the bot's counters and gauges.
//!
//! The recorder is installed once per process by `genrebox serve`. Its
//! snapshot is rendered in Prometheus text format and logged on shutdown.

use genrebox_core::GenreboxError;
use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Handle to the process-wide Prometheus recorder.
pub struct Telemetry {
    handle: PrometheusHandle,
}

impl Telemetry {
    /// Installs the Prometheus recorder globally.
    ///
    /// Fails if another recorder is already installed.
    pub fn install() -> Result<Self, GenreboxError> {
        let handle = PrometheusBuilder::new().install_recorder().map_err(|e| {
            GenreboxError::Internal(format!("failed to install Prometheus recorder: {e}"))
        })?;

        describe_metrics();
        tracing::info!("prometheus metrics recorder installed");

        Ok(Self { handle })
    }

    pub fn handle(&self) -> &PrometheusHandle {
        &self.handle
    }

    /// Renders every recorded metric in Prometheus text format.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Registers help text for every metric the bot records.
pub fn describe_metrics() {
    describe_counter!("genrebox_tracks_stored_total", "Audio uploads appended to the catalog");
    describe_counter!("genrebox_tracks_served_total", "Random tracks sent for retrieval commands");
    describe_counter!("genrebox_rejections_total", "Requests declined, by rejection kind");
    describe_counter!(
        "genrebox_queue_overflow_total",
        "Events buffered because a user's worker queue was full"
    );
    describe_gauge!("genrebox_active_workers", "Users with a running worker task");
    describe_gauge!("genrebox_memory_heap_bytes", "Bytes allocated by jemalloc");
    describe_gauge!("genrebox_memory_resident_bytes", "Resident bytes reported by jemalloc");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorded_metrics_render_with_help_text() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            describe_metrics();
            metrics::counter!("genrebox_tracks_stored_total").increment(2);
            metrics::counter!("genrebox_rejections_total", "kind" => "no_pending_session")
                .increment(1);
            metrics::gauge!("genrebox_active_workers").set(3.0);
        });

        let rendered = handle.render();
        assert!(rendered.contains("# TYPE genrebox_tracks_stored_total counter"));
        assert!(rendered.contains("# HELP genrebox_tracks_stored_total"));
        assert!(rendered.contains("genrebox_tracks_stored_total 2"));
        assert!(rendered.contains("genrebox_rejections_total{kind=\"no_pending_session\"} 1"));
        assert!(rendered.contains("genrebox_active_workers 3"));
    }

    #[test]
    fn nothing_recorded_renders_no_samples() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let rendered = recorder.handle().render();
        assert!(!rendered.contains("genrebox_tracks_stored_total"));
    }
}
