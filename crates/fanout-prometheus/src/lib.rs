// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prometheus metrics exporter for the fanout worker.
//!
//! Uses the metrics-rs facade with the Prometheus exporter. The store and
//! source middleware record through the facade; this crate installs the
//! recorder and renders the text format on the telemetry endpoint.

pub mod recording;
pub mod server;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use fanout_core::error::FanoutError;

pub use server::serve;

/// Prometheus metrics adapter.
///
/// Installs the Prometheus recorder and exposes a handle for rendering
/// metrics in Prometheus text format.
pub struct PrometheusAdapter {
    handle: PrometheusHandle,
}

impl PrometheusAdapter {
    /// Installs the Prometheus recorder globally. Only one recorder can be
    /// installed per process. Returns an error if a recorder is already
    /// installed.
    pub fn new() -> Result<Self, FanoutError> {
        let handle = PrometheusBuilder::new().install_recorder().map_err(|e| {
            FanoutError::Internal(format!("failed to install Prometheus recorder: {e}"))
        })?;

        recording::register_metrics();

        tracing::info!("prometheus metrics recorder installed");

        Ok(Self { handle })
    }

    /// Get a reference to the Prometheus handle for rendering.
    pub fn handle(&self) -> &PrometheusHandle {
        &self.handle
    }

    /// Render all collected metrics in Prometheus text format.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}
