// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telemetry HTTP server built on axum.
//!
//! Serves unauthenticated /health and /metrics for systemd and Prometheus.

use std::sync::Arc;

use axum::{Router, extract::State, routing::get};

use fanout_core::error::FanoutError;

use crate::PrometheusAdapter;

/// Builds the telemetry router.
pub fn router(adapter: Arc<PrometheusAdapter>) -> Router {
    Router::new()
        .route("/health", get(get_health))
        .route("/metrics", get(get_metrics))
        .with_state(adapter)
}

/// Serves the telemetry endpoint until the process exits.
pub async fn serve(addr: &str, adapter: Arc<PrometheusAdapter>) -> Result<(), FanoutError> {
    let addr = bind_addr(addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| FanoutError::Internal(format!("failed to bind telemetry to {addr}: {e}")))?;

    tracing::info!("telemetry server listening on {addr}");

    axum::serve(listener, router(adapter))
        .await
        .map_err(|e| FanoutError::Internal(format!("telemetry server error: {e}")))
}

/// Accepts the `:port` shorthand by binding all interfaces.
fn bind_addr(addr: &str) -> String {
    if addr.starts_with(':') {
        format!("0.0.0.0{addr}")
    } else {
        addr.to_owned()
    }
}

async fn get_health() -> &'static str {
    "ok"
}

async fn get_metrics(State(adapter): State<Arc<PrometheusAdapter>>) -> String {
    adapter.render()
}
