// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process shutdown wiring.
//!
//! The worker stops on SIGINT or SIGTERM. Cancellation fans out through a
//! [`CancellationToken`]: consumer loops stop pulling, in-flight batches
//! drain, and unacked changes come back after their visibility timeout.

use tokio_util::sync::CancellationToken;
use tracing::info;

/// Returns a token that is cancelled on the first SIGINT or SIGTERM.
pub fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let signalled = token.clone();

    tokio::spawn(async move {
        let name = shutdown_signal().await;
        info!(signal = name, "shutting down");
        signalled.cancel();
    });

    token
}

#[cfg(unix)]
async fn shutdown_signal() -> &'static str {
    use tokio::signal::unix::{SignalKind, signal};

    let Ok(mut term) = signal(SignalKind::terminate()) else {
        // No SIGTERM stream; Ctrl+C alone still stops the worker.
        let _ = tokio::signal::ctrl_c().await;
        return "SIGINT";
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => "SIGINT",
        _ = term.recv() => "SIGTERM",
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> &'static str {
    let _ = tokio::signal::ctrl_c().await;
    "ctrl-c"
}
