// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration.
//!
//! The store and source middleware record through the metrics-rs facade so
//! any recorder (Prometheus, statsd, etc.) can collect these metrics.

use metrics::{describe_counter, describe_histogram};

/// Register all metric descriptions.
///
/// Called once at startup after the recorder is installed.
pub fn register_metrics() {
    describe_counter!("store_op_count", "Store operations performed");
    describe_counter!("store_op_errors", "Store operations that failed");
    describe_histogram!(
        "store_op_latency_seconds",
        "Store operation latency in seconds"
    );
    describe_counter!("source_op_count", "Source operations performed");
    describe_counter!("source_op_errors", "Source operations that failed");
    describe_histogram!(
        "source_op_latency_seconds",
        "Source operation latency in seconds"
    );
    describe_histogram!(
        "source_queue_latency_seconds",
        "Time a state change spent queued before consumption"
    );
}
