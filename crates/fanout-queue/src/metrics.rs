// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metrics middleware for sources. Besides the usual op counters, consume
//! records how long a change sat in the queue before being picked up.

use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use metrics::{counter, histogram};

use fanout_core::error::FanoutError;
use fanout_core::traits::source::{Acker, SharedSource, Source, StateChange};
use fanout_core::traits::store::Entity;

const OP_COUNT: &str = "source_op_count";
const OP_ERRORS: &str = "source_op_errors";
const OP_LATENCY_SECONDS: &str = "source_op_latency_seconds";
const QUEUE_LATENCY_SECONDS: &str = "source_queue_latency_seconds";

/// Wraps a source and records operation counts, errors, and latencies.
pub struct InstrumentedSource<T: Entity> {
    inner: SharedSource<T>,
}

impl<T: Entity> InstrumentedSource<T> {
    pub fn new(inner: SharedSource<T>) -> Self {
        InstrumentedSource { inner }
    }
}

fn record<V>(kind: &'static str, op: &'static str, start: Instant, res: &Result<V, FanoutError>) {
    counter!(OP_COUNT, "kind" => kind, "op" => op).increment(1);
    // An empty poll window is the steady state, not an error.
    if res.as_ref().err().is_some_and(|e| !e.is_empty_source()) {
        counter!(OP_ERRORS, "kind" => kind, "op" => op).increment(1);
    }
    histogram!(OP_LATENCY_SECONDS, "kind" => kind, "op" => op)
        .record(start.elapsed().as_secs_f64());
}

#[async_trait]
impl<T: Entity> Acker for InstrumentedSource<T> {
    async fn ack(&self, ack_id: &str) -> Result<(), FanoutError> {
        let start = Instant::now();
        let res = self.inner.ack(ack_id).await;
        record(T::KIND, "ack", start, &res);
        res
    }
}

#[async_trait]
impl<T: Entity> Source<T> for InstrumentedSource<T> {
    async fn consume(&self) -> Result<StateChange<T>, FanoutError> {
        let start = Instant::now();
        let res = self.inner.consume().await;
        record(T::KIND, "consume", start, &res);

        if let Ok(change) = &res {
            let queued = (Utc::now() - change.sent_at)
                .to_std()
                .unwrap_or_default()
                .as_secs_f64();
            histogram!(QUEUE_LATENCY_SECONDS, "kind" => T::KIND).record(queued);
        }
        res
    }

    async fn propagate(
        &self,
        namespace: &str,
        old: Option<&T>,
        new: Option<&T>,
    ) -> Result<String, FanoutError> {
        let start = Instant::now();
        let res = self.inner.propagate(namespace, old, new).await;
        record(T::KIND, "propagate", start, &res);
        res
    }
}
