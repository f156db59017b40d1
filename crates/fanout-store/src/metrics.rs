// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metrics middleware for stores.

use std::time::Instant;

use async_trait::async_trait;
use metrics::{counter, histogram};

use fanout_core::error::FanoutError;
use fanout_core::traits::store::{Entity, SharedStore, Store};

const OP_COUNT: &str = "store_op_count";
const OP_ERRORS: &str = "store_op_errors";
const OP_LATENCY_SECONDS: &str = "store_op_latency_seconds";

/// Wraps a store and records operation counts, errors, and latency.
pub struct InstrumentedStore<T: Entity> {
    inner: SharedStore<T>,
}

impl<T: Entity> InstrumentedStore<T> {
    pub fn new(inner: SharedStore<T>) -> Self {
        InstrumentedStore { inner }
    }
}

fn record<V>(kind: &'static str, op: &'static str, start: Instant, res: &Result<V, FanoutError>) {
    counter!(OP_COUNT, "kind" => kind, "op" => op).increment(1);
    if res.is_err() {
        counter!(OP_ERRORS, "kind" => kind, "op" => op).increment(1);
    }
    histogram!(OP_LATENCY_SECONDS, "kind" => kind, "op" => op)
        .record(start.elapsed().as_secs_f64());
}

#[async_trait]
impl<T: Entity> Store<T> for InstrumentedStore<T> {
    async fn put(&self, namespace: &str, entity: T) -> Result<T, FanoutError> {
        let start = Instant::now();
        let res = self.inner.put(namespace, entity).await;
        record(T::KIND, "put", start, &res);
        res
    }

    async fn query(&self, namespace: &str, opts: T::QueryOptions) -> Result<Vec<T>, FanoutError> {
        let start = Instant::now();
        let res = self.inner.query(namespace, opts).await;
        record(T::KIND, "query", start, &res);
        res
    }

    async fn count(&self, namespace: &str, opts: T::QueryOptions) -> Result<usize, FanoutError> {
        let start = Instant::now();
        let res = self.inner.count(namespace, opts).await;
        record(T::KIND, "count", start, &res);
        res
    }

    async fn setup(&self, namespace: &str) -> Result<(), FanoutError> {
        let start = Instant::now();
        let res = self.inner.setup(namespace).await;
        record(T::KIND, "setup", start, &res);
        res
    }

    async fn teardown(&self, namespace: &str) -> Result<(), FanoutError> {
        let start = Instant::now();
        let res = self.inner.teardown(namespace).await;
        record(T::KIND, "teardown", start, &res);
        res
    }
}
