// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Logging middleware for stores.

use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, error};

use fanout_core::error::FanoutError;
use fanout_core::traits::store::{Entity, SharedStore, Store};

/// Wraps a store and emits one structured line per operation.
pub struct LoggingStore<T: Entity> {
    inner: SharedStore<T>,
}

impl<T: Entity> LoggingStore<T> {
    pub fn new(inner: SharedStore<T>) -> Self {
        LoggingStore { inner }
    }
}

fn log<V>(kind: &str, op: &str, namespace: &str, start: Instant, res: &Result<V, FanoutError>) {
    let elapsed = start.elapsed();

    match res {
        Ok(_) => debug!(kind, op, namespace, ?elapsed, "store op"),
        Err(err) => error!(kind, op, namespace, ?elapsed, %err, "store op failed"),
    }
}

#[async_trait]
impl<T: Entity> Store<T> for LoggingStore<T> {
    async fn put(&self, namespace: &str, entity: T) -> Result<T, FanoutError> {
        let start = Instant::now();
        let res = self.inner.put(namespace, entity).await;
        log(T::KIND, "put", namespace, start, &res);
        res
    }

    async fn query(&self, namespace: &str, opts: T::QueryOptions) -> Result<Vec<T>, FanoutError> {
        let start = Instant::now();
        let res = self.inner.query(namespace, opts).await;
        log(T::KIND, "query", namespace, start, &res);
        res
    }

    async fn count(&self, namespace: &str, opts: T::QueryOptions) -> Result<usize, FanoutError> {
        let start = Instant::now();
        let res = self.inner.count(namespace, opts).await;
        log(T::KIND, "count", namespace, start, &res);
        res
    }

    async fn setup(&self, namespace: &str) -> Result<(), FanoutError> {
        let start = Instant::now();
        let res = self.inner.setup(namespace).await;
        log(T::KIND, "setup", namespace, start, &res);
        res
    }

    async fn teardown(&self, namespace: &str) -> Result<(), FanoutError> {
        let start = Instant::now();
        let res = self.inner.teardown(namespace).await;
        log(T::KIND, "teardown", namespace, start, &res);
        res
    }
}
