// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Logging middleware for sources. Empty poll windows are routine and only
//! logged at trace level.

use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, error, trace};

use fanout_core::error::FanoutError;
use fanout_core::traits::source::{Acker, SharedSource, Source, StateChange};
use fanout_core::traits::store::Entity;

/// Wraps a source and emits one structured line per operation.
pub struct LoggingSource<T: Entity> {
    inner: SharedSource<T>,
}

impl<T: Entity> LoggingSource<T> {
    pub fn new(inner: SharedSource<T>) -> Self {
        LoggingSource { inner }
    }
}

#[async_trait]
impl<T: Entity> Acker for LoggingSource<T> {
    async fn ack(&self, ack_id: &str) -> Result<(), FanoutError> {
        let start = Instant::now();
        let res = self.inner.ack(ack_id).await;
        let elapsed = start.elapsed();

        match &res {
            Ok(()) => debug!(kind = T::KIND, op = "ack", ?elapsed, "source op"),
            Err(err) => error!(kind = T::KIND, op = "ack", ?elapsed, %err, "source op failed"),
        }
        res
    }
}

#[async_trait]
impl<T: Entity> Source<T> for LoggingSource<T> {
    async fn consume(&self) -> Result<StateChange<T>, FanoutError> {
        let start = Instant::now();
        let res = self.inner.consume().await;
        let elapsed = start.elapsed();

        match &res {
            Ok(change) => debug!(
                kind = T::KIND,
                op = "consume",
                namespace = %change.namespace,
                id = %change.id,
                ?elapsed,
                "source op"
            ),
            Err(err) if err.is_empty_source() => {
                trace!(kind = T::KIND, op = "consume", ?elapsed, "source empty");
            }
            Err(err) => {
                error!(kind = T::KIND, op = "consume", ?elapsed, %err, "source op failed");
            }
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
        let elapsed = start.elapsed();

        match &res {
            Ok(id) => debug!(
                kind = T::KIND,
                op = "propagate",
                namespace,
                id = %id,
                ?elapsed,
                "source op"
            ),
            Err(err) => {
                error!(kind = T::KIND, op = "propagate", namespace, ?elapsed, %err, "source op failed");
            }
        }
        res
    }
}
