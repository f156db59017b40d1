// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! State-change source contract bridging durable queues into the pipeline.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::FanoutError;

/// One observed state transition of an entity.
///
/// `old == None` denotes creation. `new == None` is reserved for deletions;
/// the pipeline treats such changes as no-ops today. The change is owned by
/// its source until [`Acker::ack`] is called with `ack_id`.
#[derive(Debug, Clone)]
pub struct StateChange<T> {
    /// Receipt handle used to permanently remove the message.
    pub ack_id: String,
    /// Queue-assigned message id.
    pub id: String,
    /// Tenant namespace the change belongs to.
    pub namespace: String,
    pub new: Option<T>,
    pub old: Option<T>,
    /// Producer-side send time, carried as a message attribute.
    pub sent_at: DateTime<Utc>,
}

/// Permanently removes a workload from its source.
#[async_trait]
pub trait Acker: Send + Sync {
    /// Idempotent from the caller's perspective; acking an id that is no
    /// longer outstanding is not an error.
    async fn ack(&self, ack_id: &str) -> Result<(), FanoutError>;
}

/// At-least-once state-change stream for one entity kind.
#[async_trait]
pub trait Source<T>: Acker {
    /// Long-polls the queue for the next change. Returns
    /// [`FanoutError::EmptySource`] when the poll window closed empty, which
    /// callers treat as "retry immediately".
    async fn consume(&self) -> Result<StateChange<T>, FanoutError>;

    /// Writes a new state change to the queue and returns its message id.
    async fn propagate(
        &self,
        namespace: &str,
        old: Option<&T>,
        new: Option<&T>,
    ) -> Result<String, FanoutError>;
}

/// Shared handle to a source.
pub type SharedSource<T> = std::sync::Arc<dyn Source<T>>;
