// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Raw message source for the push-service feedback queue.
//!
//! Endpoint state callbacks arrive as opaque JSON envelopes written by the
//! push service, so this source hands bodies through undecoded.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use fanout_core::error::FanoutError;
use fanout_core::traits::source::Acker;

use crate::memory::{DEFAULT_VISIBILITY, DEFAULT_WAIT, DurableQueue};
use crate::wire;

/// One undecoded message.
#[derive(Debug, Clone)]
pub struct RawMessage {
    pub ack_id: String,
    pub id: String,
    pub body: String,
}

/// At-least-once stream of opaque message bodies.
#[async_trait]
pub trait RawSource: Acker {
    /// Long-polls for the next message. Returns
    /// [`FanoutError::EmptySource`] when the poll window closed empty.
    async fn consume(&self) -> Result<RawMessage, FanoutError>;

    /// Writes a body to the queue and returns its message id.
    async fn publish(&self, body: &str) -> Result<String, FanoutError>;
}

/// Shared handle to a raw source.
pub type SharedRawSource = Arc<dyn RawSource>;

/// In-memory raw source with visibility-timeout redelivery.
pub struct MemoryRawSource {
    queue: DurableQueue,
}

impl MemoryRawSource {
    pub fn new(wait: Duration, visibility: Duration) -> Self {
        MemoryRawSource {
            queue: DurableQueue::new(wait, visibility),
        }
    }
}

impl Default for MemoryRawSource {
    fn default() -> Self {
        Self::new(DEFAULT_WAIT, DEFAULT_VISIBILITY)
    }
}

#[async_trait]
impl Acker for MemoryRawSource {
    async fn ack(&self, ack_id: &str) -> Result<(), FanoutError> {
        self.queue.ack(ack_id).await;
        Ok(())
    }
}

#[async_trait]
impl RawSource for MemoryRawSource {
    async fn consume(&self) -> Result<RawMessage, FanoutError> {
        let (ack_id, message) = self.queue.pull().await.ok_or(FanoutError::EmptySource)?;

        Ok(RawMessage {
            ack_id,
            id: message.id,
            body: message.body,
        })
    }

    async fn publish(&self, body: &str) -> Result<String, FanoutError> {
        let sent_at = wire::format_sent_at(Utc::now());
        Ok(self.queue.push(body.to_owned(), sent_at).await)
    }
}
