// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory durable queue with visibility-timeout semantics.
//!
//! Delivery is at-least-once: a pulled message stays invisible for the
//! visibility window and returns to the ready queue if it is not acked in
//! time. [`MemorySource`] layers the state-change wire codec on top.

use std::collections::{HashMap, VecDeque};
use std::marker::PhantomData;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::{Mutex, Notify};
use uuid::Uuid;

use fanout_core::error::FanoutError;
use fanout_core::traits::source::{Acker, Source, StateChange};

use crate::wire::{self, Envelope};

pub const DEFAULT_WAIT: Duration = Duration::from_secs(10);
pub const DEFAULT_VISIBILITY: Duration = Duration::from_secs(60);

/// One queued message body plus its attributes.
#[derive(Debug, Clone)]
pub(crate) struct QueuedMessage {
    pub id: String,
    pub body: String,
    pub sent_at: String,
}

#[derive(Debug)]
struct Inflight {
    message: QueuedMessage,
    visible_at: Instant,
}

#[derive(Debug, Default)]
struct Inner {
    ready: VecDeque<QueuedMessage>,
    inflight: HashMap<String, Inflight>,
}

impl Inner {
    /// Moves inflight messages whose visibility window elapsed back to the
    /// front of the ready queue.
    fn redeliver(&mut self, now: Instant) {
        let expired: Vec<String> = self
            .inflight
            .iter()
            .filter(|(_, i)| i.visible_at <= now)
            .map(|(ack_id, _)| ack_id.clone())
            .collect();

        for ack_id in expired {
            if let Some(inflight) = self.inflight.remove(&ack_id) {
                self.ready.push_front(inflight.message);
            }
        }
    }
}

/// The transport shared by the typed and the raw source.
pub(crate) struct DurableQueue {
    inner: Mutex<Inner>,
    notify: Notify,
    wait: Duration,
    visibility: Duration,
}

impl DurableQueue {
    pub(crate) fn new(wait: Duration, visibility: Duration) -> Self {
        DurableQueue {
            inner: Mutex::new(Inner::default()),
            notify: Notify::new(),
            wait,
            visibility,
        }
    }

    pub(crate) async fn push(&self, body: String, sent_at: String) -> String {
        let id = Uuid::new_v4().to_string();
        {
            let mut inner = self.inner.lock().await;
            inner.ready.push_back(QueuedMessage {
                id: id.clone(),
                body,
                sent_at,
            });
        }
        self.notify.notify_one();
        id
    }

    /// Pulls the next visible message, long-polling up to the wait window.
    /// Returns the receipt handle alongside the message.
    pub(crate) async fn pull(&self) -> Option<(String, QueuedMessage)> {
        let deadline = Instant::now() + self.wait;

        loop {
            {
                let mut inner = self.inner.lock().await;
                let now = Instant::now();
                inner.redeliver(now);

                if let Some(message) = inner.ready.pop_front() {
                    let ack_id = Uuid::new_v4().to_string();
                    inner.inflight.insert(
                        ack_id.clone(),
                        Inflight {
                            message: message.clone(),
                            visible_at: now + self.visibility,
                        },
                    );
                    return Some((ack_id, message));
                }
            }

            let remaining = deadline.checked_duration_since(Instant::now())?;
            let _ = tokio::time::timeout(remaining, self.notify.notified()).await;
        }
    }

    pub(crate) async fn ack(&self, ack_id: &str) {
        let mut inner = self.inner.lock().await;
        // A stale receipt, redelivered in the meantime, is not an error.
        inner.inflight.remove(ack_id);
    }
}

/// Typed state-change source backed by [`DurableQueue`].
pub struct MemorySource<T> {
    queue: DurableQueue,
    _marker: PhantomData<fn() -> T>,
}

impl<T> MemorySource<T> {
    pub fn new(wait: Duration, visibility: Duration) -> Self {
        MemorySource {
            queue: DurableQueue::new(wait, visibility),
            _marker: PhantomData,
        }
    }
}

impl<T> Default for MemorySource<T> {
    fn default() -> Self {
        Self::new(DEFAULT_WAIT, DEFAULT_VISIBILITY)
    }
}

#[async_trait]
impl<T: Send + Sync> Acker for MemorySource<T> {
    async fn ack(&self, ack_id: &str) -> Result<(), FanoutError> {
        self.queue.ack(ack_id).await;
        Ok(())
    }
}

#[async_trait]
impl<T> Source<T> for MemorySource<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn consume(&self) -> Result<StateChange<T>, FanoutError> {
        let (ack_id, message) = self.queue.pull().await.ok_or(FanoutError::EmptySource)?;

        let envelope: Envelope<T> = wire::decode_body(&message.body)?;
        let sent_at = wire::parse_sent_at(&message.sent_at)?;

        Ok(StateChange {
            ack_id,
            id: message.id,
            namespace: envelope.namespace,
            new: envelope.new,
            old: envelope.old,
            sent_at,
        })
    }

    async fn propagate(
        &self,
        namespace: &str,
        old: Option<&T>,
        new: Option<&T>,
    ) -> Result<String, FanoutError> {
        let body = wire::encode_body(namespace, old, new)?;
        let sent_at = wire::format_sent_at(Utc::now());

        Ok(self.queue.push(body, sent_at).await)
    }
}
