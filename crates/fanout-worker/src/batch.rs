// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The unit of work flowing from consumer loops to the delivery stage.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use fanout_core::error::FanoutError;
use fanout_core::traits::channel::Message;
use fanout_core::traits::source::{Acker, SharedSource};
use fanout_core::types::app::App;

/// Adapts a typed source into a bare [`Acker`] handle for batches.
pub(crate) struct SourceAcker<T>(pub SharedSource<T>);

#[async_trait]
impl<T: Send + Sync + 'static> Acker for SourceAcker<T> {
    async fn ack(&self, ack_id: &str) -> Result<(), FanoutError> {
        self.0.ack(ack_id).await
    }
}

/// One state change's messages plus the ack that retires it.
///
/// `ack` memoizes success: once the source accepted the ack, further calls
/// are no-ops. A failed ack leaves the flag unset so the caller may retry.
pub struct Batch {
    pub app: App,
    pub messages: Vec<Message>,
    acker: Arc<dyn Acker>,
    ack_id: String,
    acked: AtomicBool,
}

impl Batch {
    pub fn new(app: App, messages: Vec<Message>, acker: Arc<dyn Acker>, ack_id: String) -> Self {
        Batch {
            app,
            messages,
            acker,
            ack_id,
            acked: AtomicBool::new(false),
        }
    }

    /// Retires the underlying state change. Once-only on success.
    pub async fn ack(&self) -> Result<(), FanoutError> {
        if self.acked.load(Ordering::Acquire) {
            return Ok(());
        }

        self.acker.ack(&self.ack_id).await?;
        self.acked.store(true, Ordering::Release);
        Ok(())
    }
}
