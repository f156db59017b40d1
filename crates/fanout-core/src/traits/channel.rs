// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery channel contract for addressed messages.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::FanoutError;
use crate::types::app::App;

/// An addressed, localized notification produced by a pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// User id the message is addressed to.
    pub recipient: u64,
    /// Scheme-less deep-link path, prefixed with the platform scheme at
    /// send time.
    pub urn: String,
    /// Rendered message text per language.
    pub messages: HashMap<String, String>,
}

/// A delivery pathway for messages. Currently only push.
#[async_trait]
pub trait Channel: Send + Sync {
    async fn push(&self, app: &App, message: &Message) -> Result<(), FanoutError>;
}

/// Shared handle to a channel.
pub type SharedChannel = std::sync::Arc<dyn Channel>;
