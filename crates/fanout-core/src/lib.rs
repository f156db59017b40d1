// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core domain model for the notification fanout pipeline.
//!
//! Everything shared across the workspace lives here: the entities, the
//! capability traits the pipeline is assembled from, the error type, and the
//! id and namespace helpers.

pub mod error;
pub mod flake;
pub mod namespace;
pub mod traits;
pub mod types;

pub use error::FanoutError;
pub use traits::{
    Acker, Channel, Endpoint, Entity, Message, PushProvider, SharedChannel, SharedPushProvider,
    SharedSource, SharedStore, Source, StateChange, Store,
};
pub use types::Ecosystem;
