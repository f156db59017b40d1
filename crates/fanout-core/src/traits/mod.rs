// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability traits the pipeline is wired from.
//!
//! Each concern is a small interface injected through constructors, so tests
//! can swap in mocks without touching the pipeline code.

pub mod channel;
pub mod push;
pub mod source;
pub mod store;

pub use channel::{Channel, Message, SharedChannel};
pub use push::{Endpoint, PushProvider, SharedPushProvider};
pub use source::{Acker, SharedSource, Source, StateChange};
pub use store::{Entity, SharedStore, Store};
