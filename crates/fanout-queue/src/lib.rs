// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Queue sources and the state-change wire codec.
//!
//! [`MemorySource`] is the durable transport used in development and tests;
//! the middleware in [`logging`] and [`metrics`] wraps any
//! [`fanout_core::Source`]. [`stack`] assembles the production composition.

use std::sync::Arc;

use fanout_core::traits::source::SharedSource;
use fanout_core::traits::store::Entity;

pub mod logging;
pub mod memory;
pub mod metrics;
pub mod raw;
pub mod wire;

pub use logging::LoggingSource;
pub use memory::{DEFAULT_VISIBILITY, DEFAULT_WAIT, MemorySource};
pub use metrics::InstrumentedSource;
pub use raw::{MemoryRawSource, RawMessage, RawSource, SharedRawSource};

/// Wraps a transport with the production middleware stack: metrics first,
/// logging outermost.
pub fn stack<T: Entity>(transport: SharedSource<T>) -> SharedSource<T> {
    let instrumented = Arc::new(InstrumentedSource::new(transport));
    Arc::new(LoggingSource::new(instrumented))
}
