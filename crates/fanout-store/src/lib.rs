// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store backends and middleware.
//!
//! Backends implement [`fanout_core::Store`] for any entity; middleware wraps
//! a shared store handle and adds one concern each. [`stack`] assembles the
//! production composition.

use std::sync::Arc;

use fanout_core::traits::store::{Entity, SharedStore};

pub mod logging;
pub mod mem;
pub mod metrics;
pub mod prepared;

pub use logging::LoggingStore;
pub use mem::MemStore;
pub use metrics::InstrumentedStore;
pub use prepared::PreparedStore;

/// Wraps a backend with the production middleware stack: self-healing setup
/// innermost, then metrics, logging outermost.
pub fn stack<T: Entity>(backend: SharedStore<T>) -> SharedStore<T> {
    let prepared = Arc::new(PreparedStore::new(backend));
    let instrumented = Arc::new(InstrumentedStore::new(prepared));
    Arc::new(LoggingStore::new(instrumented))
}
