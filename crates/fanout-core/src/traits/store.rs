// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generic persistence contract for tenant-scoped entities.
//!
//! Every entity kind exposes the same five operations. Backends are generic
//! over [`Entity`], which keeps middleware (logging, metrics, self-healing
//! setup) to a single decorator per concern instead of one per entity.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::FanoutError;

/// A tenant-scoped entity kind the pipeline persists and queries.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Filter options understood by [`Entity::matches`] and store queries.
    /// The same option set doubles as the persisted rule criteria shape.
    type QueryOptions: Clone + Default + Send + Sync + 'static;

    /// Singular kind name, used in errors and telemetry labels.
    const KIND: &'static str;

    /// Plural suffix for the per-namespace flake id generator.
    const FLAKE_KIND: &'static str;

    /// Whether the entity carries a store-assigned 64-bit id. Connections
    /// are identified by `(from, to, type)` instead.
    const HAS_ID: bool = true;

    fn id(&self) -> u64;

    fn set_id(&mut self, id: u64);

    /// Updates the entity's timestamps on write.
    fn touch(&mut self, now: DateTime<Utc>, new_record: bool);

    /// Semantic validation, run by stores before anything is persisted.
    fn validate(&self) -> Result<(), FanoutError>;

    /// Whether this entity satisfies the given filter options.
    fn matches(&self, opts: &Self::QueryOptions) -> bool;

    /// Whether `other` refers to the same stored record, for upserts.
    fn same_record(&self, other: &Self) -> bool {
        Self::HAS_ID && self.id() != 0 && self.id() == other.id()
    }
}

/// Uniform store capability for one entity kind.
#[async_trait]
pub trait Store<T: Entity>: Send + Sync {
    /// Upserts the entity; assigns a flake id when the id is zero. Validates
    /// before persisting and returns the stored snapshot.
    async fn put(&self, namespace: &str, entity: T) -> Result<T, FanoutError>;

    /// Returns all entities matching the options.
    async fn query(&self, namespace: &str, opts: T::QueryOptions) -> Result<Vec<T>, FanoutError>;

    /// Returns the number of entities matching the options.
    async fn count(&self, namespace: &str, opts: T::QueryOptions) -> Result<usize, FanoutError>;

    /// Idempotently provisions storage for the namespace.
    async fn setup(&self, namespace: &str) -> Result<(), FanoutError>;

    /// Idempotently destroys storage for the namespace.
    async fn teardown(&self, namespace: &str) -> Result<(), FanoutError>;
}

/// Shared handle to a store, the shape constructors take.
pub type SharedStore<T> = std::sync::Arc<dyn Store<T>>;
