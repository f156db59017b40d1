// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory store backend.
//!
//! Namespaces must be provisioned with [`Store::setup`] before use; reads and
//! writes against an unknown namespace fail with `RelationNotFound`, which
//! the prepared middleware turns into on-demand provisioning.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use fanout_core::error::FanoutError;
use fanout_core::flake;
use fanout_core::traits::store::{Entity, Store};

/// Map-backed store, one bucket per namespace.
pub struct MemStore<T> {
    buckets: RwLock<HashMap<String, Vec<T>>>,
}

impl<T> MemStore<T> {
    pub fn new() -> Self {
        MemStore {
            buckets: RwLock::new(HashMap::new()),
        }
    }
}

impl<T> Default for MemStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Entity> Store<T> for MemStore<T> {
    async fn put(&self, namespace: &str, mut entity: T) -> Result<T, FanoutError> {
        entity.validate()?;

        let mut buckets = self.buckets.write().await;
        let bucket = buckets
            .get_mut(namespace)
            .ok_or_else(|| FanoutError::RelationNotFound {
                namespace: namespace.to_owned(),
            })?;

        let now = Utc::now();

        if T::HAS_ID && entity.id() == 0 {
            let id = flake::next_id(&flake::namespace(namespace, T::FLAKE_KIND))?;
            entity.set_id(id);
            entity.touch(now, true);
            bucket.push(entity.clone());
            return Ok(entity);
        }

        match bucket.iter().position(|e| e.same_record(&entity)) {
            Some(pos) => {
                entity.touch(now, false);
                bucket[pos] = entity.clone();
            }
            None => {
                entity.touch(now, true);
                bucket.push(entity.clone());
            }
        }

        Ok(entity)
    }

    async fn query(&self, namespace: &str, opts: T::QueryOptions) -> Result<Vec<T>, FanoutError> {
        let buckets = self.buckets.read().await;
        let bucket = buckets
            .get(namespace)
            .ok_or_else(|| FanoutError::RelationNotFound {
                namespace: namespace.to_owned(),
            })?;

        Ok(bucket
            .iter()
            .filter(|e| e.matches(&opts))
            .cloned()
            .collect())
    }

    async fn count(&self, namespace: &str, opts: T::QueryOptions) -> Result<usize, FanoutError> {
        let buckets = self.buckets.read().await;
        let bucket = buckets
            .get(namespace)
            .ok_or_else(|| FanoutError::RelationNotFound {
                namespace: namespace.to_owned(),
            })?;

        Ok(bucket.iter().filter(|e| e.matches(&opts)).count())
    }

    async fn setup(&self, namespace: &str) -> Result<(), FanoutError> {
        let mut buckets = self.buckets.write().await;
        buckets.entry(namespace.to_owned()).or_default();
        Ok(())
    }

    async fn teardown(&self, namespace: &str) -> Result<(), FanoutError> {
        let mut buckets = self.buckets.write().await;
        buckets.remove(namespace);
        Ok(())
    }
}
