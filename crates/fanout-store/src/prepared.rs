// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Self-healing middleware: provisions a namespace on first use.
//!
//! State changes can arrive for apps the worker has never seen. Instead of
//! provisioning every namespace up front, the first operation that fails with
//! `RelationNotFound` runs setup and retries once.

use async_trait::async_trait;
use tracing::info;

use fanout_core::error::FanoutError;
use fanout_core::traits::store::{Entity, SharedStore, Store};

/// Wraps a store and converts `RelationNotFound` into setup-then-retry.
pub struct PreparedStore<T: Entity> {
    inner: SharedStore<T>,
}

impl<T: Entity> PreparedStore<T> {
    pub fn new(inner: SharedStore<T>) -> Self {
        PreparedStore { inner }
    }

    async fn prepare(&self, namespace: &str) -> Result<(), FanoutError> {
        info!(kind = T::KIND, namespace, "provisioning namespace");
        self.inner.setup(namespace).await
    }
}

#[async_trait]
impl<T: Entity> Store<T> for PreparedStore<T> {
    async fn put(&self, namespace: &str, entity: T) -> Result<T, FanoutError> {
        match self.inner.put(namespace, entity.clone()).await {
            Err(err) if err.is_relation_not_found() => {
                self.prepare(namespace).await?;
                self.inner.put(namespace, entity).await
            }
            res => res,
        }
    }

    async fn query(&self, namespace: &str, opts: T::QueryOptions) -> Result<Vec<T>, FanoutError> {
        match self.inner.query(namespace, opts.clone()).await {
            Err(err) if err.is_relation_not_found() => {
                self.prepare(namespace).await?;
                self.inner.query(namespace, opts).await
            }
            res => res,
        }
    }

    async fn count(&self, namespace: &str, opts: T::QueryOptions) -> Result<usize, FanoutError> {
        match self.inner.count(namespace, opts.clone()).await {
            Err(err) if err.is_relation_not_found() => {
                self.prepare(namespace).await?;
                self.inner.count(namespace, opts).await
            }
            res => res,
        }
    }

    async fn setup(&self, namespace: &str) -> Result<(), FanoutError> {
        self.inner.setup(namespace).await
    }

    async fn teardown(&self, namespace: &str) -> Result<(), FanoutError> {
        self.inner.teardown(namespace).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::mem::MemStore;
    use fanout_core::types::user::{QueryOptions, User};

    #[tokio::test]
    async fn put_provisions_unknown_namespace() {
        let store = PreparedStore::new(Arc::new(MemStore::<User>::new()));

        let stored = store
            .put(
                "app_9",
                User {
                    username: "alice".into(),
                    ..User::default()
                },
            )
            .await
            .unwrap();

        assert_ne!(stored.id, 0);
        assert_eq!(
            store.count("app_9", QueryOptions::default()).await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn query_provisions_and_returns_empty() {
        let store = PreparedStore::new(Arc::new(MemStore::<User>::new()));

        let found = store.query("app_9", QueryOptions::default()).await.unwrap();
        assert!(found.is_empty());
    }
}
