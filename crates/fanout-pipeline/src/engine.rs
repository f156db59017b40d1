// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rule lookup with a short-lived per-tenant cache.
//!
//! Rules change rarely and every state change needs the active set, so the
//! engine caches per `(namespace, kind)` with a small TTL. Staleness up to
//! the TTL is acceptable.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use fanout_core::error::FanoutError;
use fanout_core::traits::store::SharedStore;
use fanout_core::types::rule::{QueryOptions, Rule, RuleType};

pub const DEFAULT_TTL: Duration = Duration::from_secs(5);

struct CacheEntry {
    fetched_at: Instant,
    rules: Vec<Rule>,
}

/// Serves the active rule set for a tenant and entity kind.
pub struct RuleEngine {
    store: SharedStore<Rule>,
    cache: Mutex<HashMap<(String, RuleType), CacheEntry>>,
    ttl: Duration,
}

impl RuleEngine {
    pub fn new(store: SharedStore<Rule>) -> Self {
        Self::with_ttl(store, DEFAULT_TTL)
    }

    pub fn with_ttl(store: SharedStore<Rule>, ttl: Duration) -> Self {
        RuleEngine {
            store,
            cache: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Returns all rules with `active && !deleted` of the given kind.
    pub async fn active(&self, namespace: &str, kind: RuleType) -> Result<Vec<Rule>, FanoutError> {
        let key = (namespace.to_owned(), kind);

        {
            let cache = self.cache.lock().await;
            if let Some(entry) = cache.get(&key) {
                if entry.fetched_at.elapsed() < self.ttl {
                    return Ok(entry.rules.clone());
                }
            }
        }

        tracing::debug!(namespace, ?kind, "refreshing rule cache");
        let rules = self
            .store
            .query(
                namespace,
                QueryOptions {
                    active: Some(true),
                    deleted: Some(false),
                    types: vec![kind],
                    ..QueryOptions::default()
                },
            )
            .await?;

        let mut cache = self.cache.lock().await;
        cache.insert(
            key,
            CacheEntry {
                fetched_at: Instant::now(),
                rules: rules.clone(),
            },
        );

        Ok(rules)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::defaults;
    use fanout_core::traits::store::Store;
    use fanout_store::MemStore;

    #[tokio::test]
    async fn active_filters_by_kind_and_flags() {
        let store: SharedStore<Rule> = Arc::new(MemStore::new());
        store.setup("app_1").await.unwrap();
        defaults::seed(&store, "app_1").await.unwrap();

        let mut inactive = defaults::follow_rule();
        inactive.name = "follow-off".into();
        inactive.active = false;
        store.put("app_1", inactive).await.unwrap();

        let engine = RuleEngine::new(store);
        let rules = engine.active("app_1", RuleType::Connection).await.unwrap();

        assert_eq!(rules.len(), 3);
        assert!(rules.iter().all(|r| r.active && !r.deleted));
        assert!(rules.iter().all(|r| r.kind() == RuleType::Connection));
    }

    #[tokio::test]
    async fn cache_serves_stale_reads_within_ttl() {
        let store: SharedStore<Rule> = Arc::new(MemStore::new());
        store.setup("app_1").await.unwrap();
        store.put("app_1", defaults::follow_rule()).await.unwrap();

        let engine = RuleEngine::with_ttl(store.clone(), Duration::from_secs(60));
        assert_eq!(
            engine
                .active("app_1", RuleType::Connection)
                .await
                .unwrap()
                .len(),
            1
        );

        store
            .put("app_1", defaults::friend_request_rule())
            .await
            .unwrap();

        // Within the TTL the new rule is not visible yet.
        assert_eq!(
            engine
                .active("app_1", RuleType::Connection)
                .await
                .unwrap()
                .len(),
            1
        );
    }
}
