// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scriptable in-memory push provider.
//!
//! Endpoints live in a mutex-guarded map; tests pre-register endpoints,
//! flip them disabled, or script per-endpoint publish failures, then assert
//! on the captured publishes.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use fanout_core::error::FanoutError;
use fanout_core::traits::push::{Endpoint, PushProvider};
use fanout_core::types::Ecosystem;

/// One captured publish call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRecord {
    pub ecosystem: Ecosystem,
    pub endpoint_arn: String,
    pub payload: String,
}

#[derive(Default)]
struct State {
    endpoints: HashMap<String, Endpoint>,
    disabled: HashSet<String>,
    delivery_failures: HashSet<String>,
    publishes: Vec<PublishRecord>,
}

/// In-memory [`PushProvider`] double.
#[derive(Default)]
pub struct MockPushProvider {
    state: Mutex<State>,
    counter: AtomicU64,
}

impl MockPushProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-registers an endpoint as the push service would know it.
    pub async fn register(&self, arn: &str, token: &str) {
        let mut state = self.state.lock().await;
        state.endpoints.insert(
            arn.to_owned(),
            Endpoint {
                arn: arn.to_owned(),
                token: token.to_owned(),
            },
        );
    }

    /// Marks an endpoint disabled; retrieval will fail accordingly.
    pub async fn disable(&self, arn: &str) {
        let mut state = self.state.lock().await;
        state.disabled.insert(arn.to_owned());
    }

    /// Scripts publishes to this endpoint to fail with a 400-class
    /// delivery failure.
    pub async fn fail_deliveries(&self, arn: &str) {
        let mut state = self.state.lock().await;
        state.delivery_failures.insert(arn.to_owned());
    }

    /// All publishes captured so far, in call order.
    pub async fn published(&self) -> Vec<PublishRecord> {
        self.state.lock().await.publishes.clone()
    }

    /// The token the provider currently holds for an endpoint.
    pub async fn token(&self, arn: &str) -> Option<String> {
        self.state
            .lock()
            .await
            .endpoints
            .get(arn)
            .map(|e| e.token.clone())
    }
}

#[async_trait]
impl PushProvider for MockPushProvider {
    async fn endpoint_create(
        &self,
        platform_arn: &str,
        token: &str,
    ) -> Result<Endpoint, FanoutError> {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        let endpoint = Endpoint {
            arn: format!("{platform_arn}/endpoints/{n}"),
            token: token.to_owned(),
        };

        let mut state = self.state.lock().await;
        state
            .endpoints
            .insert(endpoint.arn.clone(), endpoint.clone());
        Ok(endpoint)
    }

    async fn endpoint_retrieve(&self, arn: &str) -> Result<Endpoint, FanoutError> {
        let state = self.state.lock().await;
        if state.disabled.contains(arn) {
            return Err(FanoutError::EndpointDisabled);
        }
        state
            .endpoints
            .get(arn)
            .cloned()
            .ok_or(FanoutError::EndpointNotFound)
    }

    async fn endpoint_update(&self, arn: &str, token: &str) -> Result<Endpoint, FanoutError> {
        let mut state = self.state.lock().await;
        let endpoint = state
            .endpoints
            .get_mut(arn)
            .ok_or(FanoutError::EndpointNotFound)?;
        endpoint.token = token.to_owned();
        Ok(endpoint.clone())
    }

    async fn publish(
        &self,
        ecosystem: Ecosystem,
        endpoint_arn: &str,
        payload: &str,
    ) -> Result<(), FanoutError> {
        let mut state = self.state.lock().await;
        if state.delivery_failures.contains(endpoint_arn) {
            return Err(FanoutError::DeliveryFailure);
        }
        state.publishes.push(PublishRecord {
            ecosystem,
            endpoint_arn: endpoint_arn.to_owned(),
            payload: payload.to_owned(),
        });
        Ok(())
    }
}
