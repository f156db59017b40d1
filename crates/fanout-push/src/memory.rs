// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process push provider used by the development runtime.
//!
//! Keeps the endpoint registry in memory and logs publishes instead of
//! talking to a hosted push service. The endpoint lifecycle matches the
//! hosted contract so the channel and reconciler run unchanged.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;

use fanout_core::error::FanoutError;
use fanout_core::traits::push::{Endpoint, PushProvider};
use fanout_core::types::Ecosystem;

#[derive(Default)]
pub struct MemoryPushProvider {
    endpoints: Mutex<HashMap<String, String>>,
    counter: AtomicU64,
}

impl MemoryPushProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PushProvider for MemoryPushProvider {
    async fn endpoint_create(
        &self,
        platform_arn: &str,
        token: &str,
    ) -> Result<Endpoint, FanoutError> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let arn = format!("{platform_arn}/endpoints/{n}");

        let mut endpoints = self.endpoints.lock().await;
        endpoints.insert(arn.clone(), token.to_owned());

        Ok(Endpoint {
            arn,
            token: token.to_owned(),
        })
    }

    async fn endpoint_retrieve(&self, arn: &str) -> Result<Endpoint, FanoutError> {
        let endpoints = self.endpoints.lock().await;

        endpoints
            .get(arn)
            .map(|token| Endpoint {
                arn: arn.to_owned(),
                token: token.clone(),
            })
            .ok_or(FanoutError::EndpointNotFound)
    }

    async fn endpoint_update(&self, arn: &str, token: &str) -> Result<Endpoint, FanoutError> {
        let mut endpoints = self.endpoints.lock().await;

        match endpoints.get_mut(arn) {
            Some(stored) => {
                *stored = token.to_owned();
                Ok(Endpoint {
                    arn: arn.to_owned(),
                    token: token.to_owned(),
                })
            }
            None => Err(FanoutError::EndpointNotFound),
        }
    }

    async fn publish(
        &self,
        ecosystem: Ecosystem,
        endpoint_arn: &str,
        payload: &str,
    ) -> Result<(), FanoutError> {
        let endpoints = self.endpoints.lock().await;
        if !endpoints.contains_key(endpoint_arn) {
            return Err(FanoutError::EndpointNotFound);
        }

        info!(%ecosystem, endpoint_arn, payload, "push published");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn endpoint_lifecycle_round_trips() {
        let provider = MemoryPushProvider::new();

        let endpoint = provider
            .endpoint_create("arn:platform/ios", "tok-1")
            .await
            .unwrap();
        assert!(endpoint.arn.starts_with("arn:platform/ios/endpoints/"));

        provider
            .endpoint_update(&endpoint.arn, "tok-2")
            .await
            .unwrap();
        let retrieved = provider.endpoint_retrieve(&endpoint.arn).await.unwrap();
        assert_eq!(retrieved.token, "tok-2");

        provider
            .publish(Ecosystem::Ios, &endpoint.arn, "{}")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn unknown_arn_is_not_found() {
        let provider = MemoryPushProvider::new();

        let err = provider.endpoint_retrieve("arn:gone").await.unwrap_err();
        assert!(err.is_endpoint_not_found());

        let err = provider
            .publish(Ecosystem::Ios, "arn:gone", "{}")
            .await
            .unwrap_err();
        assert!(err.is_endpoint_not_found());
    }
}
