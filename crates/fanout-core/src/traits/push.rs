// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Push-service contract: endpoint lifecycle and publishing.

use async_trait::async_trait;

use crate::error::FanoutError;
use crate::types::Ecosystem;

/// The push service's representation of a registered device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub arn: String,
    pub token: String,
}

/// External push-service capability the channel and reconciler depend on.
#[async_trait]
pub trait PushProvider: Send + Sync {
    /// Registers a new device endpoint under the platform application.
    async fn endpoint_create(
        &self,
        platform_arn: &str,
        token: &str,
    ) -> Result<Endpoint, FanoutError>;

    /// Returns the endpoint for the given ARN.
    ///
    /// Fails with [`FanoutError::EndpointNotFound`] when the push service no
    /// longer knows the ARN and [`FanoutError::EndpointDisabled`] when the
    /// endpoint exists but is disabled.
    async fn endpoint_retrieve(&self, arn: &str) -> Result<Endpoint, FanoutError>;

    /// Stores a new token with the endpoint.
    async fn endpoint_update(&self, arn: &str, token: &str) -> Result<Endpoint, FanoutError>;

    /// Publishes a structured payload to the endpoint.
    ///
    /// A per-publish rejection (HTTP 400 class) surfaces as
    /// [`FanoutError::DeliveryFailure`].
    async fn publish(
        &self,
        ecosystem: Ecosystem,
        endpoint_arn: &str,
        payload: &str,
    ) -> Result<(), FanoutError>;
}

/// Shared handle to a push provider.
pub type SharedPushProvider = std::sync::Arc<dyn PushProvider>;
