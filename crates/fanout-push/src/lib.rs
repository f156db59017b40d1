// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Push delivery channel.
//!
//! One [`Channel::push`] call resolves the recipient's devices, syncs every
//! device's endpoint, localizes the text, and publishes. Per-device
//! recoverable conditions (no active platform, disabled endpoint) skip the
//! device; a 400-class delivery failure ends the call successfully because
//! the endpoint reconciler will disable the device asynchronously.

use async_trait::async_trait;
use tracing::debug;

use fanout_core::error::FanoutError;
use fanout_core::namespace::NAMESPACE_DEFAULT;
use fanout_core::traits::channel::{Channel, Message};
use fanout_core::traits::push::SharedPushProvider;
use fanout_core::traits::store::SharedStore;
use fanout_core::types::Ecosystem;
use fanout_core::types::app::App;
use fanout_core::types::device::{self, Device};
use fanout_core::types::platform::{self, Platform};

pub mod endpoint;
pub mod localize;
pub mod memory;
pub mod payload;

pub use localize::localize;
pub use memory::MemoryPushProvider;
pub use payload::payload;

/// Delivers messages to a user's devices through the push service.
pub struct PushChannel {
    devices: SharedStore<Device>,
    platforms: SharedStore<Platform>,
    provider: SharedPushProvider,
}

impl PushChannel {
    pub fn new(
        devices: SharedStore<Device>,
        platforms: SharedStore<Platform>,
        provider: SharedPushProvider,
    ) -> Self {
        PushChannel {
            devices,
            platforms,
            provider,
        }
    }

    /// The active platform registration for an app and ecosystem.
    /// Registrations live in the default namespace.
    async fn platform(
        &self,
        app: &App,
        ecosystem: Ecosystem,
    ) -> Result<Option<Platform>, FanoutError> {
        let platforms = self
            .platforms
            .query(
                NAMESPACE_DEFAULT,
                platform::QueryOptions {
                    active: Some(true),
                    app_ids: vec![app.id],
                    deleted: Some(false),
                    ecosystems: vec![ecosystem],
                    ..platform::QueryOptions::default()
                },
            )
            .await?;

        Ok(platforms.into_iter().next())
    }
}

#[async_trait]
impl Channel for PushChannel {
    async fn push(&self, app: &App, message: &Message) -> Result<(), FanoutError> {
        let namespace = app.namespace();

        let devices = self
            .devices
            .query(
                &namespace,
                device::QueryOptions {
                    deleted: Some(false),
                    disabled: Some(false),
                    user_ids: vec![message.recipient],
                    ..device::QueryOptions::default()
                },
            )
            .await?;
        if devices.is_empty() {
            return Ok(());
        }

        for device in devices {
            let Some(platform) = self.platform(app, device.ecosystem).await? else {
                debug!(
                    ecosystem = %device.ecosystem,
                    app = app.id,
                    "no active platform, skipping device"
                );
                continue;
            };

            let device = match endpoint::sync(
                &self.provider,
                &self.devices,
                &namespace,
                &platform.arn,
                device,
            )
            .await
            {
                Ok(device) => device,
                Err(err) if err.is_endpoint_disabled() => {
                    debug!("endpoint disabled, skipping device");
                    continue;
                }
                Err(err) => return Err(err),
            };

            let text = localize(&message.messages, &device.language);
            let payload = payload(device.ecosystem, &platform.scheme, &message.urn, &text)?;

            match self
                .provider
                .publish(device.ecosystem, &device.endpoint_arn, &payload)
                .await
            {
                Ok(()) => {}
                Err(err) if err.is_delivery_failure() => {
                    // The reconciler disables the device once the push
                    // service reports the failure; nothing to do here.
                    debug!(recipient = message.recipient, "delivery failure swallowed");
                    return Ok(());
                }
                Err(err) => return Err(err),
            }
        }

        Ok(())
    }
}
