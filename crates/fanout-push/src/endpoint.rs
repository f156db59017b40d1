// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Endpoint synchronization between a stored device and the push service.
//!
//! Sync is a read-then-write keyed on ARN and token, which keeps redelivery
//! idempotent: re-running it converges on the same endpoint state.

use tracing::debug;

use fanout_core::error::FanoutError;
use fanout_core::traits::push::SharedPushProvider;
use fanout_core::traits::store::SharedStore;
use fanout_core::types::device::Device;

/// Brings the device's endpoint registration in line with its token.
///
/// Returns the device to publish to, with a fresh `endpoint_arn` persisted
/// when one had to be (re)created. Fails with
/// [`FanoutError::EndpointDisabled`] when the push service reports the
/// endpoint disabled; callers skip the device.
pub async fn sync(
    provider: &SharedPushProvider,
    devices: &SharedStore<Device>,
    namespace: &str,
    platform_arn: &str,
    device: Device,
) -> Result<Device, FanoutError> {
    if device.endpoint_arn.is_empty() {
        return register(provider, devices, namespace, platform_arn, device).await;
    }

    match provider.endpoint_retrieve(&device.endpoint_arn).await {
        Ok(endpoint) => {
            if endpoint.token != device.token {
                debug!(device_id = %device.device_id, "refreshing endpoint token");
                provider
                    .endpoint_update(&device.endpoint_arn, &device.token)
                    .await?;
            }
            Ok(device)
        }
        Err(err) if err.is_endpoint_not_found() => {
            debug!(device_id = %device.device_id, "endpoint vanished, re-registering");
            register(provider, devices, namespace, platform_arn, device).await
        }
        Err(err) => Err(err),
    }
}

async fn register(
    provider: &SharedPushProvider,
    devices: &SharedStore<Device>,
    namespace: &str,
    platform_arn: &str,
    mut device: Device,
) -> Result<Device, FanoutError> {
    let endpoint = provider.endpoint_create(platform_arn, &device.token).await?;

    device.endpoint_arn = endpoint.arn;
    devices.put(namespace, device.clone()).await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use fanout_core::traits::store::Store;
    use fanout_core::types::device::QueryOptions;
    use fanout_store::MemStore;
    use fanout_test_utils::MockPushProvider;

    fn device(arn: &str, token: &str) -> Device {
        Device {
            user_id: 1,
            device_id: "d-1".into(),
            token: token.into(),
            endpoint_arn: arn.into(),
            ..Device::default()
        }
    }

    async fn stores() -> (SharedPushProvider, Arc<MockPushProvider>, SharedStore<Device>) {
        let mock = Arc::new(MockPushProvider::new());
        let provider: SharedPushProvider = mock.clone();
        let devices: SharedStore<Device> = Arc::new(MemStore::new());
        devices.setup("app_1").await.unwrap();
        (provider, mock, devices)
    }

    #[tokio::test]
    async fn registers_devices_without_an_endpoint() {
        let (provider, _, devices) = stores().await;
        let stored = devices.put("app_1", device("", "tok-1")).await.unwrap();

        let synced = sync(&provider, &devices, "app_1", "arn:platform/ios", stored)
            .await
            .unwrap();

        assert!(synced.endpoint_arn.starts_with("arn:platform/ios/endpoints/"));

        // The new ARN is persisted.
        let found = devices
            .query(
                "app_1",
                QueryOptions {
                    ids: vec![synced.id],
                    ..QueryOptions::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(found[0].endpoint_arn, synced.endpoint_arn);
    }

    #[tokio::test]
    async fn refreshes_a_drifted_token() {
        let (provider, mock, devices) = stores().await;
        mock.register("arn:e/1", "stale").await;
        let stored = devices
            .put("app_1", device("arn:e/1", "fresh"))
            .await
            .unwrap();

        sync(&provider, &devices, "app_1", "arn:platform/ios", stored)
            .await
            .unwrap();

        assert_eq!(mock.token("arn:e/1").await.unwrap(), "fresh");
    }

    #[tokio::test]
    async fn reregisters_a_vanished_endpoint() {
        let (provider, _, devices) = stores().await;
        let stored = devices
            .put("app_1", device("arn:gone", "tok-1"))
            .await
            .unwrap();

        let synced = sync(&provider, &devices, "app_1", "arn:platform/ios", stored)
            .await
            .unwrap();
        assert_ne!(synced.endpoint_arn, "arn:gone");
        assert!(synced.endpoint_arn.starts_with("arn:platform/ios/"));
    }

    #[tokio::test]
    async fn disabled_endpoint_surfaces() {
        let (provider, mock, devices) = stores().await;
        mock.register("arn:e/1", "tok-1").await;
        mock.disable("arn:e/1").await;
        let stored = devices
            .put("app_1", device("arn:e/1", "tok-1"))
            .await
            .unwrap();

        let err = sync(&provider, &devices, "app_1", "arn:platform/ios", stored)
            .await
            .unwrap_err();
        assert!(err.is_endpoint_disabled());
    }
}
