// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Endpoint feedback reconciliation.
//!
//! The push service reports endpoint state changes on a feedback queue. The
//! reconciler listens for delivery failures and disables the devices behind
//! the failing endpoint, so later batches stop publishing to them. Messages
//! that are not delivery-failure notifications are acked and dropped.

use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use fanout_core::error::FanoutError;
use fanout_core::namespace::NAMESPACE_DEFAULT;
use fanout_core::traits::store::SharedStore;
use fanout_core::types::app::{self, App};
use fanout_core::types::device::{self, Device};
use fanout_core::types::platform::{self, Platform};
use fanout_queue::SharedRawSource;

const TYPE_NOTIFICATION: &str = "Notification";
const SERVICE_SNS: &str = "SNS";
const EVENT_DELIVERY_FAILURE: &str = "DeliveryFailure";

/// Outer feedback envelope as written by the push service.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "Type")]
    kind: String,
    #[serde(rename = "Message", default)]
    message: String,
}

/// Inner notification payload carried as a JSON string.
#[derive(Debug, Deserialize)]
struct EndpointChange {
    #[serde(rename = "Service")]
    service: String,
    #[serde(rename = "EventType")]
    event_type: String,
    #[serde(rename = "Resource")]
    resource: String,
    #[serde(rename = "EndpointArn")]
    endpoint_arn: String,
    #[serde(rename = "FailureType", default)]
    failure_type: String,
    #[serde(rename = "FailureMessage", default)]
    failure_message: String,
}

/// Consumes the feedback queue and disables devices on delivery failures.
pub struct Reconciler {
    apps: SharedStore<App>,
    devices: SharedStore<Device>,
    platforms: SharedStore<Platform>,
    source: SharedRawSource,
}

impl Reconciler {
    pub fn new(
        apps: SharedStore<App>,
        devices: SharedStore<Device>,
        platforms: SharedStore<Platform>,
        source: SharedRawSource,
    ) -> Self {
        Reconciler {
            apps,
            devices,
            platforms,
            source,
        }
    }

    /// Consumes until cancelled or an unrecoverable error surfaces.
    pub async fn run(self, shutdown: CancellationToken) -> Result<(), FanoutError> {
        loop {
            let message = tokio::select! {
                () = shutdown.cancelled() => {
                    info!("reconciler stopping");
                    return Ok(());
                }
                message = self.source.consume() => message,
            };

            let message = match message {
                Ok(message) => message,
                Err(err) if err.is_empty_source() => continue,
                Err(err) => return Err(err),
            };

            self.handle(&message.body).await?;
            self.source.ack(&message.ack_id).await?;
        }
    }

    /// Applies one feedback message. Irrelevant messages are a no-op so the
    /// caller acks them.
    async fn handle(&self, body: &str) -> Result<(), FanoutError> {
        let envelope: Envelope = serde_json::from_str(body).map_err(|err| FanoutError::Queue {
            message: "decoding feedback envelope".into(),
            source: Some(Box::new(err)),
        })?;
        if envelope.kind != TYPE_NOTIFICATION {
            debug!(kind = %envelope.kind, "skipping non-notification feedback");
            return Ok(());
        }

        let change: EndpointChange =
            serde_json::from_str(&envelope.message).map_err(|err| FanoutError::Queue {
                message: "decoding endpoint change".into(),
                source: Some(Box::new(err)),
            })?;
        if change.service != SERVICE_SNS || change.event_type != EVENT_DELIVERY_FAILURE {
            debug!(
                service = %change.service,
                event = %change.event_type,
                "skipping unrelated endpoint event"
            );
            return Ok(());
        }

        let Some(platform) = self.platform(&change.resource).await? else {
            debug!(resource = %change.resource, "no platform for resource");
            return Ok(());
        };
        let Some(app) = self.app(platform.app_id).await? else {
            debug!(app = platform.app_id, "no app for platform");
            return Ok(());
        };

        self.disable_devices(&app, &change).await
    }

    async fn platform(&self, arn: &str) -> Result<Option<Platform>, FanoutError> {
        let platforms = self
            .platforms
            .query(
                NAMESPACE_DEFAULT,
                platform::QueryOptions {
                    arns: vec![arn.to_owned()],
                    deleted: Some(false),
                    ..platform::QueryOptions::default()
                },
            )
            .await?;

        Ok(platforms.into_iter().next())
    }

    async fn app(&self, id: u64) -> Result<Option<App>, FanoutError> {
        let apps = self
            .apps
            .query(
                NAMESPACE_DEFAULT,
                app::QueryOptions {
                    ids: vec![id],
                    ..app::QueryOptions::default()
                },
            )
            .await?;

        Ok(apps.into_iter().next())
    }

    async fn disable_devices(&self, app: &App, change: &EndpointChange) -> Result<(), FanoutError> {
        let namespace = app.namespace();

        let devices = self
            .devices
            .query(
                &namespace,
                device::QueryOptions {
                    deleted: Some(false),
                    endpoint_arns: vec![change.endpoint_arn.clone()],
                    ..device::QueryOptions::default()
                },
            )
            .await?;

        for mut device in devices {
            info!(
                device_id = %device.device_id,
                endpoint_arn = %change.endpoint_arn,
                failure_type = %change.failure_type,
                failure_message = %change.failure_message,
                "disabling device after delivery failure"
            );

            device.disabled = true;
            self.devices.put(&namespace, device).await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use fanout_core::traits::store::Store;
    use fanout_core::types::Ecosystem;
    use fanout_queue::{MemoryRawSource, RawSource};
    use fanout_store::MemStore;

    struct Fixture {
        reconciler: Reconciler,
        source: SharedRawSource,
        devices: SharedStore<Device>,
    }

    async fn fixture() -> Fixture {
        let apps: SharedStore<App> = Arc::new(MemStore::new());
        let devices: SharedStore<Device> = Arc::new(MemStore::new());
        let platforms: SharedStore<Platform> = Arc::new(MemStore::new());
        apps.setup(NAMESPACE_DEFAULT).await.unwrap();
        platforms.setup(NAMESPACE_DEFAULT).await.unwrap();
        devices.setup("app_1").await.unwrap();

        apps.put(
            NAMESPACE_DEFAULT,
            App {
                id: 1,
                name: "demo".into(),
                ..App::default()
            },
        )
        .await
        .unwrap();
        platforms
            .put(
                NAMESPACE_DEFAULT,
                Platform {
                    app_id: 1,
                    arn: "arn:platform/ios".into(),
                    ecosystem: Ecosystem::Ios,
                    name: "ios".into(),
                    scheme: "demoapp".into(),
                    ..Platform::default()
                },
            )
            .await
            .unwrap();
        devices
            .put(
                "app_1",
                Device {
                    user_id: 7,
                    device_id: "d-1".into(),
                    token: "tok-1".into(),
                    ecosystem: Ecosystem::Ios,
                    endpoint_arn: "arn:e/1".into(),
                    ..Device::default()
                },
            )
            .await
            .unwrap();

        let source: SharedRawSource = Arc::new(MemoryRawSource::new(
            Duration::from_millis(50),
            Duration::from_secs(5),
        ));

        Fixture {
            reconciler: Reconciler::new(apps, devices.clone(), platforms, source.clone()),
            source,
            devices,
        }
    }

    fn failure_body(resource: &str, endpoint_arn: &str) -> String {
        let inner = serde_json::json!({
            "Service": "SNS",
            "EventType": "DeliveryFailure",
            "Resource": resource,
            "EndpointArn": endpoint_arn,
            "FailureType": "InvalidPlatformToken",
            "FailureMessage": "token rejected",
        })
        .to_string();

        serde_json::json!({ "Type": "Notification", "Message": inner }).to_string()
    }

    async fn device_disabled(devices: &SharedStore<Device>, arn: &str) -> bool {
        let found = devices
            .query(
                "app_1",
                device::QueryOptions {
                    endpoint_arns: vec![arn.to_owned()],
                    ..device::QueryOptions::default()
                },
            )
            .await
            .unwrap();
        found[0].disabled
    }

    #[tokio::test]
    async fn delivery_failure_disables_the_device() {
        let f = fixture().await;
        f.reconciler
            .handle(&failure_body("arn:platform/ios", "arn:e/1"))
            .await
            .unwrap();

        assert!(device_disabled(&f.devices, "arn:e/1").await);
    }

    #[tokio::test]
    async fn non_notification_feedback_is_ignored() {
        let f = fixture().await;
        f.reconciler
            .handle(r#"{"Type":"SubscriptionConfirmation","Message":""}"#)
            .await
            .unwrap();

        assert!(!device_disabled(&f.devices, "arn:e/1").await);
    }

    #[tokio::test]
    async fn unrelated_endpoint_events_are_ignored() {
        let f = fixture().await;
        let inner = serde_json::json!({
            "Service": "SNS",
            "EventType": "EndpointCreated",
            "Resource": "arn:platform/ios",
            "EndpointArn": "arn:e/1",
        })
        .to_string();
        let body = serde_json::json!({ "Type": "Notification", "Message": inner }).to_string();

        f.reconciler.handle(&body).await.unwrap();
        assert!(!device_disabled(&f.devices, "arn:e/1").await);
    }

    #[tokio::test]
    async fn unknown_platform_is_a_no_op() {
        let f = fixture().await;
        f.reconciler
            .handle(&failure_body("arn:platform/unknown", "arn:e/1"))
            .await
            .unwrap();

        assert!(!device_disabled(&f.devices, "arn:e/1").await);
    }

    #[tokio::test]
    async fn run_drains_and_acks_the_queue() {
        let f = fixture().await;
        f.source
            .publish(&failure_body("arn:platform/ios", "arn:e/1"))
            .await
            .unwrap();

        let shutdown = CancellationToken::new();
        let loop_handle = tokio::spawn(f.reconciler.run(shutdown.clone()));

        tokio::time::sleep(Duration::from_millis(100)).await;
        shutdown.cancel();
        loop_handle.await.unwrap().unwrap();

        assert!(device_disabled(&f.devices, "arn:e/1").await);
        assert!(f.source.consume().await.unwrap_err().is_empty_source());
    }
}
