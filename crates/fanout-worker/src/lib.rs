// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Worker runtime tying sources, pipelines, and channels together.
//!
//! The [`Coordinator`] spawns one consumer loop per entity kind, the
//! endpoint feedback reconciler, and the delivery stage that drains
//! batches into the configured channels. The process model is
//! crash-on-error: the first unrecoverable error cancels every loop and
//! surfaces, leaving unacked changes to come back after their visibility
//! timeout.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::info;

use fanout_core::error::FanoutError;
use fanout_core::traits::channel::SharedChannel;
use fanout_core::traits::source::SharedSource;
use fanout_core::traits::store::SharedStore;
use fanout_core::types::app::App;
use fanout_core::types::connection::Connection;
use fanout_core::types::device::Device;
use fanout_core::types::event::Event;
use fanout_core::types::object::Object;
use fanout_core::types::platform::Platform;
use fanout_core::types::reaction::Reaction;
use fanout_pipeline::{Pipelines, RuleEngine};
use fanout_queue::SharedRawSource;

pub mod batch;
pub mod consume;
pub mod reconciler;
pub mod shutdown;

pub use batch::Batch;
pub use consume::Consumer;
pub use reconciler::Reconciler;
pub use shutdown::install_signal_handler;

/// Batches buffered between the consumer loops and the delivery stage.
const BATCH_BUFFER: usize = 16;

/// Owns every loop of the worker process.
pub struct Coordinator {
    pub apps: SharedStore<App>,
    pub devices: SharedStore<Device>,
    pub platforms: SharedStore<Platform>,
    pub engine: Arc<RuleEngine>,
    pub pipelines: Arc<Pipelines>,
    pub channels: Vec<SharedChannel>,
    pub connections: SharedSource<Connection>,
    pub events: SharedSource<Event>,
    pub objects: SharedSource<Object>,
    pub reactions: SharedSource<Reaction>,
    pub feedback: SharedRawSource,
}

impl Coordinator {
    /// Runs every loop until cancellation or the first unrecoverable error.
    pub async fn run(self, shutdown: CancellationToken) -> Result<(), FanoutError> {
        let (batches, drain) = mpsc::channel(BATCH_BUFFER);
        let mut tasks: JoinSet<Result<(), FanoutError>> = JoinSet::new();

        tasks.spawn(
            Consumer::new(
                self.apps.clone(),
                self.engine.clone(),
                self.pipelines.clone(),
                self.connections,
            )
            .run(batches.clone(), shutdown.clone()),
        );
        tasks.spawn(
            Consumer::new(
                self.apps.clone(),
                self.engine.clone(),
                self.pipelines.clone(),
                self.events,
            )
            .run(batches.clone(), shutdown.clone()),
        );
        tasks.spawn(
            Consumer::new(
                self.apps.clone(),
                self.engine.clone(),
                self.pipelines.clone(),
                self.objects,
            )
            .run(batches.clone(), shutdown.clone()),
        );
        tasks.spawn(
            Consumer::new(
                self.apps.clone(),
                self.engine.clone(),
                self.pipelines.clone(),
                self.reactions,
            )
            .run(batches.clone(), shutdown.clone()),
        );
        tasks.spawn(
            Reconciler::new(self.apps, self.devices, self.platforms, self.feedback)
                .run(shutdown.clone()),
        );
        tasks.spawn(deliver(drain, self.channels));

        // The delivery stage ends once every consumer sender is gone.
        drop(batches);

        while let Some(joined) = tasks.join_next().await {
            let result = joined
                .map_err(|err| FanoutError::Internal(format!("worker task panicked: {err}")))?;

            if let Err(err) = result {
                shutdown.cancel();
                while tasks.join_next().await.is_some() {}
                return Err(err);
            }
        }

        Ok(())
    }
}

/// Drains batches into the channels, acking each batch after delivery.
async fn deliver(
    mut batches: mpsc::Receiver<Batch>,
    channels: Vec<SharedChannel>,
) -> Result<(), FanoutError> {
    while let Some(batch) = batches.recv().await {
        for message in &batch.messages {
            for channel in &channels {
                channel.push(&batch.app, message).await?;
            }
        }

        batch.ack().await?;
    }

    info!("delivery stage drained");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use fanout_core::namespace::NAMESPACE_DEFAULT;
    use fanout_core::traits::source::Source;
    use fanout_core::traits::store::Store;
    use fanout_core::types::Ecosystem;
    use fanout_core::types::connection::{ConnectionState, ConnectionType};
    use fanout_core::types::event::{self, Visibility};
    use fanout_core::types::rule::Rule;
    use fanout_core::types::user::User;
    use fanout_pipeline::defaults;
    use fanout_push::PushChannel;
    use fanout_queue::{MemoryRawSource, MemorySource};
    use fanout_store::MemStore;
    use fanout_test_utils::MockPushProvider;

    struct Fixture {
        coordinator: Coordinator,
        mock: Arc<MockPushProvider>,
        connections_source: SharedSource<Connection>,
        events_source: SharedSource<Event>,
        users: SharedStore<User>,
        devices: SharedStore<Device>,
        objects_store: SharedStore<Object>,
        connections_store: SharedStore<Connection>,
    }

    fn source<T>() -> SharedSource<T>
    where
        T: serde::Serialize + serde::de::DeserializeOwned + Send + Sync + 'static,
    {
        Arc::new(MemorySource::new(
            Duration::from_millis(50),
            Duration::from_secs(5),
        ))
    }

    async fn fixture() -> Fixture {
        let apps: SharedStore<App> = Arc::new(MemStore::new());
        let connections: SharedStore<Connection> = Arc::new(MemStore::new());
        let devices: SharedStore<Device> = Arc::new(MemStore::new());
        let objects: SharedStore<Object> = Arc::new(MemStore::new());
        let platforms: SharedStore<Platform> = Arc::new(MemStore::new());
        let rules: SharedStore<Rule> = Arc::new(MemStore::new());
        let users: SharedStore<User> = Arc::new(MemStore::new());

        apps.setup(NAMESPACE_DEFAULT).await.unwrap();
        platforms.setup(NAMESPACE_DEFAULT).await.unwrap();
        connections.setup("app_1").await.unwrap();
        devices.setup("app_1").await.unwrap();
        objects.setup("app_1").await.unwrap();
        rules.setup("app_1").await.unwrap();
        users.setup("app_1").await.unwrap();

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

        for (id, username) in [(1, "alice"), (2, "bob")] {
            users
                .put(
                    "app_1",
                    User {
                        id,
                        username: username.into(),
                        ..User::default()
                    },
                )
                .await
                .unwrap();
        }
        defaults::seed(&rules, "app_1").await.unwrap();

        let mock = Arc::new(MockPushProvider::new());
        let channel: SharedChannel = Arc::new(PushChannel::new(
            devices.clone(),
            platforms.clone(),
            mock.clone(),
        ));

        let connections_source = source::<Connection>();
        let events_source = source::<Event>();

        let coordinator = Coordinator {
            apps,
            devices: devices.clone(),
            platforms,
            engine: Arc::new(RuleEngine::new(rules)),
            pipelines: Arc::new(Pipelines::new(
                connections.clone(),
                objects.clone(),
                users.clone(),
            )),
            channels: vec![channel],
            connections: connections_source.clone(),
            events: events_source.clone(),
            objects: source::<Object>(),
            reactions: source::<Reaction>(),
            feedback: Arc::new(MemoryRawSource::new(
                Duration::from_millis(50),
                Duration::from_secs(5),
            )),
        };

        Fixture {
            coordinator,
            mock,
            connections_source,
            events_source,
            users,
            devices,
            objects_store: objects,
            connections_store: connections,
        }
    }

    async fn ios_device(devices: &SharedStore<Device>, user_id: u64, device_id: &str) {
        devices
            .put(
                "app_1",
                Device {
                    user_id,
                    device_id: device_id.into(),
                    token: format!("tok-{device_id}"),
                    ecosystem: Ecosystem::Ios,
                    ..Device::default()
                },
            )
            .await
            .unwrap();
    }

    async fn wait_for_publishes(mock: &MockPushProvider, count: usize) {
        for _ in 0..50 {
            if mock.published().await.len() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("timed out waiting for {count} publishes");
    }

    #[tokio::test]
    async fn follow_reaches_the_followed_users_device() {
        let f = fixture().await;
        ios_device(&f.devices, 2, "d-bob").await;

        f.connections_source
            .propagate(
                "app_1",
                None,
                Some(&Connection {
                    from_id: 1,
                    to_id: 2,
                    kind: ConnectionType::Follow,
                    state: ConnectionState::Confirmed,
                    ..Connection::default()
                }),
            )
            .await
            .unwrap();

        let shutdown = CancellationToken::new();
        let run = tokio::spawn(f.coordinator.run(shutdown.clone()));

        wait_for_publishes(&f.mock, 1).await;
        let published = f.mock.published().await;
        assert!(published[0].payload.contains("alice started following you"));
        assert!(published[0].payload.contains("demoapp://tapglue/users/1"));

        shutdown.cancel();
        run.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn like_fans_out_to_audience_and_owner() {
        let f = fixture().await;
        f.users
            .put(
                "app_1",
                User {
                    id: 3,
                    username: "carol".into(),
                    ..User::default()
                },
            )
            .await
            .unwrap();

        // carol follows alice, the liker.
        f.connections_store
            .put(
                "app_1",
                Connection {
                    from_id: 3,
                    to_id: 1,
                    kind: ConnectionType::Follow,
                    state: ConnectionState::Confirmed,
                    ..Connection::default()
                },
            )
            .await
            .unwrap();
        f.objects_store
            .put(
                "app_1",
                Object {
                    id: 100,
                    owner_id: 2,
                    kind: fanout_core::types::object::TYPE_POST.into(),
                    owned: true,
                    ..Object::default()
                },
            )
            .await
            .unwrap();
        ios_device(&f.devices, 2, "d-bob").await;
        ios_device(&f.devices, 3, "d-carol").await;

        f.events_source
            .propagate(
                "app_1",
                None,
                Some(&Event {
                    user_id: 1,
                    object_id: 100,
                    kind: event::TYPE_LIKE.into(),
                    enabled: true,
                    owned: true,
                    visibility: Visibility::Connection,
                    ..Event::default()
                }),
            )
            .await
            .unwrap();

        let shutdown = CancellationToken::new();
        let run = tokio::spawn(f.coordinator.run(shutdown.clone()));

        wait_for_publishes(&f.mock, 2).await;
        let published = f.mock.published().await;
        let texts: Vec<&str> = published.iter().map(|p| p.payload.as_str()).collect();
        assert!(texts.iter().any(|p| p.contains("alice liked your Post.")));
        assert!(texts.iter().any(|p| p.contains("alice liked a Post.")));

        shutdown.cancel();
        run.await.unwrap().unwrap();
    }
}
