// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-kind consumer loops.
//!
//! A consumer owns one typed source and turns every state change into a
//! [`Batch`] for the delivery stage. Changes that match no rule are acked
//! on the spot. Store and pipeline errors abort the loop so the change is
//! redelivered after its visibility timeout expires.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use fanout_core::error::FanoutError;
use fanout_core::namespace::{NAMESPACE_DEFAULT, app_id};
use fanout_core::traits::channel::Message;
use fanout_core::traits::source::{Acker, SharedSource, StateChange};
use fanout_core::traits::store::SharedStore;
use fanout_core::types::app::{self, App};
use fanout_core::types::connection::Connection;
use fanout_core::types::event::Event;
use fanout_core::types::object::Object;
use fanout_core::types::reaction::Reaction;
use fanout_core::types::rule::{Rule, RuleType};
use fanout_pipeline::{Pipelines, RuleEngine};

use crate::batch::{Batch, SourceAcker};

/// Entity kinds a consumer loop can fan out.
#[async_trait]
pub trait Fanout: Sized + Send + Sync + 'static {
    const RULE_TYPE: RuleType;

    async fn fan_out(
        pipelines: &Pipelines,
        app: &App,
        change: &StateChange<Self>,
        rules: &[Rule],
    ) -> Result<Vec<Message>, FanoutError>;
}

#[async_trait]
impl Fanout for Connection {
    const RULE_TYPE: RuleType = RuleType::Connection;

    async fn fan_out(
        pipelines: &Pipelines,
        app: &App,
        change: &StateChange<Self>,
        rules: &[Rule],
    ) -> Result<Vec<Message>, FanoutError> {
        pipelines.connection(app, change, rules).await
    }
}

#[async_trait]
impl Fanout for Event {
    const RULE_TYPE: RuleType = RuleType::Event;

    async fn fan_out(
        pipelines: &Pipelines,
        app: &App,
        change: &StateChange<Self>,
        rules: &[Rule],
    ) -> Result<Vec<Message>, FanoutError> {
        pipelines.event(app, change, rules).await
    }
}

#[async_trait]
impl Fanout for Object {
    const RULE_TYPE: RuleType = RuleType::Object;

    async fn fan_out(
        pipelines: &Pipelines,
        app: &App,
        change: &StateChange<Self>,
        rules: &[Rule],
    ) -> Result<Vec<Message>, FanoutError> {
        pipelines.object(app, change, rules).await
    }
}

#[async_trait]
impl Fanout for Reaction {
    const RULE_TYPE: RuleType = RuleType::Reaction;

    async fn fan_out(
        pipelines: &Pipelines,
        app: &App,
        change: &StateChange<Self>,
        rules: &[Rule],
    ) -> Result<Vec<Message>, FanoutError> {
        pipelines.reaction(app, change, rules).await
    }
}

/// Drives one entity kind from its source into the batch channel.
pub struct Consumer<T> {
    apps: SharedStore<App>,
    engine: Arc<RuleEngine>,
    pipelines: Arc<Pipelines>,
    source: SharedSource<T>,
}

impl<T: Fanout> Consumer<T> {
    pub fn new(
        apps: SharedStore<App>,
        engine: Arc<RuleEngine>,
        pipelines: Arc<Pipelines>,
        source: SharedSource<T>,
    ) -> Self {
        Consumer {
            apps,
            engine,
            pipelines,
            source,
        }
    }

    /// Consumes until cancelled or an unrecoverable error surfaces.
    pub async fn run(
        self,
        batches: mpsc::Sender<Batch>,
        shutdown: CancellationToken,
    ) -> Result<(), FanoutError> {
        let acker: Arc<dyn Acker> = Arc::new(SourceAcker(self.source.clone()));

        loop {
            let change = tokio::select! {
                () = shutdown.cancelled() => {
                    info!(kind = ?T::RULE_TYPE, "consumer stopping");
                    return Ok(());
                }
                change = self.source.consume() => change,
            };

            let change = match change {
                Ok(change) => change,
                Err(err) if err.is_empty_source() => continue,
                Err(err) => return Err(err),
            };

            self.handle(&acker, &batches, change).await?;
        }
    }

    async fn handle(
        &self,
        acker: &Arc<dyn Acker>,
        batches: &mpsc::Sender<Batch>,
        change: StateChange<T>,
    ) -> Result<(), FanoutError> {
        let app = self.app(&change.namespace).await?;
        let rules = self.engine.active(&change.namespace, T::RULE_TYPE).await?;
        let messages = T::fan_out(&self.pipelines, &app, &change, &rules).await?;

        if messages.is_empty() {
            return self.source.ack(&change.ack_id).await;
        }

        debug!(
            namespace = %change.namespace,
            kind = ?T::RULE_TYPE,
            messages = messages.len(),
            "queueing batch"
        );

        let batch = Batch::new(app, messages, acker.clone(), change.ack_id);
        batches
            .send(batch)
            .await
            .map_err(|_| FanoutError::Internal("batch channel closed".into()))
    }

    /// Resolves the enabled app owning a tenant namespace.
    async fn app(&self, namespace: &str) -> Result<App, FanoutError> {
        let id = app_id(namespace)?;

        let apps = self
            .apps
            .query(
                NAMESPACE_DEFAULT,
                app::QueryOptions {
                    enabled: Some(true),
                    ids: vec![id],
                    ..app::QueryOptions::default()
                },
            )
            .await?;

        apps.into_iter()
            .next()
            .ok_or_else(|| FanoutError::not_found("app", format!("id {id}")))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use fanout_core::traits::source::Source;
    use fanout_core::traits::store::Store;
    use fanout_core::types::connection::{ConnectionState, ConnectionType};
    use fanout_core::types::user::User;
    use fanout_pipeline::defaults;
    use fanout_queue::MemorySource;
    use fanout_store::MemStore;

    struct Fixture {
        consumer: Consumer<Connection>,
        source: SharedSource<Connection>,
    }

    async fn fixture() -> Fixture {
        let apps: SharedStore<App> = Arc::new(MemStore::new());
        let connections: SharedStore<Connection> = Arc::new(MemStore::new());
        let objects: SharedStore<Object> = Arc::new(MemStore::new());
        let users: SharedStore<User> = Arc::new(MemStore::new());
        let rules: SharedStore<fanout_core::types::rule::Rule> = Arc::new(MemStore::new());

        apps.setup(NAMESPACE_DEFAULT).await.unwrap();
        connections.setup("app_1").await.unwrap();
        objects.setup("app_1").await.unwrap();
        users.setup("app_1").await.unwrap();
        rules.setup("app_1").await.unwrap();

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

        let source: SharedSource<Connection> = Arc::new(MemorySource::new(
            Duration::from_millis(50),
            Duration::from_secs(5),
        ));
        let consumer = Consumer::new(
            apps,
            Arc::new(RuleEngine::new(rules)),
            Arc::new(Pipelines::new(connections, objects, users)),
            source.clone(),
        );

        Fixture { consumer, source }
    }

    fn follow() -> Connection {
        Connection {
            from_id: 1,
            to_id: 2,
            kind: ConnectionType::Follow,
            state: ConnectionState::Confirmed,
            ..Connection::default()
        }
    }

    #[tokio::test]
    async fn matched_change_becomes_a_batch() {
        let f = fixture().await;
        f.source
            .propagate("app_1", None, Some(&follow()))
            .await
            .unwrap();

        let (tx, mut rx) = mpsc::channel(4);
        let shutdown = CancellationToken::new();
        let loop_handle = tokio::spawn(f.consumer.run(tx, shutdown.clone()));

        let batch = rx.recv().await.expect("batch");
        assert_eq!(batch.app.id, 1);
        assert_eq!(batch.messages.len(), 1);
        assert_eq!(batch.messages[0].recipient, 2);
        assert_eq!(
            batch.messages[0].messages["en"],
            "alice started following you"
        );

        batch.ack().await.unwrap();
        shutdown.cancel();
        loop_handle.await.unwrap().unwrap();

        // The acked change is gone for good.
        assert!(f.source.consume().await.unwrap_err().is_empty_source());
    }

    #[tokio::test]
    async fn unmatched_change_is_acked_immediately() {
        let f = fixture().await;
        let mut rejected = follow();
        rejected.state = ConnectionState::Rejected;
        f.source
            .propagate("app_1", None, Some(&rejected))
            .await
            .unwrap();

        let (tx, mut rx) = mpsc::channel(4);
        let shutdown = CancellationToken::new();
        let loop_handle = tokio::spawn(f.consumer.run(tx, shutdown.clone()));

        tokio::time::sleep(Duration::from_millis(100)).await;
        shutdown.cancel();
        loop_handle.await.unwrap().unwrap();

        assert!(rx.try_recv().is_err());
        assert!(f.source.consume().await.unwrap_err().is_empty_source());
    }

    #[tokio::test]
    async fn unknown_app_aborts_the_loop() {
        let f = fixture().await;
        f.source
            .propagate("app_999", None, Some(&follow()))
            .await
            .unwrap();

        let (tx, _rx) = mpsc::channel(4);
        let err = f
            .consumer
            .run(tx, CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
