// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connection pipeline: follows, friend requests, friend confirmations.

use fanout_core::error::FanoutError;
use fanout_core::traits::channel::Message;
use fanout_core::traits::source::StateChange;
use fanout_core::types::app::App;
use fanout_core::types::connection::Connection;
use fanout_core::types::rule::Rule;

use crate::recipients::RecipientContext;
use crate::template::UrnContext;
use crate::Pipelines;

impl Pipelines {
    /// Expands a connection state change into addressed messages.
    pub async fn connection(
        &self,
        app: &App,
        change: &StateChange<Connection>,
        rules: &[Rule],
    ) -> Result<Vec<Message>, FanoutError> {
        let Some(new) = change.new.as_ref() else {
            return Ok(Vec::new());
        };

        let matched: Vec<&Rule> = rules
            .iter()
            .filter(|r| r.criteria.match_connection(change.old.as_ref(), Some(new)))
            .collect();
        if matched.is_empty() {
            return Ok(Vec::new());
        }

        let namespace = app.namespace();
        let origin = self.user(&namespace, new.from_id).await?;
        let target = self.user(&namespace, new.to_id).await?;

        let ctx = RecipientContext {
            from: Some(new.from_id),
            to: Some(new.to_id),
            origin: new.from_id,
            parent_owner: None,
        };
        let urn_ctx = UrnContext {
            origin_id: new.from_id,
            ..UrnContext::default()
        };

        let mut messages = Vec::new();
        for rule in matched {
            messages.extend(
                self.expand(&namespace, rule, &ctx, &urn_ctx, &origin, Some(&target))
                    .await?,
            );
        }

        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;

    use super::*;
    use crate::defaults;
    use fanout_core::traits::store::{SharedStore, Store};
    use fanout_core::types::connection::{ConnectionState, ConnectionType};
    use fanout_core::types::object::Object;
    use fanout_core::types::user::User;
    use fanout_store::MemStore;

    async fn pipelines() -> (Pipelines, SharedStore<User>) {
        let connections: SharedStore<Connection> = Arc::new(MemStore::new());
        let objects: SharedStore<Object> = Arc::new(MemStore::new());
        let users: SharedStore<User> = Arc::new(MemStore::new());
        connections.setup("app_42").await.unwrap();
        objects.setup("app_42").await.unwrap();
        users.setup("app_42").await.unwrap();

        (
            Pipelines::new(connections, objects, users.clone()),
            users,
        )
    }

    async fn put_user(users: &SharedStore<User>, username: &str, firstname: &str) -> User {
        users
            .put(
                "app_42",
                User {
                    username: username.into(),
                    firstname: firstname.into(),
                    ..User::default()
                },
            )
            .await
            .unwrap()
    }

    fn change(new: Connection, old: Option<Connection>) -> StateChange<Connection> {
        StateChange {
            ack_id: "a-1".into(),
            id: "m-1".into(),
            namespace: "app_42".into(),
            new: Some(new),
            old,
            sent_at: Utc::now(),
        }
    }

    fn app() -> App {
        App {
            id: 42,
            name: "demo".into(),
            ..App::default()
        }
    }

    #[tokio::test]
    async fn follow_notifies_the_followed_user() {
        let (pipelines, users) = pipelines().await;
        let alice = put_user(&users, "alice", "").await;
        let bob = put_user(&users, "bob", "Bob").await;

        let messages = pipelines
            .connection(
                &app(),
                &change(
                    Connection {
                        from_id: alice.id,
                        to_id: bob.id,
                        kind: ConnectionType::Follow,
                        state: ConnectionState::Confirmed,
                        ..Connection::default()
                    },
                    None,
                ),
                &defaults::default_rules(),
            )
            .await
            .unwrap();

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].recipient, bob.id);
        assert_eq!(
            messages[0].messages["en"],
            "alice started following you"
        );
        assert_eq!(messages[0].urn, format!("tapglue/users/{}", alice.id));
    }

    #[tokio::test]
    async fn friend_request_and_confirmation_address_opposite_sides() {
        let (pipelines, users) = pipelines().await;
        let alice = put_user(&users, "alice", "Alice").await;
        let bob = put_user(&users, "bob", "Bob").await;
        let rules = defaults::default_rules();

        let pending = Connection {
            from_id: alice.id,
            to_id: bob.id,
            kind: ConnectionType::Friend,
            state: ConnectionState::Pending,
            ..Connection::default()
        };

        let request = pipelines
            .connection(&app(), &change(pending.clone(), None), &rules)
            .await
            .unwrap();
        assert_eq!(request.len(), 1);
        assert_eq!(request[0].recipient, bob.id);
        assert_eq!(request[0].messages["en"], "Alice sent you a friend request.");

        let confirmed = pipelines
            .connection(&app(), &change(pending.clone(), Some(pending)), &rules)
            .await
            .unwrap();
        assert_eq!(confirmed.len(), 1);
        assert_eq!(confirmed[0].recipient, alice.id);
        assert_eq!(
            confirmed[0].messages["en"],
            "Bob accepted your friend request."
        );
    }

    #[tokio::test]
    async fn deletion_changes_are_a_no_op() {
        let (pipelines, _) = pipelines().await;

        let messages = pipelines
            .connection(
                &app(),
                &StateChange {
                    ack_id: "a-1".into(),
                    id: "m-1".into(),
                    namespace: "app_42".into(),
                    new: None,
                    old: Some(Connection::default()),
                    sent_at: Utc::now(),
                },
                &defaults::default_rules(),
            )
            .await
            .unwrap();
        assert!(messages.is_empty());
    }

    #[tokio::test]
    async fn missing_origin_aborts_the_change() {
        let (pipelines, users) = pipelines().await;
        let bob = put_user(&users, "bob", "Bob").await;

        let err = pipelines
            .connection(
                &app(),
                &change(
                    Connection {
                        from_id: 9999,
                        to_id: bob.id,
                        kind: ConnectionType::Follow,
                        state: ConnectionState::Confirmed,
                        ..Connection::default()
                    },
                    None,
                ),
                &defaults::default_rules(),
            )
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
