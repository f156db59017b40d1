// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reaction pipeline. Mirrors the event-like fan-out for typed reactions.

use fanout_core::error::FanoutError;
use fanout_core::traits::channel::Message;
use fanout_core::traits::source::StateChange;
use fanout_core::types::app::App;
use fanout_core::types::reaction::Reaction;
use fanout_core::types::rule::Rule;

use crate::Pipelines;
use crate::recipients::RecipientContext;
use crate::template::UrnContext;

impl Pipelines {
    /// Expands a reaction state change into addressed messages.
    pub async fn reaction(
        &self,
        app: &App,
        change: &StateChange<Reaction>,
        rules: &[Rule],
    ) -> Result<Vec<Message>, FanoutError> {
        let Some(new) = change.new.as_ref() else {
            return Ok(Vec::new());
        };

        let matched: Vec<&Rule> = rules
            .iter()
            .filter(|r| r.criteria.match_reaction(change.old.as_ref(), Some(new)))
            .collect();
        if matched.is_empty() {
            return Ok(Vec::new());
        }

        let namespace = app.namespace();
        let origin = self.user(&namespace, new.owner_id).await?;
        let parent = self.parent(&namespace, new.object_id).await?;

        let ctx = RecipientContext {
            from: None,
            to: None,
            origin: new.owner_id,
            parent_owner: Some(parent.owner_id),
        };
        let urn_ctx = UrnContext {
            origin_id: new.owner_id,
            id: new.id,
            parent_id: parent.id,
        };

        let mut messages = Vec::new();
        for rule in matched {
            messages.extend(
                self.expand(&namespace, rule, &ctx, &urn_ctx, &origin, None)
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
    use fanout_core::types::connection::Connection;
    use fanout_core::types::object::{Object, TYPE_POST};
    use fanout_core::types::reaction::ReactionType;
    use fanout_core::types::user::User;
    use fanout_store::MemStore;

    #[tokio::test]
    async fn reaction_like_notifies_the_post_owner() {
        let connections: SharedStore<Connection> = Arc::new(MemStore::new());
        let objects: SharedStore<Object> = Arc::new(MemStore::new());
        let users: SharedStore<User> = Arc::new(MemStore::new());
        connections.setup("app_42").await.unwrap();
        objects.setup("app_42").await.unwrap();
        users.setup("app_42").await.unwrap();

        let owner = users
            .put(
                "app_42",
                User {
                    username: "owner".into(),
                    ..User::default()
                },
            )
            .await
            .unwrap();
        let reactor = users
            .put(
                "app_42",
                User {
                    username: "rea".into(),
                    firstname: "Rea".into(),
                    ..User::default()
                },
            )
            .await
            .unwrap();
        let post = objects
            .put(
                "app_42",
                Object {
                    owner_id: owner.id,
                    kind: TYPE_POST.into(),
                    ..Object::default()
                },
            )
            .await
            .unwrap();

        let pipelines = Pipelines::new(connections, objects, users);
        let messages = pipelines
            .reaction(
                &App {
                    id: 42,
                    name: "demo".into(),
                    ..App::default()
                },
                &StateChange {
                    ack_id: "a-1".into(),
                    id: "m-1".into(),
                    namespace: "app_42".into(),
                    new: Some(Reaction {
                        owner_id: reactor.id,
                        object_id: post.id,
                        kind: ReactionType::Like,
                        ..Reaction::default()
                    }),
                    old: None,
                    sent_at: Utc::now(),
                },
                &defaults::default_rules(),
            )
            .await
            .unwrap();

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].recipient, owner.id);
        assert_eq!(messages[0].messages["en"], "Rea liked your Post.");
        assert_eq!(messages[0].urn, format!("tapglue/posts/{}", post.id));
    }
}
