// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fan-out pipelines: one matched state change in, addressed messages out.
//!
//! Each entity kind has its own pipeline method on [`Pipelines`]. They share
//! the same skeleton: match the active rules against the change, resolve the
//! acting users, then expand every matched rule's recipient entries into
//! [`Message`] values. Lookup failures abort the whole change so it gets
//! redelivered; a change that matches nothing yields an empty vec.

use std::collections::HashSet;

use fanout_core::error::FanoutError;
use fanout_core::traits::channel::Message;
use fanout_core::traits::store::SharedStore;
use fanout_core::types::connection::Connection;
use fanout_core::types::object::{self, Object};
use fanout_core::types::rule::{Rule, TemplateSubject};
use fanout_core::types::user::{self, User};

pub mod connections;
pub mod defaults;
pub mod engine;
pub mod events;
pub mod objects;
pub mod reactions;
pub mod recipients;
pub mod template;

pub use engine::RuleEngine;
pub use recipients::RecipientContext;
pub use template::UrnContext;

/// The four per-kind pipelines, sharing their store dependencies.
pub struct Pipelines {
    connections: SharedStore<Connection>,
    objects: SharedStore<Object>,
    users: SharedStore<User>,
}

impl Pipelines {
    pub fn new(
        connections: SharedStore<Connection>,
        objects: SharedStore<Object>,
        users: SharedStore<User>,
    ) -> Self {
        Pipelines {
            connections,
            objects,
            users,
        }
    }

    /// Fetches an enabled, not-deleted user or fails with not-found.
    pub(crate) async fn user(&self, namespace: &str, id: u64) -> Result<User, FanoutError> {
        let users = self
            .users
            .query(
                namespace,
                user::QueryOptions {
                    deleted: Some(false),
                    enabled: Some(true),
                    ids: vec![id],
                    ..user::QueryOptions::default()
                },
            )
            .await?;

        users
            .into_iter()
            .next()
            .ok_or_else(|| FanoutError::not_found("user", format!("id {id}")))
    }

    /// Fetches the parent object a change hangs off, or fails with
    /// not-found; a dangling parent reference is a data bug.
    pub(crate) async fn parent(&self, namespace: &str, id: u64) -> Result<Object, FanoutError> {
        let objects = self
            .objects
            .query(
                namespace,
                object::QueryOptions {
                    deleted: Some(false),
                    id: Some(id),
                    ..object::QueryOptions::default()
                },
            )
            .await?;

        objects
            .into_iter()
            .next()
            .ok_or_else(|| FanoutError::not_found("object", format!("id {id}")))
    }

    /// Expands one matched rule into messages.
    ///
    /// De-duplication is first-wins across the rule's recipient entries, so
    /// an owner carved out of the audience keeps the owner-variant template
    /// from the later entry.
    pub(crate) async fn expand(
        &self,
        namespace: &str,
        rule: &Rule,
        ctx: &RecipientContext,
        urn_ctx: &UrnContext,
        origin: &User,
        target: Option<&User>,
    ) -> Result<Vec<Message>, FanoutError> {
        let mut seen = HashSet::new();
        let mut messages = Vec::new();

        for recipient in &rule.recipients {
            let ids =
                recipients::resolve(&self.connections, namespace, &recipient.query, ctx).await?;

            let name = match recipient.subject {
                TemplateSubject::Origin => origin.display_name(),
                TemplateSubject::Target => target.unwrap_or(origin).display_name(),
            };
            let urn = template::render_urn(&recipient.urn, urn_ctx);
            let texts: std::collections::HashMap<String, String> = recipient
                .templates
                .iter()
                .map(|(lang, tmpl)| (lang.clone(), template::render(tmpl, name)))
                .collect();

            for id in ids {
                if seen.insert(id) {
                    messages.push(Message {
                        recipient: id,
                        urn: urn.clone(),
                        messages: texts.clone(),
                    });
                }
            }
        }

        Ok(messages)
    }
}
