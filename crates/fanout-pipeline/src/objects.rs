// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Object pipeline: new posts and comments. Comments resolve their parent
//! post so the post owner gets the owner-variant template.

use fanout_core::error::FanoutError;
use fanout_core::traits::channel::Message;
use fanout_core::traits::source::StateChange;
use fanout_core::types::app::App;
use fanout_core::types::object::Object;
use fanout_core::types::rule::Rule;

use crate::Pipelines;
use crate::recipients::RecipientContext;
use crate::template::UrnContext;

impl Pipelines {
    /// Expands an object state change into addressed messages.
    pub async fn object(
        &self,
        app: &App,
        change: &StateChange<Object>,
        rules: &[Rule],
    ) -> Result<Vec<Message>, FanoutError> {
        let Some(new) = change.new.as_ref() else {
            return Ok(Vec::new());
        };

        let matched: Vec<&Rule> = rules
            .iter()
            .filter(|r| r.criteria.match_object(change.old.as_ref(), Some(new)))
            .collect();
        if matched.is_empty() {
            return Ok(Vec::new());
        }

        let namespace = app.namespace();
        let origin = self.user(&namespace, new.owner_id).await?;

        let parent = if new.is_comment() && new.object_id != 0 {
            Some(self.parent(&namespace, new.object_id).await?)
        } else {
            None
        };

        let ctx = RecipientContext {
            from: None,
            to: None,
            origin: new.owner_id,
            parent_owner: parent.as_ref().map(|p| p.owner_id),
        };
        let urn_ctx = UrnContext {
            origin_id: new.owner_id,
            id: new.id,
            parent_id: parent.as_ref().map(|p| p.id).unwrap_or_default(),
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
