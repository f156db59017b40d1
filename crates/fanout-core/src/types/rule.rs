// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rules describe which state changes produce notifications and for whom.
//!
//! A rule's criteria pairs filters over the old and new side of a change.
//! Matching is asymmetric on purpose: a change with no new side is a
//! deletion and never fires. The old side is tri-state: `old_absent` demands
//! a creation, a set `old` filter demands a prior state that matches, and
//! neither means the prior state is irrelevant.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::FanoutError;
use crate::traits::store::Entity;
use crate::types::{Ecosystem, connection, event, flag_matches, in_list, object, reaction};

/// Entity kind a rule listens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RuleType {
    Connection,
    Event,
    Object,
    Reaction,
}

/// Filters over the old and new side of a state change, typed per entity
/// kind so a rule can never be matched against the wrong entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Criteria {
    Connection {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        new: Option<connection::QueryOptions>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        old: Option<connection::QueryOptions>,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        old_absent: bool,
    },
    Event {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        new: Option<event::QueryOptions>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        old: Option<event::QueryOptions>,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        old_absent: bool,
    },
    Object {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        new: Option<object::QueryOptions>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        old: Option<object::QueryOptions>,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        old_absent: bool,
    },
    Reaction {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        new: Option<reaction::QueryOptions>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        old: Option<reaction::QueryOptions>,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        old_absent: bool,
    },
}

fn pair_matches<T: Entity>(
    new_opts: &Option<T::QueryOptions>,
    old_opts: &Option<T::QueryOptions>,
    old_absent: bool,
    new: Option<&T>,
    old: Option<&T>,
) -> bool {
    // No new side means deletion, which never fires a rule.
    let Some(new) = new else {
        return false;
    };

    if old_absent && old.is_some() {
        return false;
    }

    let new_ok = match new_opts {
        Some(opts) => new.matches(opts),
        None => true,
    };

    let old_ok = match old_opts {
        Some(opts) => old.is_some_and(|o| o.matches(opts)),
        None => true,
    };

    new_ok && old_ok
}

impl Criteria {
    pub fn kind(&self) -> RuleType {
        match self {
            Criteria::Connection { .. } => RuleType::Connection,
            Criteria::Event { .. } => RuleType::Event,
            Criteria::Object { .. } => RuleType::Object,
            Criteria::Reaction { .. } => RuleType::Reaction,
        }
    }

    pub fn match_connection(
        &self,
        old: Option<&connection::Connection>,
        new: Option<&connection::Connection>,
    ) -> bool {
        match self {
            Criteria::Connection {
                new: new_opts,
                old: old_opts,
                old_absent,
            } => pair_matches(new_opts, old_opts, *old_absent, new, old),
            _ => false,
        }
    }

    pub fn match_event(&self, old: Option<&event::Event>, new: Option<&event::Event>) -> bool {
        match self {
            Criteria::Event {
                new: new_opts,
                old: old_opts,
                old_absent,
            } => pair_matches(new_opts, old_opts, *old_absent, new, old),
            _ => false,
        }
    }

    pub fn match_object(&self, old: Option<&object::Object>, new: Option<&object::Object>) -> bool {
        match self {
            Criteria::Object {
                new: new_opts,
                old: old_opts,
                old_absent,
            } => pair_matches(new_opts, old_opts, *old_absent, new, old),
            _ => false,
        }
    }

    pub fn match_reaction(
        &self,
        old: Option<&reaction::Reaction>,
        new: Option<&reaction::Reaction>,
    ) -> bool {
        match self {
            Criteria::Reaction {
                new: new_opts,
                old: old_opts,
                old_absent,
            } => pair_matches(new_opts, old_opts, *old_absent, new, old),
            _ => false,
        }
    }
}

/// How the set of notified users is derived from the matched change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "query", rename_all = "snake_case")]
pub enum RecipientQuery {
    /// The user on the from side of a connection.
    UserFrom,
    /// The user on the to side of a connection.
    UserTo,
    /// Followers and friends of the acting user. The owner of the parent
    /// object can be carved out so a second recipient entry addresses them
    /// with a different template.
    Audience {
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        exclude_parent_owner: bool,
    },
    /// Owner of the parent object the change is attached to.
    ParentOwner,
}

/// Which user's display name fills the message template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateSubject {
    /// The user who caused the change.
    #[default]
    Origin,
    /// The user the change is directed at.
    Target,
}

/// A recipient set with its localized templates and deep-link URN pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipient {
    #[serde(flatten)]
    pub query: RecipientQuery,
    #[serde(default)]
    pub subject: TemplateSubject,
    pub urn: String,
    pub templates: HashMap<String, String>,
}

/// A stored notification rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub id: u64,
    pub name: String,
    pub active: bool,
    pub deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ecosystem: Option<Ecosystem>,
    pub criteria: Criteria,
    pub recipients: Vec<Recipient>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Rule {
    pub fn kind(&self) -> RuleType {
        self.criteria.kind()
    }
}

impl Default for Rule {
    fn default() -> Self {
        Rule {
            id: 0,
            name: String::new(),
            active: true,
            deleted: false,
            ecosystem: None,
            criteria: Criteria::Connection {
                new: None,
                old: None,
                old_absent: false,
            },
            recipients: Vec::new(),
            created_at: DateTime::UNIX_EPOCH,
            updated_at: DateTime::UNIX_EPOCH,
        }
    }
}

/// Filters to narrow down rule queries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ids: Vec<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<RuleType>,
}

impl Entity for Rule {
    type QueryOptions = QueryOptions;

    const KIND: &'static str = "rule";
    const FLAKE_KIND: &'static str = "rules";

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    fn touch(&mut self, now: DateTime<Utc>, new_record: bool) {
        if new_record {
            self.created_at = now;
        }
        self.updated_at = now;
    }

    fn validate(&self) -> Result<(), FanoutError> {
        if self.name.is_empty() {
            return Err(FanoutError::invalid(Self::KIND, "name must be set"));
        }

        if self.recipients.is_empty() {
            return Err(FanoutError::invalid(
                Self::KIND,
                "at least one recipient must be set",
            ));
        }

        Ok(())
    }

    fn matches(&self, opts: &QueryOptions) -> bool {
        flag_matches(opts.active, self.active)
            && flag_matches(opts.deleted, self.deleted)
            && in_list(&opts.ids, &self.id)
            && in_list(&opts.types, &self.kind())
    }
}
