// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reactions are typed responses attached to an object.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::FanoutError;
use crate::traits::store::Entity;
use crate::types::{flag_matches, in_list};

/// Flavour of a reaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReactionType {
    Like,
    Love,
    Haha,
    Wow,
    Sad,
    Angry,
}

/// A typed response to an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    pub id: u64,
    pub owner_id: u64,
    pub object_id: u64,
    #[serde(rename = "type")]
    pub kind: ReactionType,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for Reaction {
    fn default() -> Self {
        Reaction {
            id: 0,
            owner_id: 0,
            object_id: 0,
            kind: ReactionType::Like,
            deleted: false,
            created_at: DateTime::UNIX_EPOCH,
            updated_at: DateTime::UNIX_EPOCH,
        }
    }
}

/// Filters to narrow down reaction queries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ids: Vec<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub object_ids: Vec<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub owner_ids: Vec<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<ReactionType>,
}

impl Entity for Reaction {
    type QueryOptions = QueryOptions;

    const KIND: &'static str = "reaction";
    const FLAKE_KIND: &'static str = "reactions";

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
        if self.owner_id == 0 {
            return Err(FanoutError::invalid(Self::KIND, "owner_id must be set"));
        }

        if self.object_id == 0 {
            return Err(FanoutError::invalid(Self::KIND, "object_id must be set"));
        }

        Ok(())
    }

    fn matches(&self, opts: &QueryOptions) -> bool {
        flag_matches(opts.deleted, self.deleted)
            && in_list(&opts.ids, &self.id)
            && in_list(&opts.object_ids, &self.object_id)
            && in_list(&opts.owner_ids, &self.owner_id)
            && in_list(&opts.types, &self.kind)
    }
}
