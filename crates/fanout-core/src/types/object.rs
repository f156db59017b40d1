// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Objects are the content entities, posts and comments chiefly. Comments
//! point at their parent post through `object_id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FanoutError;
use crate::traits::store::Entity;
use crate::types::{flag_matches, in_list};

pub const TYPE_POST: &str = "tg_post";
pub const TYPE_COMMENT: &str = "tg_comment";

/// A piece of content owned by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Object {
    pub id: u64,
    pub owner_id: u64,
    pub object_id: u64,
    #[serde(rename = "type")]
    pub kind: String,
    pub owned: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Object {
    pub fn is_post(&self) -> bool {
        self.kind == TYPE_POST
    }

    pub fn is_comment(&self) -> bool {
        self.kind == TYPE_COMMENT
    }
}

impl Default for Object {
    fn default() -> Self {
        Object {
            id: 0,
            owner_id: 0,
            object_id: 0,
            kind: String::new(),
            owned: true,
            tags: Vec::new(),
            deleted: false,
            created_at: DateTime::UNIX_EPOCH,
            updated_at: DateTime::UNIX_EPOCH,
        }
    }
}

/// Filters to narrow down object queries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub object_ids: Vec<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owned: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub owner_ids: Vec<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
}

impl Entity for Object {
    type QueryOptions = QueryOptions;

    const KIND: &'static str = "object";
    const FLAKE_KIND: &'static str = "objects";

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
        if self.kind.is_empty() {
            return Err(FanoutError::invalid(Self::KIND, "type must be set"));
        }

        if self.owner_id == 0 {
            return Err(FanoutError::invalid(Self::KIND, "owner_id must be set"));
        }

        Ok(())
    }

    fn matches(&self, opts: &QueryOptions) -> bool {
        flag_matches(opts.deleted, self.deleted)
            && flag_matches(opts.owned, self.owned)
            && opts.id.is_none_or(|want| want == self.id)
            && in_list(&opts.object_ids, &self.object_id)
            && in_list(&opts.owner_ids, &self.owner_id)
            && opts.tags.iter().all(|t| self.tags.contains(t))
            && in_list(&opts.types, &self.kind)
    }
}
