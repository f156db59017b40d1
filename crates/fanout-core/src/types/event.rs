// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Events record user interactions, likes among them. Visibility levels
//! serialize as their numeric wire values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FanoutError;
use crate::traits::store::Entity;
use crate::types::{flag_matches, in_list};

pub const TYPE_LIKE: &str = "tg_like";

/// Audience scope of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Visibility {
    Private,
    Connection,
    Public,
    Global,
}

impl From<Visibility> for u8 {
    fn from(v: Visibility) -> u8 {
        match v {
            Visibility::Private => 10,
            Visibility::Connection => 20,
            Visibility::Public => 30,
            Visibility::Global => 40,
        }
    }
}

impl TryFrom<u8> for Visibility {
    type Error = String;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            10 => Ok(Visibility::Private),
            20 => Ok(Visibility::Connection),
            30 => Ok(Visibility::Public),
            40 => Ok(Visibility::Global),
            other => Err(format!("unknown visibility {other}")),
        }
    }
}

/// Reference to the entity an event acts on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Reference to an externally-managed object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalObject {
    pub id: String,
}

/// A recorded user interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: u64,
    pub user_id: u64,
    pub object_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Target>,
    #[serde(rename = "type")]
    pub kind: String,
    pub enabled: bool,
    pub owned: bool,
    pub visibility: Visibility,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<ExternalObject>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for Event {
    fn default() -> Self {
        Event {
            id: 0,
            user_id: 0,
            object_id: 0,
            target: None,
            kind: String::new(),
            enabled: true,
            owned: false,
            visibility: Visibility::Private,
            object: None,
            created_at: DateTime::UNIX_EPOCH,
            updated_at: DateTime::UNIX_EPOCH,
        }
    }
}

/// Filters to narrow down event queries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ids: Vec<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub object_ids: Vec<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owned: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub user_ids: Vec<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub visibilities: Vec<Visibility>,
}

impl Entity for Event {
    type QueryOptions = QueryOptions;

    const KIND: &'static str = "event";
    const FLAKE_KIND: &'static str = "events";

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

        if self.user_id == 0 {
            return Err(FanoutError::invalid(Self::KIND, "user_id must be set"));
        }

        Ok(())
    }

    fn matches(&self, opts: &QueryOptions) -> bool {
        flag_matches(opts.enabled, self.enabled)
            && flag_matches(opts.owned, self.owned)
            && in_list(&opts.ids, &self.id)
            && in_list(&opts.object_ids, &self.object_id)
            && in_list(&opts.types, &self.kind)
            && in_list(&opts.user_ids, &self.user_id)
            && in_list(&opts.visibilities, &self.visibility)
    }
}
