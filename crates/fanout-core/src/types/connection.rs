// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connections form the social graph edges. They carry no surrogate id; the
//! (from, to, type) triple identifies a record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::FanoutError;
use crate::traits::store::Entity;
use crate::types::in_list;

/// Edge flavour between two users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ConnectionType {
    Follow,
    Friend,
}

/// Lifecycle state of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ConnectionState {
    Pending,
    Confirmed,
    Rejected,
}

/// A directed edge between two users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    #[serde(rename = "user_from_id")]
    pub from_id: u64,
    #[serde(rename = "user_to_id")]
    pub to_id: u64,
    #[serde(rename = "type")]
    pub kind: ConnectionType,
    pub state: ConnectionState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for Connection {
    fn default() -> Self {
        Connection {
            from_id: 0,
            to_id: 0,
            kind: ConnectionType::Follow,
            state: ConnectionState::Pending,
            created_at: DateTime::UNIX_EPOCH,
            updated_at: DateTime::UNIX_EPOCH,
        }
    }
}

/// Filters to narrow down connection queries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryOptions {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub from_ids: Vec<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub states: Vec<ConnectionState>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub to_ids: Vec<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<ConnectionType>,
}

impl Entity for Connection {
    type QueryOptions = QueryOptions;

    const KIND: &'static str = "connection";
    const FLAKE_KIND: &'static str = "connections";
    const HAS_ID: bool = false;

    fn id(&self) -> u64 {
        0
    }

    fn set_id(&mut self, _id: u64) {}

    fn touch(&mut self, now: DateTime<Utc>, new_record: bool) {
        if new_record {
            self.created_at = now;
        }
        self.updated_at = now;
    }

    fn validate(&self) -> Result<(), FanoutError> {
        if self.from_id == 0 || self.to_id == 0 {
            return Err(FanoutError::invalid(
                Self::KIND,
                "from_id and to_id must be set",
            ));
        }

        if self.from_id == self.to_id {
            return Err(FanoutError::invalid(Self::KIND, "cannot connect to self"));
        }

        Ok(())
    }

    fn matches(&self, opts: &QueryOptions) -> bool {
        in_list(&opts.from_ids, &self.from_id)
            && in_list(&opts.states, &self.state)
            && in_list(&opts.to_ids, &self.to_id)
            && in_list(&opts.types, &self.kind)
    }

    fn same_record(&self, other: &Self) -> bool {
        self.from_id == other.from_id && self.to_id == other.to_id && self.kind == other.kind
    }
}
