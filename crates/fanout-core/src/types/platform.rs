// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Platform registrations link an app to a push-service application per
//! ecosystem. The scheme prefixes deep-link URNs in delivered payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FanoutError;
use crate::traits::store::Entity;
use crate::types::{Ecosystem, flag_matches, in_list};

/// A per-ecosystem push application registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub id: u64,
    pub app_id: u64,
    pub arn: String,
    pub ecosystem: Ecosystem,
    pub name: String,
    pub scheme: String,
    pub active: bool,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for Platform {
    fn default() -> Self {
        Platform {
            id: 0,
            app_id: 0,
            arn: String::new(),
            ecosystem: Ecosystem::Ios,
            name: String::new(),
            scheme: String::new(),
            active: true,
            deleted: false,
            created_at: DateTime::UNIX_EPOCH,
            updated_at: DateTime::UNIX_EPOCH,
        }
    }
}

/// Filters to narrow down platform queries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub app_ids: Vec<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ecosystems: Vec<Ecosystem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ids: Vec<u64>,
}

impl Entity for Platform {
    type QueryOptions = QueryOptions;

    const KIND: &'static str = "platform";
    const FLAKE_KIND: &'static str = "platforms";

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
        if self.arn.is_empty() {
            return Err(FanoutError::invalid(Self::KIND, "arn must be set"));
        }

        if self.name.is_empty() {
            return Err(FanoutError::invalid(Self::KIND, "name must be set"));
        }

        if self.scheme.is_empty() {
            return Err(FanoutError::invalid(Self::KIND, "scheme must be set"));
        }

        Ok(())
    }

    fn matches(&self, opts: &QueryOptions) -> bool {
        flag_matches(opts.active, self.active)
            && flag_matches(opts.deleted, self.deleted)
            && in_list(&opts.app_ids, &self.app_id)
            && in_list(&opts.arns, &self.arn)
            && in_list(&opts.ecosystems, &self.ecosystem)
            && in_list(&opts.ids, &self.id)
    }
}
