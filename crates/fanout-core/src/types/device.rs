// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Devices carry push tokens and the endpoint registration that results from
//! syncing them with the push service.

use chrono::{DateTime, Utc};
use language_tags::LanguageTag;
use serde::{Deserialize, Serialize};

use crate::error::FanoutError;
use crate::traits::store::Entity;
use crate::types::{Ecosystem, flag_matches, in_list};

/// Fallback language when a device's tag carries no known translation.
pub const DEFAULT_LANGUAGE: &str = "en";

/// A user's registered device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: u64,
    pub user_id: u64,
    pub device_id: String,
    pub ecosystem: Ecosystem,
    pub token: String,
    pub endpoint_arn: String,
    pub language: String,
    pub deleted: bool,
    pub disabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for Device {
    fn default() -> Self {
        Device {
            id: 0,
            user_id: 0,
            device_id: String::new(),
            ecosystem: Ecosystem::Ios,
            token: String::new(),
            endpoint_arn: String::new(),
            language: DEFAULT_LANGUAGE.to_owned(),
            deleted: false,
            disabled: false,
            created_at: DateTime::UNIX_EPOCH,
            updated_at: DateTime::UNIX_EPOCH,
        }
    }
}

/// Filters to narrow down device queries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub device_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ecosystems: Vec<Ecosystem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub endpoint_arns: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ids: Vec<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub user_ids: Vec<u64>,
}

impl Entity for Device {
    type QueryOptions = QueryOptions;

    const KIND: &'static str = "device";
    const FLAKE_KIND: &'static str = "devices";

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
        if self.device_id.is_empty() {
            return Err(FanoutError::invalid(Self::KIND, "device_id must be set"));
        }

        if self.token.is_empty() {
            return Err(FanoutError::invalid(Self::KIND, "token must be set"));
        }

        if LanguageTag::parse(&self.language).is_err() {
            return Err(FanoutError::invalid(
                Self::KIND,
                "language must be a valid BCP 47 tag",
            ));
        }

        if self.user_id == 0 {
            return Err(FanoutError::invalid(Self::KIND, "user_id must be set"));
        }

        Ok(())
    }

    fn matches(&self, opts: &QueryOptions) -> bool {
        flag_matches(opts.deleted, self.deleted)
            && flag_matches(opts.disabled, self.disabled)
            && in_list(&opts.device_ids, &self.device_id)
            && in_list(&opts.ecosystems, &self.ecosystem)
            && in_list(&opts.endpoint_arns, &self.endpoint_arn)
            && in_list(&opts.ids, &self.id)
            && in_list(&opts.user_ids, &self.user_id)
    }
}
