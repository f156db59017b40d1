// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Apps are the tenant boundary; every other entity lives inside an app's
//! namespace. The pipeline only ever reads apps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FanoutError;
use crate::namespace::app_namespace;
use crate::traits::store::Entity;
use crate::types::{flag_matches, in_list};

/// An org-owned data container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct App {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub token: String,
    pub backend_token: String,
    pub enabled: bool,
    pub in_production: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl App {
    /// The namespace slicing all data related to this app.
    pub fn namespace(&self) -> String {
        app_namespace(self.id)
    }
}

impl Default for App {
    fn default() -> Self {
        App {
            id: 0,
            name: String::new(),
            description: String::new(),
            token: String::new(),
            backend_token: String::new(),
            enabled: true,
            in_production: false,
            created_at: DateTime::UNIX_EPOCH,
            updated_at: DateTime::UNIX_EPOCH,
        }
    }
}

/// Filters to narrow down app queries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ids: Vec<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tokens: Vec<String>,
}

impl Entity for App {
    type QueryOptions = QueryOptions;

    const KIND: &'static str = "app";
    const FLAKE_KIND: &'static str = "apps";

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

        Ok(())
    }

    fn matches(&self, opts: &QueryOptions) -> bool {
        flag_matches(opts.enabled, self.enabled)
            && in_list(&opts.ids, &self.id)
            && in_list(&opts.tokens, &self.token)
    }
}
