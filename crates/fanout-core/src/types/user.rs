// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Users, read for personalization: templates substitute the display name.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FanoutError;
use crate::traits::store::Entity;
use crate::types::{flag_matches, in_list};

/// A member of an app's social graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub enabled: bool,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// The name substituted into message templates: the first name when
    /// present, otherwise the username.
    pub fn display_name(&self) -> &str {
        if self.firstname.is_empty() {
            &self.username
        } else {
            &self.firstname
        }
    }
}

impl Default for User {
    fn default() -> Self {
        User {
            id: 0,
            username: String::new(),
            firstname: String::new(),
            lastname: String::new(),
            email: String::new(),
            enabled: true,
            deleted: false,
            created_at: DateTime::UNIX_EPOCH,
            updated_at: DateTime::UNIX_EPOCH,
        }
    }
}

/// Filters to narrow down user queries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ids: Vec<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub usernames: Vec<String>,
}

impl Entity for User {
    type QueryOptions = QueryOptions;

    const KIND: &'static str = "user";
    const FLAKE_KIND: &'static str = "users";

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
        if self.username.is_empty() {
            return Err(FanoutError::invalid(Self::KIND, "username must be set"));
        }

        Ok(())
    }

    fn matches(&self, opts: &QueryOptions) -> bool {
        flag_matches(opts.deleted, self.deleted)
            && flag_matches(opts.enabled, self.enabled)
            && in_list(&opts.ids, &self.id)
            && in_list(&opts.usernames, &self.username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_prefers_firstname() {
        let user = User {
            username: "alice".into(),
            firstname: "Bob".into(),
            ..User::default()
        };
        assert_eq!(user.display_name(), "Bob");
    }

    #[test]
    fn display_name_falls_back_to_username() {
        let user = User {
            username: "alice".into(),
            ..User::default()
        };
        assert_eq!(user.display_name(), "alice");
    }

    #[test]
    fn validate_requires_username() {
        assert!(User::default().validate().is_err());
        assert!(
            User {
                username: "alice".into(),
                ..User::default()
            }
            .validate()
            .is_ok()
        );
    }
}
