// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tenant namespace derivation and parsing.
//!
//! All per-app data is scoped by a namespace of the form `app_<decimal-id>`.
//! Apps and platforms themselves live in the fixed top-level namespace
//! [`NAMESPACE_DEFAULT`].

use crate::error::FanoutError;

/// Top-level namespace isolating apps and platform registrations.
pub const NAMESPACE_DEFAULT: &str = "tg";

/// Returns the namespace scoping all data of the given app.
pub fn app_namespace(app_id: u64) -> String {
    format!("app_{app_id}")
}

/// Extracts the app id from a namespace of the form `<prefix>_<decimal>`.
pub fn app_id(namespace: &str) -> Result<u64, FanoutError> {
    let Some((_, id)) = namespace.split_once('_') else {
        return Err(FanoutError::InvalidNamespace(namespace.to_owned()));
    };

    id.parse::<u64>()
        .map_err(|_| FanoutError::InvalidNamespace(namespace.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_namespace_round_trip() {
        assert_eq!(app_namespace(42), "app_42");
        assert_eq!(app_id("app_42").unwrap(), 42);
    }

    #[test]
    fn app_id_rejects_non_decimal() {
        assert!(matches!(
            app_id("app_abc"),
            Err(FanoutError::InvalidNamespace(ns)) if ns == "app_abc"
        ));
    }

    #[test]
    fn app_id_rejects_missing_separator() {
        assert!(matches!(
            app_id("app42"),
            Err(FanoutError::InvalidNamespace(_))
        ));
    }
}
