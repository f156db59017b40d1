// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Merge order: compiled defaults, then `./fanout.toml`, then `FANOUT_`
//! environment variables.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::FanoutConfig;

/// Load configuration from the local TOML file with env var overrides.
pub fn load_config() -> Result<FanoutConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FanoutConfig::default()))
        .merge(Toml::file("fanout.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no file lookup).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<FanoutConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FanoutConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<FanoutConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FanoutConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` so underscore-containing
/// key names stay intact: `FANOUT_QUEUE_WAIT_SECONDS` must map to
/// `queue.wait_seconds`, not `queue.wait.seconds`.
fn env_provider() -> Env {
    Env::prefixed("FANOUT_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: FANOUT_QUEUE_WAIT_SECONDS -> "queue_wait_seconds"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("aws_", "aws.", 1)
            .replacen("postgres_", "postgres.", 1)
            .replacen("queue_", "queue.", 1)
            .replacen("telemetry_", "telemetry.", 1);
        mapped.into()
    })
}
