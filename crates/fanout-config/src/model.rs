// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use serde::{Deserialize, Serialize};

/// Top-level worker configuration.
///
/// Loaded from `fanout.toml` with `FANOUT_` environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FanoutConfig {
    /// Push service and queue credentials.
    #[serde(default)]
    pub aws: AwsConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub postgres: PostgresConfig,

    /// Queue polling settings.
    #[serde(default)]
    pub queue: QueueConfig,

    /// Telemetry endpoint and logging settings.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Credentials and region for the hosted push and queue services.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AwsConfig {
    /// Access key id. `None` falls back to the ambient credential chain.
    #[serde(default)]
    pub id: Option<String>,

    /// Secret access key. `None` falls back to the ambient credential chain.
    #[serde(default)]
    pub secret: Option<String>,

    /// Service region.
    #[serde(default = "default_region")]
    pub region: String,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            id: None,
            secret: None,
            region: default_region(),
        }
    }
}

fn default_region() -> String {
    "us-east-1".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PostgresConfig {
    /// Connection URL for the entity store.
    #[serde(default = "default_postgres_url")]
    pub url: String,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: default_postgres_url(),
        }
    }
}

fn default_postgres_url() -> String {
    "postgres://127.0.0.1:5432/fanout?sslmode=disable&connect_timeout=5".to_string()
}

/// Queue polling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QueueConfig {
    /// Long-poll window in seconds. The queue service caps long polls at
    /// [`MAX_WAIT_SECONDS`].
    #[serde(default = "default_wait_seconds")]
    pub wait_seconds: u64,

    /// Visibility timeout for unacked messages in seconds.
    #[serde(default = "default_visibility_seconds")]
    pub visibility_seconds: u64,
}

/// Upper bound on the long-poll window.
pub const MAX_WAIT_SECONDS: u64 = 20;

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            wait_seconds: default_wait_seconds(),
            visibility_seconds: default_visibility_seconds(),
        }
    }
}

fn default_wait_seconds() -> u64 {
    10
}

fn default_visibility_seconds() -> u64 {
    60
}

/// Telemetry endpoint and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfig {
    /// Listen address for /health and /metrics. The `:port` shorthand binds
    /// all interfaces.
    #[serde(default = "default_telemetry_addr")]
    pub addr: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            addr: default_telemetry_addr(),
            log_level: default_log_level(),
        }
    }
}

fn default_telemetry_addr() -> String {
    ":9001".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}
