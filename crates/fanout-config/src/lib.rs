// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the fanout worker.
//!
//! Provides layered TOML configuration with strict validation
//! (`deny_unknown_fields`) and `FANOUT_` environment variable overrides.
//!
//! # Usage
//!
//! ```no_run
//! let config = fanout_config::load().expect("config errors");
//! println!("telemetry on {}", config.telemetry.addr);
//! ```

pub mod loader;
pub mod model;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{
    AwsConfig, FanoutConfig, MAX_WAIT_SECONDS, PostgresConfig, QueueConfig, TelemetryConfig,
};

use fanout_core::error::FanoutError;

/// Load configuration and map failures into the shared error type.
///
/// This is the high-level entry point used by the binary.
pub fn load() -> Result<FanoutConfig, FanoutError> {
    let config = loader::load_config().map_err(|err| FanoutError::Config(err.to_string()))?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &FanoutConfig) -> Result<(), FanoutError> {
    if config.queue.wait_seconds > MAX_WAIT_SECONDS {
        return Err(FanoutError::Config(format!(
            "queue.wait_seconds is {}, the queue service caps long polls at {MAX_WAIT_SECONDS}s",
            config.queue.wait_seconds
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_caps_the_wait_window() {
        let mut config = FanoutConfig::default();
        assert!(validate(&config).is_ok());

        config.queue.wait_seconds = 21;
        assert!(validate(&config).is_err());
    }
}
