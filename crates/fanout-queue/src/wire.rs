// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire format for state-change messages.
//!
//! Bodies are JSON envelopes carrying the tenant namespace and the old and
//! new side of the change. The send time travels out of band as a message
//! attribute, formatted the way the legacy producers did: `2006-01-02
//! 15:04:05.999999999 -0700 MST` with a trailing zone name.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use fanout_core::error::FanoutError;

/// Message body of a state change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: serde::Deserialize<'de>"))]
pub struct Envelope<T> {
    pub namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new: Option<T>,
}

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    namespace: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    old: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    new: Option<&'a T>,
}

pub fn encode_body<T: Serialize>(
    namespace: &str,
    old: Option<&T>,
    new: Option<&T>,
) -> Result<String, FanoutError> {
    serde_json::to_string(&EnvelopeRef {
        namespace,
        old,
        new,
    })
    .map_err(|e| FanoutError::Queue {
        message: "encoding state change body".into(),
        source: Some(Box::new(e)),
    })
}

pub fn decode_body<T: DeserializeOwned>(body: &str) -> Result<Envelope<T>, FanoutError> {
    serde_json::from_str(body).map_err(|e| FanoutError::Queue {
        message: "decoding state change body".into(),
        source: Some(Box::new(e)),
    })
}

/// Formats a send time for the `SentAt` message attribute.
pub fn format_sent_at(at: DateTime<Utc>) -> String {
    format!("{} +0000 UTC", at.format("%Y-%m-%d %H:%M:%S%.9f"))
}

/// Parses a `SentAt` attribute value.
///
/// The trailing zone name is redundant with the numeric offset and is
/// dropped before parsing.
pub fn parse_sent_at(raw: &str) -> Result<DateTime<Utc>, FanoutError> {
    let trimmed = match raw.rsplit_once(' ') {
        Some((rest, zone)) if zone.chars().all(|c| c.is_ascii_alphabetic()) => rest,
        _ => raw,
    };

    DateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f %z")
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| FanoutError::Queue {
            message: format!("parsing SentAt '{raw}': {e}"),
            source: None,
        })
}
