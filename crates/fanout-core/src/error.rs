// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared across the fanout pipeline.

use thiserror::Error;

/// The primary error type used across all fanout capability traits and
/// pipeline operations.
#[derive(Debug, Error)]
pub enum FanoutError {
    /// Configuration errors (invalid TOML, missing required fields).
    #[error("configuration error: {0}")]
    Config(String),

    /// Store backend errors (connection, query failure, serialization).
    #[error("store error: {source}")]
    Store {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Queue transport errors (receive, send, codec failure).
    #[error("queue error: {message}")]
    Queue {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Delivery channel errors (push service interaction failed).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The long-poll window closed without a message. Consumer loops treat
    /// this as "retry immediately", never as a failure.
    #[error("source empty")]
    EmptySource,

    /// A referenced entity does not exist.
    #[error("{kind} not found: {detail}")]
    NotFound { kind: &'static str, detail: String },

    /// The push service rejected a single publish (HTTP 400 class).
    #[error("delivery failure")]
    DeliveryFailure,

    /// The push service reports the endpoint as disabled.
    #[error("endpoint disabled")]
    EndpointDisabled,

    /// The push service no longer knows the endpoint ARN.
    #[error("endpoint not found")]
    EndpointNotFound,

    /// Validation failure on a `put`.
    #[error("invalid {kind}: {reason}")]
    InvalidEntity { kind: &'static str, reason: String },

    /// The storage backend has no schema for the namespace yet.
    #[error("relation not found for namespace '{namespace}'")]
    RelationNotFound { namespace: String },

    /// Namespace string did not match `<prefix>_<decimal>`.
    #[error("invalid namespace '{0}'")]
    InvalidNamespace(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl FanoutError {
    /// Constructs a [`FanoutError::NotFound`] for the given entity kind.
    pub fn not_found(kind: &'static str, detail: impl Into<String>) -> Self {
        FanoutError::NotFound {
            kind,
            detail: detail.into(),
        }
    }

    /// Constructs a [`FanoutError::InvalidEntity`] for the given entity kind.
    pub fn invalid(kind: &'static str, reason: impl Into<String>) -> Self {
        FanoutError::InvalidEntity {
            kind,
            reason: reason.into(),
        }
    }

    pub fn is_empty_source(&self) -> bool {
        matches!(self, FanoutError::EmptySource)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FanoutError::NotFound { .. })
    }

    pub fn is_delivery_failure(&self) -> bool {
        matches!(self, FanoutError::DeliveryFailure)
    }

    pub fn is_endpoint_disabled(&self) -> bool {
        matches!(self, FanoutError::EndpointDisabled)
    }

    pub fn is_endpoint_not_found(&self) -> bool {
        matches!(self, FanoutError::EndpointNotFound)
    }

    pub fn is_relation_not_found(&self) -> bool {
        matches!(self, FanoutError::RelationNotFound { .. })
    }
}
