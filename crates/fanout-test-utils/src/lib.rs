// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test doubles shared across the workspace.

pub mod push;

pub use push::{MockPushProvider, PublishRecord};
