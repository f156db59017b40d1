// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain entities flowing through the notification pipeline.
//!
//! Each module bundles an entity with its filter options the way the stores
//! and rule criteria consume them.

pub mod app;
pub mod connection;
pub mod device;
pub mod event;
pub mod object;
pub mod platform;
pub mod reaction;
pub mod rule;
pub mod user;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Push ecosystem a device or platform registration belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Ecosystem {
    IosSandbox,
    Ios,
    Android,
}

/// Membership check for filter lists; an empty list matches everything.
pub(crate) fn in_list<T: PartialEq>(list: &[T], value: &T) -> bool {
    list.is_empty() || list.contains(value)
}

/// Optional-flag check; `None` matches everything.
pub(crate) fn flag_matches(opt: Option<bool>, value: bool) -> bool {
    opt.is_none_or(|want| want == value)
}
