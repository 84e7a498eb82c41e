// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared error taxonomy for the hive workspace.
//!
//! Every crate's own error type wraps [`Error`] via `#[from]` rather than
//! redefining IO/serialization variants — see `hive_comb::FsError`,
//! `hive_pane::PaneError`, etc.

use thiserror::Error;

/// Errors common to every Hive component.
///
/// Transient conditions are not represented here at all (callers see
/// `Ok(false)`/`Ok(None)`/empty collections, never an error); this enum
/// covers Validation, Integrity, and Resource failures only.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("message expired before it could be sent")]
    Expired,

    #[error("invalid message: {0}")]
    InvalidMessage(String),

    #[error("resource not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;
