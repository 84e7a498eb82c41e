// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy for the Pane Transport.

use thiserror::Error;

/// Errors surfaced by `hive-pane`.
///
/// `send_line` failure is a hard error to the caller; a
/// `send_command_await` timeout is *not* an error — it is reported as
/// `ok: false` on [`crate::daemon::CommandResponse`] with the timeout
/// message as the response body.
#[derive(Debug, Error)]
pub enum PaneError {
    #[error("multiplexer session {0:?} not found")]
    SessionNotFound(String),

    #[error("pane {0:?} not found")]
    PaneNotFound(String),

    #[error("failed to run multiplexer command: {0}")]
    Io(#[from] std::io::Error),

    #[error("multiplexer command exited non-zero: {0}")]
    CommandFailed(String),
}

pub type Result<T> = std::result::Result<T, PaneError>;
