// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The narrow multiplexer interface: every multiplexer verb the core
//! needs, behind a trait, so tests can supply a fake driver without a
//! real terminal multiplexer binary.

use crate::error::Result;
use async_trait::async_trait;

/// Abstract multiplexer verbs: session/window lifecycle, line
/// injection, raw key sequences, and scrollback capture.
#[async_trait]
pub trait MuxDriver: Send + Sync {
    /// Create `session` with one window per logical pane name, if it does
    /// not already exist. Returns the `{logical_name -> pane_handle}` map.
    async fn ensure_session(
        &self,
        session: &str,
        panes: &[String],
    ) -> Result<std::collections::HashMap<String, String>>;

    async fn destroy_session(&self, session: &str) -> Result<()>;

    /// Write `text` followed by a newline into `pane`.
    async fn send_line(&self, pane: &str, text: &str) -> Result<()>;

    /// Write a raw key sequence (no trailing newline) into `pane`.
    async fn send_keys(&self, pane: &str, keys: &str) -> Result<()>;

    /// The last `tail_lines` lines of `pane`'s scrollback.
    async fn capture(&self, pane: &str, tail_lines: u32) -> Result<String>;

    /// True if `session` currently exists.
    async fn exists_session(&self, session: &str) -> bool;
}
