// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tmux`-backed [`MuxDriver`], grounded directly in `oj-daemon`'s
//! `listener/tmux.rs`: `capture-pane -p -S -40` (`-e` for color) and scoped,
//! concurrent `kill-session` per tracked pane rather than a blanket
//! `tmux kill-server`.

use crate::error::{PaneError, Result};
use crate::mux::MuxDriver;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::process::Command;

/// Drives a real `tmux` binary via `tokio::process::Command`.
pub struct TmuxDriver {
    /// Include ANSI color codes (`-e`) in captures.
    pub with_color: bool,
}

impl TmuxDriver {
    pub fn new() -> Self {
        Self { with_color: false }
    }

    async fn run(&self, args: &[&str]) -> Result<std::process::Output> {
        Command::new("tmux").args(args).output().await.map_err(PaneError::from)
    }
}

impl Default for TmuxDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MuxDriver for TmuxDriver {
    async fn ensure_session(
        &self,
        session: &str,
        panes: &[String],
    ) -> Result<HashMap<String, String>> {
        let mut handles = HashMap::new();
        if panes.is_empty() {
            return Ok(handles);
        }

        if !self.exists_session(session).await {
            let first = &panes[0];
            let out = self
                .run(&["new-session", "-d", "-s", session, "-n", first])
                .await?;
            if !out.status.success() {
                return Err(PaneError::CommandFailed(format!(
                    "tmux new-session failed: {}",
                    String::from_utf8_lossy(&out.stderr)
                )));
            }
        }
        handles.insert(panes[0].clone(), format!("{session}:{}", panes[0]));

        for name in &panes[1..] {
            let out = self.run(&["new-window", "-t", session, "-n", name]).await?;
            if !out.status.success() {
                return Err(PaneError::CommandFailed(format!(
                    "tmux new-window failed: {}",
                    String::from_utf8_lossy(&out.stderr)
                )));
            }
            handles.insert(name.clone(), format!("{session}:{name}"));
        }

        Ok(handles)
    }

    async fn destroy_session(&self, session: &str) -> Result<()> {
        let _ = self.run(&["kill-session", "-t", session]).await?;
        Ok(())
    }

    async fn send_line(&self, pane: &str, text: &str) -> Result<()> {
        let out = self.run(&["send-keys", "-t", pane, text, "Enter"]).await?;
        if !out.status.success() {
            return Err(PaneError::CommandFailed(format!(
                "send-keys failed for pane {pane:?}: {}",
                String::from_utf8_lossy(&out.stderr)
            )));
        }
        Ok(())
    }

    async fn send_keys(&self, pane: &str, keys: &str) -> Result<()> {
        let out = self.run(&["send-keys", "-t", pane, keys]).await?;
        if !out.status.success() {
            return Err(PaneError::CommandFailed(format!(
                "send-keys failed for pane {pane:?}: {}",
                String::from_utf8_lossy(&out.stderr)
            )));
        }
        Ok(())
    }

    async fn capture(&self, pane: &str, tail_lines: u32) -> Result<String> {
        let start = format!("-{tail_lines}");
        let mut args = vec!["capture-pane", "-t", pane, "-p", "-S", &start];
        if self.with_color {
            args.push("-e");
        }
        let out = self.run(&args).await?;
        if !out.status.success() {
            return Err(PaneError::PaneNotFound(pane.to_string()));
        }
        Ok(String::from_utf8_lossy(&out.stdout).to_string())
    }

    async fn exists_session(&self, session: &str) -> bool {
        matches!(self.run(&["has-session", "-t", session]).await, Ok(out) if out.status.success())
    }
}
