// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! An in-memory [`MuxDriver`] fake, exported only behind `test-support` so
//! other crates (and this one's own tests) can exercise the Pane Transport
//! and daemon supervision without a real multiplexer binary.

use crate::error::Result;
use crate::mux::MuxDriver;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

/// Records every line ever sent to a pane, in order, plus whatever has been
/// queued up as "new output" via [`FakeMuxDriver::push_output`] — the
/// latter is what `capture` returns, modeling a worker's REPL replying
/// asynchronously to injected commands.
#[derive(Default)]
struct PaneState {
    sent: Vec<String>,
    scrollback: Vec<String>,
}

#[derive(Default)]
pub struct FakeMuxDriver {
    sessions: Mutex<HashSet<String>>,
    panes: Mutex<HashMap<String, PaneState>>,
}

impl FakeMuxDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate output appearing in `pane`'s scrollback (e.g. a worker
    /// REPL printing its prompt or a result line).
    pub fn push_output(&self, pane: &str, lines: &[&str]) {
        let mut panes = self.panes.lock();
        let state = panes.entry(pane.to_string()).or_default();
        state.scrollback.extend(lines.iter().map(|s| s.to_string()));
    }

    /// Every line sent to `pane`, in send order — for asserting FIFO
    /// delivery.
    pub fn sent_lines(&self, pane: &str) -> Vec<String> {
        self.panes.lock().get(pane).map(|s| s.sent.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl MuxDriver for FakeMuxDriver {
    async fn ensure_session(
        &self,
        session: &str,
        panes: &[String],
    ) -> Result<HashMap<String, String>> {
        self.sessions.lock().insert(session.to_string());
        let mut handles = HashMap::new();
        let mut pane_map = self.panes.lock();
        for name in panes {
            let handle = format!("{session}:{name}");
            pane_map.entry(handle.clone()).or_default();
            handles.insert(name.clone(), handle);
        }
        Ok(handles)
    }

    async fn destroy_session(&self, session: &str) -> Result<()> {
        self.sessions.lock().remove(session);
        let prefix = format!("{session}:");
        self.panes.lock().retain(|k, _| !k.starts_with(&prefix));
        Ok(())
    }

    async fn send_line(&self, pane: &str, text: &str) -> Result<()> {
        let mut panes = self.panes.lock();
        let state = panes.entry(pane.to_string()).or_default();
        state.sent.push(text.to_string());
        Ok(())
    }

    async fn send_keys(&self, pane: &str, keys: &str) -> Result<()> {
        let mut panes = self.panes.lock();
        let state = panes.entry(pane.to_string()).or_default();
        state.sent.push(keys.to_string());
        Ok(())
    }

    async fn capture(&self, pane: &str, tail_lines: u32) -> Result<String> {
        let panes = self.panes.lock();
        let Some(state) = panes.get(pane) else {
            return Ok(String::new());
        };
        let tail_lines = tail_lines as usize;
        let start = state.scrollback.len().saturating_sub(tail_lines);
        Ok(state.scrollback[start..].join("\n"))
    }

    async fn exists_session(&self, session: &str) -> bool {
        self.sessions.lock().contains(session)
    }
}
