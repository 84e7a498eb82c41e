// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon supervision: start/stop/restart a long-running
//! interactive process inside a pane, and drive command-and-await over it.
//!
//! The response-polling loop's incremental diffing is grounded in the
//! teacher's `agent/watcher_tests/incremental_parser.rs`: each poll reads
//! only the output appended since the last capture, and resets its
//! baseline when the new capture is shorter than the cached one (the pane
//! was cleared or the daemon respawned), rather than re-scanning from
//! scratch every time.

use crate::error::Result;
use crate::mux::MuxDriver;
use hive_core::{DaemonState, PaneStats};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

const POLL_INTERVAL: Duration = Duration::from_millis(500);
const STARTUP_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Default substrings that indicate a daemon has finished starting up.
pub fn default_ready_markers() -> Vec<String> {
    vec!["claude".to_string(), ">".to_string()]
}

/// Default substrings that indicate a pane response is complete: unifies
/// the old `[TASK_COMPLETED]` sentinel and generic prompt detection into
/// one configuration — a terminator set, not a code path.
pub fn default_terminators() -> Vec<String> {
    vec!["$".to_string(), ">".to_string()]
}

/// Tracks the last known capture for a pane so polling reads only new
/// content (the incremental-parser idiom, applied to pane text instead of
/// a JSONL transcript).
#[derive(Default)]
struct CaptureTracker {
    last: String,
}

impl CaptureTracker {
    /// Returns the text appended since the last call, resetting (and
    /// returning the whole new capture) if it is shorter than the cached
    /// baseline — the pane was cleared or the daemon respawned.
    fn diff(&mut self, new_capture: &str) -> String {
        let appended = if new_capture.len() < self.last.len() || !new_capture.starts_with(self.last.as_str()) {
            new_capture.to_string()
        } else {
            new_capture[self.last.len()..].to_string()
        };
        self.last = new_capture.to_string();
        appended
    }
}

/// Outcome of [`DaemonSupervisor::send_command_await`].
#[derive(Debug, Clone)]
pub struct CommandResponse {
    pub response: String,
    pub ok: bool,
}

/// Supervises daemons (long-running interactive processes) hosted in
/// panes, on top of a [`MuxDriver`].
pub struct DaemonSupervisor {
    mux: Arc<dyn MuxDriver>,
    trackers: Mutex<HashMap<String, CaptureTracker>>,
    states: Mutex<HashMap<String, DaemonState>>,
    stats: Mutex<HashMap<String, PaneStats>>,
    ready_markers: Vec<String>,
    terminators: Vec<String>,
}

impl DaemonSupervisor {
    pub fn new(mux: Arc<dyn MuxDriver>) -> Self {
        Self {
            mux,
            trackers: Mutex::new(HashMap::new()),
            states: Mutex::new(HashMap::new()),
            stats: Mutex::new(HashMap::new()),
            ready_markers: default_ready_markers(),
            terminators: default_terminators(),
        }
    }

    pub fn with_ready_markers(mut self, markers: Vec<String>) -> Self {
        self.ready_markers = markers;
        self
    }

    pub fn with_terminators(mut self, terminators: Vec<String>) -> Self {
        self.terminators = terminators;
        self
    }

    pub fn state(&self, pane: &str) -> DaemonState {
        self.states.lock().get(pane).copied().unwrap_or(DaemonState::Absent)
    }

    pub fn stats(&self, pane: &str) -> PaneStats {
        self.stats.lock().get(pane).cloned().unwrap_or_default()
    }

    fn set_state(&self, pane: &str, state: DaemonState) {
        self.states.lock().insert(pane.to_string(), state);
    }

    fn bump(&self, pane: &str, f: impl FnOnce(&mut PaneStats)) {
        let mut stats = self.stats.lock();
        f(stats.entry(pane.to_string()).or_default());
    }

    /// Send `command` into `pane`, then poll `capture` every ~1s up to
    /// `startup_timeout` for a ready-marker substring. Returns whether the
    /// marker was observed; a timeout is logged and returned as `false`,
    /// never an error — the caller decides whether to treat it as fatal.
    pub async fn start_daemon(&self, pane: &str, command: &str, startup_timeout: Duration) -> Result<bool> {
        self.set_state(pane, DaemonState::Starting);
        self.mux.send_line(pane, command).await?;
        self.bump(pane, |s| {
            s.started_at = Some(chrono::Utc::now());
            s.command_count += 1;
        });
        self.trackers.lock().entry(pane.to_string()).or_default();

        let deadline = Instant::now() + startup_timeout;
        loop {
            let capture = self.mux.capture(pane, 100).await?;
            if self.ready_markers.iter().any(|m| capture.contains(m.as_str())) {
                self.set_state(pane, DaemonState::Running);
                self.bump(pane, |s| s.last_heartbeat = Some(chrono::Utc::now()));
                return Ok(true);
            }
            if Instant::now() >= deadline {
                tracing::warn!(pane, "daemon did not show a ready marker within startup_timeout");
                return Ok(false);
            }
            tokio::time::sleep(STARTUP_POLL_INTERVAL.min(deadline.saturating_duration_since(Instant::now()))).await;
        }
    }

    /// Send `command`, then poll the pane capture every ~500ms for a
    /// terminator substring in the newly appended text, returning it as
    /// the response. A timeout yields `ok: false` with a diagnostic
    /// message, never an error.
    pub async fn send_command_await(
        &self,
        pane: &str,
        command: &str,
        response_timeout: Duration,
    ) -> Result<CommandResponse> {
        // Prime the tracker with everything already in scrollback so the
        // response only captures lines new since just before the send.
        let baseline = self.mux.capture(pane, 10_000).await.unwrap_or_default();
        self.trackers.lock().entry(pane.to_string()).or_default().diff(&baseline);

        self.mux.send_line(pane, command).await?;
        self.bump(pane, |s| s.command_count += 1);

        let deadline = Instant::now() + response_timeout;
        let mut accumulated = String::new();
        loop {
            let capture = self.mux.capture(pane, 10_000).await?;
            let new_text = {
                let mut trackers = self.trackers.lock();
                trackers.entry(pane.to_string()).or_default().diff(&capture)
            };
            if !new_text.is_empty() {
                accumulated.push_str(&new_text);
            }
            if self.terminators.iter().any(|t| accumulated.contains(t.as_str())) {
                self.bump(pane, |s| s.last_heartbeat = Some(chrono::Utc::now()));
                return Ok(CommandResponse { response: accumulated, ok: true });
            }
            if Instant::now() >= deadline {
                self.bump(pane, |s| s.error_count += 1);
                return Ok(CommandResponse {
                    response: format!("timed out after {:?} waiting for a response", response_timeout),
                    ok: false,
                });
            }
            tokio::time::sleep(POLL_INTERVAL.min(deadline.saturating_duration_since(Instant::now()))).await;
        }
    }

    /// `send_command_await(pane, "echo ping", ~5s)`; healthy iff the
    /// response arrives.
    pub async fn health_check(&self, pane: &str) -> Result<bool> {
        let response = self.send_command_await(pane, "echo ping", Duration::from_secs(5)).await?;
        Ok(response.ok)
    }

    pub async fn stop_daemon(&self, pane: &str) -> Result<()> {
        let _ = self.mux.send_line(pane, "exit").await;
        self.set_state(pane, DaemonState::Stopped);
        Ok(())
    }

    /// Statistics are not required to survive a restart.
    pub async fn restart_daemon(&self, pane: &str, command: &str, startup_timeout: Duration) -> Result<bool> {
        self.stop_daemon(pane).await?;
        self.stats.lock().remove(pane);
        self.trackers.lock().remove(pane);
        self.start_daemon(pane, command, startup_timeout).await
    }

    pub async fn start_all_daemons(&self, panes: &[(String, String)], startup_timeout: Duration) -> Vec<(String, bool)> {
        let mut results = Vec::with_capacity(panes.len());
        for (pane, command) in panes {
            let ready = self.start_daemon(pane, command, startup_timeout).await.unwrap_or(false);
            results.push((pane.clone(), ready));
        }
        results
    }

    pub async fn stop_all_daemons(&self, panes: &[String]) {
        for pane in panes {
            let _ = self.stop_daemon(pane).await;
        }
    }
}

#[cfg(test)]
#[path = "daemon_tests.rs"]
mod tests;
