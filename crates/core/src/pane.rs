// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pane and daemon-supervision data model for the Pane Transport (C5).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a supervised daemon hosted in a pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DaemonState {
    Absent,
    Starting,
    Running,
    Stopped,
}

crate::simple_display! {
    DaemonState {
        Absent => "absent",
        Starting => "starting",
        Running => "running",
        Stopped => "stopped",
    }
}

/// A single pane inside a terminal multiplexer session, bound 1:1 to a
/// worker by configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pane {
    pub id: String,
    pub logical_name: String,
    pub daemon_state: DaemonState,
    pub stats: PaneStats,
}

impl Pane {
    pub fn new(id: impl Into<String>, logical_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            logical_name: logical_name.into(),
            daemon_state: DaemonState::Absent,
            stats: PaneStats::default(),
        }
    }
}

/// Per-daemon statistics, reset across a restart.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaneStats {
    pub started_at: Option<DateTime<Utc>>,
    pub command_count: u64,
    pub error_count: u64,
    pub last_heartbeat: Option<DateTime<Utc>>,
}

#[cfg(test)]
#[path = "pane_tests.rs"]
mod tests;
