// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The watch log: an append-only, time-ordered record of
//! every structural event, written through the Comb's atomic-append
//! primitive rather than a bespoke writer — `.hive/logs/watch.jsonl`.

use crate::error::Result;
use chrono::{DateTime, Utc};
use hive_comb::FsSubstrate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// One record in the watch log: `{timestamp, source, target, kind,
/// summary, context}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchEvent {
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub target: String,
    pub kind: String,
    pub summary: String,
    #[serde(default)]
    pub context: serde_json::Value,
}

impl WatchEvent {
    pub fn new(
        now: DateTime<Utc>,
        source: impl Into<String>,
        target: impl Into<String>,
        kind: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: now,
            source: source.into(),
            target: target.into(),
            kind: kind.into(),
            summary: summary.into(),
            context: serde_json::Value::Null,
        }
    }

    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = context;
        self
    }
}

/// The Coordination Loop's canonical source for the monitor: one JSON
/// object per line, appended through [`FsSubstrate`].
pub struct WatchLog {
    fs: Arc<FsSubstrate>,
}

impl WatchLog {
    pub fn new(fs: Arc<FsSubstrate>) -> Self {
        Self { fs }
    }

    pub fn path(&self) -> PathBuf {
        self.fs.path("logs/watch.jsonl")
    }

    /// Append one record. A serialization failure is a bug (the schema is
    /// fixed), not a recoverable condition, but is still surfaced as an
    /// error rather than a panic so a caller mid-cycle can choose to log
    /// and continue.
    pub fn record(&self, event: WatchEvent) -> Result<()> {
        let line = serde_json::to_string(&event)
            .map_err(|e| crate::error::CoordinatorError::WatchLog(e.to_string()))?;
        self.fs.append_line(&self.path(), &line)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
