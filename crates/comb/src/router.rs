// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Message Router (C2): priority/TTL-ordered inboxes over the filesystem
//! substrate.

use crate::error::{CombError, Result};
use crate::fs::FsSubstrate;
use chrono::{DateTime, Utc};
use hive_core::{delivery_key, Message, MessageKind, Priority};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Per-worker delivery counters.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct MessageStats {
    pub sent: u64,
    pub delivered: u64,
    pub expired: u64,
    pub failed: u64,
}

/// The Comb's message router: `send`/`receive`/`respond` over the
/// filesystem substrate's inbox/sent/failed directories.
pub struct Router {
    fs: Arc<FsSubstrate>,
    stats: Mutex<HashMap<String, MessageStats>>,
}

impl Router {
    pub fn new(fs: Arc<FsSubstrate>) -> Self {
        Self { fs, stats: Mutex::new(HashMap::new()) }
    }

    fn inbox_dir(&self) -> std::path::PathBuf {
        self.fs.path("comb/messages/inbox")
    }

    fn sent_dir(&self) -> std::path::PathBuf {
        self.fs.path("comb/messages/sent")
    }

    fn failed_dir(&self) -> std::path::PathBuf {
        self.fs.path("comb/messages/failed")
    }

    /// Place `message` into its recipient's inbox.
    ///
    /// Fails with [`CombError::Expired`] if the TTL has already elapsed at
    /// send time — constructing the `Message` only guarantees
    /// `created_at <= expires_at`, not that it is still in the future
    /// relative to `now`.
    pub fn send(&self, message: &Message, now: DateTime<Utc>) -> Result<()> {
        if message.is_expired(now) {
            self.bump(&message.from, |s| s.failed += 1);
            return Err(CombError::Expired);
        }
        let path = self.inbox_dir().join(format!("{}.json", message.file_stem()));
        self.fs.write_json(&path, message)?;
        self.bump(&message.from, |s| s.sent += 1);
        Ok(())
    }

    /// Collect every eligible message addressed to `worker`, in strict
    /// `(−priority, created_at)` order, moving each consumed
    /// file into `sent/`.
    ///
    /// A corrupt file in the inbox is skipped with a warning (already
    /// logged by [`FsSubstrate::read_json`]) and does not abort the batch —
    /// every other eligible message is still returned.
    pub fn receive(&self, worker: &str, now: DateTime<Utc>) -> Vec<Message> {
        let mut eligible: Vec<Message> = self
            .fs
            .list(&self.inbox_dir(), "*.json")
            .into_iter()
            .filter_map(|path| {
                let message: Option<Message> = self.fs.read_json(&path).ok().flatten();
                message.map(|m| (path, m))
            })
            .filter(|(_, m)| m.to == worker)
            .filter_map(|(path, m)| {
                if m.is_expired(now) {
                    self.bump(&m.to, |s| s.expired += 1);
                    None
                } else {
                    Some((path, m))
                }
            })
            .collect();

        eligible.sort_by(|(_, a), (_, b)| delivery_key(a).cmp(&delivery_key(b)));

        let mut delivered = Vec::with_capacity(eligible.len());
        for (path, message) in eligible {
            let dst = self.sent_dir().join(format!("{}.json", message.file_stem()));
            if self.fs.move_file(&path, &dst).is_ok() {
                self.bump(&message.to, |s| s.delivered += 1);
                delivered.push(message);
            }
            // If the move failed (lost race with another consumer), the
            // message remains deliverable on the next call — at-least-once,
 // not at-most-once.
        }
        delivered
    }

    /// Build and send a `Response` correlated to `original`.
    pub fn respond(
        &self,
        original: &Message,
        body: serde_json::Value,
        priority: Option<Priority>,
        now: DateTime<Utc>,
        ttl: chrono::Duration,
    ) -> Result<Message> {
        let message = Message::new(
            original.to.clone(),
            original.from.clone(),
            MessageKind::Response,
            priority.unwrap_or(Priority::Normal),
            body,
            now,
            now + ttl,
            Some(original.id),
        )?;
        self.send(&message, now)?;
        Ok(message)
    }

    /// Send a `Notification`.
    pub fn notify(
        &self,
        from: &str,
        to: &str,
        body: serde_json::Value,
        priority: Option<Priority>,
        now: DateTime<Utc>,
        ttl: chrono::Duration,
    ) -> Result<Message> {
        let message = Message::new(
            from,
            to,
            MessageKind::Notification,
            priority.unwrap_or(Priority::Normal),
            body,
            now,
            now + ttl,
            None,
        )?;
        self.send(&message, now)?;
        Ok(message)
    }

    /// Send an `Error` message.
    pub fn error(
        &self,
        from: &str,
        to: &str,
        msg: &str,
        details: Option<serde_json::Value>,
        now: DateTime<Utc>,
        ttl: chrono::Duration,
    ) -> Result<Message> {
        let body = serde_json::json!({ "message": msg, "details": details });
        let message = Message::new(from, to, MessageKind::Error, Priority::High, body, now, now + ttl, None)?;
        self.send(&message, now)?;
        Ok(message)
    }

    /// Delete every message (in inbox and sent) past its `expires_at`,
    /// returning the count reaped. Malformed files that cannot even be
    /// parsed to check expiry are relocated to `failed/` rather than
    /// silently deleted, preserving the evidence.
    pub fn reap_expired(&self, now: DateTime<Utc>) -> usize {
        let mut count = 0;
        for dir in [self.inbox_dir(), self.sent_dir()] {
            for path in self.fs.list(&dir, "*.json") {
                match self.fs.read_json::<Message>(&path) {
                    Ok(Some(m)) => {
                        if m.is_expired(now) {
                            let _ = self.fs.delete(&path);
                            self.bump(&m.to, |s| s.expired += 1);
                            count += 1;
                        }
                    }
                    Ok(None) => {
                        let dst = self.failed_dir().join(
                            path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default(),
                        );
                        let _ = self.fs.move_file(&path, &dst);
                    }
                    Err(_) => {}
                }
            }
        }
        count
    }

    /// Per-worker delivery counters.
    pub fn stats(&self) -> HashMap<String, MessageStats> {
        self.stats.lock().clone()
    }

    fn bump(&self, worker: &str, f: impl FnOnce(&mut MessageStats)) {
        let mut stats = self.stats.lock();
        f(stats.entry(worker.to_string()).or_default());
    }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
