// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sync Manager (C3): named exclusive locks and barriers over the
//! filesystem substrate.

use crate::fs::FsSubstrate;
use chrono::{DateTime, Utc};
use hive_core::{Barrier, Lock};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const CONFIRM_DELAY: Duration = Duration::from_millis(10);

/// Named exclusive locks and barriers, reentrant per `(resource, holder)`.
///
/// The process-local cache makes re-acquiring one's
/// own lock from another thread in the same process an `O(1)` hit instead
/// of a file round-trip; it is authoritative only for this process — across
/// processes, the lock file on disk is the source of truth.
pub struct SyncManager {
    fs: Arc<FsSubstrate>,
    local_cache: Mutex<HashSet<(String, String)>>,
}

impl SyncManager {
    pub fn new(fs: Arc<FsSubstrate>) -> Self {
        Self { fs, local_cache: Mutex::new(HashSet::new()) }
    }

    fn lock_path(&self, resource: &str) -> std::path::PathBuf {
        self.fs.path(format!("comb/shared/locks/{resource}.lock.json"))
    }

    fn barrier_path(&self, name: &str) -> std::path::PathBuf {
        self.fs.path(format!("comb/shared/barriers/{name}.barrier.json"))
    }

    /// Attempt to claim `resource` for `holder`, retrying until `timeout`
    /// elapses.
    pub fn acquire(&self, resource: &str, holder: &str, timeout: Duration) -> bool {
        if self.local_cache.lock().contains(&(resource.to_string(), holder.to_string())) {
            return true;
        }

        let deadline = Instant::now() + timeout;
        loop {
            let now = Utc::now();
            let path = self.lock_path(resource);
            let existing: Option<Lock> = self.fs.read_json(&path).ok().flatten();

            let busy = match &existing {
                Some(lock) if lock.is_expired(now) => {
                    let _ = self.fs.delete(&path);
                    false
                }
                Some(lock) if lock.holder == holder => {
                    self.local_cache.lock().insert((resource.to_string(), holder.to_string()));
                    return true;
                }
                Some(_) => true,
                None => false,
            };

            if !busy {
                let ttl = chrono::Duration::from_std(timeout).unwrap_or_else(|_| chrono::Duration::seconds(1));
                let new_lock = Lock::new(resource, holder, now, now + ttl);
                if self.fs.write_json(&path, &new_lock).is_ok() {
                    std::thread::sleep(CONFIRM_DELAY);
                    let confirm: Option<Lock> = self.fs.read_json(&path).ok().flatten();
                    if confirm.map(|l| l.holder == holder).unwrap_or(false) {
                        self.local_cache.lock().insert((resource.to_string(), holder.to_string()));
                        return true;
                    }
                }
            }

            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(POLL_INTERVAL.min(deadline.saturating_duration_since(Instant::now())));
        }
    }

    /// Release `resource` iff `holder` currently holds it. Releasing a lock
    /// you do not hold logs a warning and returns `false`.
    pub fn release(&self, resource: &str, holder: &str) -> bool {
        let path = self.lock_path(resource);
        let existing: Option<Lock> = self.fs.read_json(&path).ok().flatten();
        match existing {
            Some(lock) if lock.holder == holder => {
                let _ = self.fs.delete(&path);
                self.local_cache.lock().remove(&(resource.to_string(), holder.to_string()));
                true
            }
            _ => {
                tracing::warn!(resource, holder, "release of a lock not held by this holder");
                false
            }
        }
    }

    pub fn is_locked(&self, resource: &str) -> bool {
        let path = self.lock_path(resource);
        let now = Utc::now();
        matches!(self.fs.read_json::<Lock>(&path).ok().flatten(), Some(lock) if !lock.is_expired(now))
    }

    pub fn holder(&self, resource: &str) -> Option<String> {
        let path = self.lock_path(resource);
        let now = Utc::now();
        self.fs
            .read_json::<Lock>(&path)
            .ok()
            .flatten()
            .filter(|lock| !lock.is_expired(now))
            .map(|lock| lock.holder)
    }

    /// Create a named rendezvous point expecting `expected` arrivals.
    pub fn create_barrier(&self, name: &str, expected: u32) {
        let path = self.barrier_path(name);
        if self.fs.read_json::<Barrier>(&path).ok().flatten().is_some() {
            return;
        }
        let barrier = Barrier::new(name, expected, Utc::now());
        let _ = self.fs.write_json(&path, &barrier);
    }

    /// Record `worker`'s arrival at barrier `name`, polling until every
    /// expected worker has arrived or `timeout` elapses.
    pub fn wait_at_barrier(&self, name: &str, worker: &str, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let path = self.barrier_path(name);
        loop {
            let mut barrier: Barrier = match self.fs.read_json(&path).ok().flatten() {
                Some(b) => b,
                None => {
                    if Instant::now() >= deadline {
                        return false;
                    }
                    std::thread::sleep(POLL_INTERVAL.min(deadline.saturating_duration_since(Instant::now())));
                    continue;
                }
            };
            if !barrier.arrived.contains(worker) {
                barrier.arrive(worker);
                let _ = self.fs.write_json(&path, &barrier);
            }
            if barrier.is_released() {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(POLL_INTERVAL.min(deadline.saturating_duration_since(Instant::now())));
        }
    }

    /// Delete expired locks, returning the count reaped.
    pub fn reap_expired(&self) -> usize {
        let now = Utc::now();
        let dir = self.fs.path("comb/shared/locks");
        let mut count = 0;
        for path in self.fs.list(&dir, "*.lock.json") {
            if let Some(lock) = self.fs.read_json::<Lock>(&path).ok().flatten() {
                if lock.is_expired(now) {
                    let _ = self.fs.delete(&path);
                    count += 1;
                }
            }
        }
        count
    }

    /// Force-release every lock held by `holder`, returning the count
    /// released. Used to clean up after a crashed worker.
    pub fn force_release_by(&self, holder: &str) -> usize {
        let dir = self.fs.path("comb/shared/locks");
        let mut count = 0;
        for path in self.fs.list(&dir, "*.lock.json") {
            if let Some(lock) = self.fs.read_json::<Lock>(&path).ok().flatten() {
                if lock.holder == holder {
                    let _ = self.fs.delete(&path);
                    self.local_cache.lock().remove(&(lock.resource.clone(), holder.to_string()));
                    count += 1;
                }
            }
        }
        count
    }
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
