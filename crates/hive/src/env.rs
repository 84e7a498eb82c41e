// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the `hive` façade, in the
//! style of `oj-daemon::env`.
//!
//! No variable here is mandatory: every reader falls back to
//! a documented default when unset or unparseable.

use std::path::PathBuf;
use std::time::Duration;

/// Resolve the hive root directory: `HIVE_ROOT` > `./.hive`.
pub fn hive_root() -> PathBuf {
    std::env::var("HIVE_ROOT").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("./.hive"))
}

/// Default per-message TTL when a caller does not specify one.
pub fn default_message_ttl() -> chrono::Duration {
    std::env::var("HIVE_MESSAGE_TTL_MS")
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .map(chrono::Duration::milliseconds)
        .unwrap_or_else(|| chrono::Duration::minutes(5))
}

/// Default `Sync.acquire`/`wait_at_barrier` timeout.
pub fn default_lock_timeout() -> Duration {
    std::env::var("HIVE_LOCK_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(5))
}

/// Default pane response timeout for `send_command_await`.
pub fn default_response_timeout() -> Duration {
    std::env::var("HIVE_RESPONSE_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(30))
}

/// Daemon health-check cadence. Spec.md §9 Open Question: "hard-coded in
/// one place and configurable in another; this spec requires it to be
/// configurable with a default of 60s" — resolved as `HIVE_HEALTH_CHECK_MS`,
/// default 60_000.
pub fn health_check_interval() -> Duration {
    std::env::var("HIVE_HEALTH_CHECK_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(60))
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
