// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock and barrier data model for the Sync Manager (C3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Locking mode. Exclusive is the only mode in this version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockMode {
    Exclusive,
}

/// A named, advisory, TTL-bounded exclusive lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lock {
    pub resource: String,
    pub holder: String,
    pub acquired_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub mode: LockMode,
}

impl Lock {
    pub fn new(
        resource: impl Into<String>,
        holder: impl Into<String>,
        acquired_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            resource: resource.into(),
            holder: holder.into(),
            acquired_at,
            expires_at,
            mode: LockMode::Exclusive,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// A named rendezvous point: released once `expected` distinct workers
/// have arrived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Barrier {
    pub name: String,
    pub expected: u32,
    #[serde(default)]
    pub arrived: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
}

impl Barrier {
    pub fn new(name: impl Into<String>, expected: u32, created_at: DateTime<Utc>) -> Self {
        Self { name: name.into(), expected, arrived: BTreeSet::new(), created_at }
    }

    /// Record `worker` as arrived. Idempotent: arriving twice does not
    /// grow `arrived` past `expected` members.
    pub fn arrive(&mut self, worker: impl Into<String>) {
        self.arrived.insert(worker.into());
    }

    pub fn is_released(&self) -> bool {
        self.arrived.len() as u32 >= self.expected
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
