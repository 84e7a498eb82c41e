// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy for the filesystem substrate, message router, and sync
//! manager.

use thiserror::Error;

/// Errors surfaced by `hive-comb`.
///
/// Only Resource and Validation failures produce an `Err` here — Transient
/// conditions (lock contention, an empty inbox) and Integrity conditions
/// (a torn JSON file) are represented as `Ok(false)`, `Ok(None)`, or an
/// empty `Vec`, never an error.
#[derive(Debug, Error)]
pub enum CombError {
    #[error(transparent)]
    Core(#[from] hive_core::Error),

    #[error("could not acquire file lock on {path} within the retry budget")]
    LockTimeout { path: String },

    #[error("message expired before it could be sent")]
    Expired,
}

pub type Result<T> = std::result::Result<T, CombError>;
