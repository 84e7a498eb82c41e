// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy for the Coordination Loop.

use thiserror::Error;

/// Errors surfaced by `hive-coordinator`.
///
/// A transport or assessor failure during `send_task`/`run_cycle` is
/// represented as a [`hive_core::TaskResult`] with `status=Error`, not an
/// `Err` here — this enum is for setup-time and watch-log failures only.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error(transparent)]
    Core(#[from] hive_core::Error),

    #[error(transparent)]
    Comb(#[from] hive_comb::CombError),

    #[error("failed to write watch log entry: {0}")]
    WatchLog(String),
}

pub type Result<T> = std::result::Result<T, CoordinatorError>;
