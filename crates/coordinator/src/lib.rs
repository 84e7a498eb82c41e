// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! hive-coordinator: the Coordination Loop (C6) — single and parallel task
//! dispatch, the iterative quality-gated `run_cycle`, and the watch log
//! that feeds a monitor.

pub mod assessor;
pub mod coordination;
pub mod error;
pub mod watch;

pub use assessor::QualityAssessor;
#[cfg(any(test, feature = "test-support"))]
pub use assessor::StubAssessor;
pub use coordination::{CoordinationLoop, ParallelTask, RunCycleOptions, SendTaskOptions};
pub use error::{CoordinatorError, Result};
pub use watch::{WatchEvent, WatchLog};
