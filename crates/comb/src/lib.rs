// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! hive-comb: the Comb — filesystem substrate (C1), message router (C2),
//! and sync manager (C3) that make every Hive message, lock, and barrier
//! durable across worker process restarts.

pub mod error;
pub mod fs;
pub mod router;
pub mod sync;

pub use error::{CombError, Result};
pub use fs::FsSubstrate;
pub use router::{MessageStats, Router};
pub use sync::SyncManager;
