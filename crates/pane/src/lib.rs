// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pane Transport (C5): drives a terminal multiplexer session, supervises
//! the daemons living in its panes, and exposes a send/await surface the
//! Coordination Loop (C6) dispatches work through.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod daemon;
mod error;
#[cfg(any(test, feature = "test-support"))]
mod fake;
mod mux;
mod tmux;
mod transport;

pub use daemon::{default_ready_markers, default_terminators, CommandResponse, DaemonSupervisor};
pub use error::{PaneError, Result};
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeMuxDriver;
pub use mux::MuxDriver;
pub use tmux::TmuxDriver;
pub use transport::PaneTransport;

pub use hive_core::{DaemonState, Pane, PaneStats};
