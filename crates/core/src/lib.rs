// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! hive-core: shared data model, IDs, and error taxonomy for the Hive
//! coordination fabric.

pub mod macros;

pub mod error;
pub mod id;
pub mod lock;
pub mod message;
pub mod pane;
pub mod task;
pub mod template;

pub use error::{Error, Result};
pub use id::{short, IdBuf, ID_MAX_LEN};
pub use lock::{Barrier, Lock, LockMode};
pub use message::{delivery_key, Message, MessageId, MessageKind, Priority};
pub use pane::{DaemonState, Pane, PaneStats};
pub use task::{CycleResult, QualityAssessment, Task, TaskId, TaskResult, TaskStatus};
pub use template::{Capture, TemplateDiagnosis, TemplateKind, TemplateMatch};
