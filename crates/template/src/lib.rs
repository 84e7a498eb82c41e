// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! hive-template: the Template Protocol (C4) — a registry of line-oriented
//! wire patterns (`TASK:`, `WORKER_RESULT:`, ...), detection, diagnosis on
//! miss, and lint-level validation.

pub mod error;
pub mod pattern;
pub mod registry;
mod similarity;

pub use error::{Result, TemplateError};
pub use pattern::{GroupDef, TemplatePattern};
pub use registry::{LintFinding, LintLevel, TemplateRegistry};

// Re-exported for convenience so downstream crates need only depend on
// `hive-template`, not also `hive-core`, to work with detection results.
pub use hive_core::{Capture, TemplateDiagnosis, TemplateKind, TemplateMatch};
