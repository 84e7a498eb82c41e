// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy for the Template Protocol.

use thiserror::Error;

/// Errors surfaced when building or validating a [`crate::pattern::TemplatePattern`].
///
/// `detect`/`detect_all`/`detect_with_diagnosis` never return an error —
/// a non-match is `None` plus an optional [`crate::TemplateDiagnosis`].
/// Detection never mutates state, and misses are routine, not
/// exceptional.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("pattern {name:?} failed to compile: {source}")]
    InvalidRegex { name: String, #[source] source: regex::Error },

    #[error("pattern {name:?} has no capture groups (registry entries require >= 1)")]
    NoCaptureGroups { name: String },

    #[error("pattern {name:?} group index {index} is out of range or duplicated")]
    BadGroupIndex { name: String, index: usize },
}

pub type Result<T> = std::result::Result<T, TemplateError>;
