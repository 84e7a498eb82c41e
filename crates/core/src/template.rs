// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared result type for the Template Protocol (C4).
//!
//! The pattern registry, detection, and validation logic live in
//! `hive_template`; this module only holds the data produced by a
//! successful detection so that `hive-core` consumers (the coordination
//! loop, the pane transport) can depend on the shape without depending on
//! the regex registry itself.

use serde::{Deserialize, Serialize};

/// The semantic kind of a detected template line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    Task,
    WorkerResult,
    QueenReport,
    Collaboration,
    Approval,
    Unknown,
}

crate::simple_display! {
    TemplateKind {
        Task => "task",
        WorkerResult => "worker_result",
        QueenReport => "queen_report",
        Collaboration => "collaboration",
        Approval => "approval",
        Unknown => "unknown",
    }
}

/// A single named capture from a matched line, in pattern declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capture {
    pub name: String,
    pub value: String,
}

/// The result of successfully matching a pane line against the registry
///. `confidence` is a heuristic in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateMatch {
    pub kind: TemplateKind,
    pub groups: Vec<Capture>,
    pub confidence: f64,
}

impl TemplateMatch {
    pub fn new(kind: TemplateKind, groups: Vec<Capture>, confidence: f64) -> Self {
        Self { kind, groups, confidence }
    }

    /// Look up a capture by name. `O(n)` over the (small) group list.
    pub fn group(&self, name: &str) -> Option<&str> {
        self.groups.iter().find(|c| c.name == name).map(|c| c.value.as_str())
    }
}

/// A non-match explanation, produced by `detect_with_diagnosis`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateDiagnosis {
    /// The known prefix the line appears to start with, if any (e.g. `"TASK:"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_prefix: Option<String>,
    /// The closest registered pattern by sequence similarity, if any scored
    /// above the 0.3 threshold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closest_pattern: Option<String>,
    /// Concrete, copy-pasteable fix suggestions.
    #[serde(default)]
    pub suggestions: Vec<String>,
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
