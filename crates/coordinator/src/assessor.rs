// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The pluggable quality gate: "the default
//! implementation is a stub and it is explicitly pluggable by collaborators."

use async_trait::async_trait;
use hive_core::{QualityAssessment, Task, TaskResult};

/// Scores one iteration's result. A real implementation typically shells
/// out to a second LLM call or a static checker; `hive-coordinator` ships
/// none — only [`StubAssessor`], gated behind `test-support`.
///
/// Returning `Err` is the assessor-exception case: the loop treats it as
/// score `0` with a synthetic issue, it never aborts the cycle.
#[async_trait]
pub trait QualityAssessor: Send + Sync {
    async fn assess(&self, task: &Task, result: &TaskResult) -> Result<QualityAssessment, String>;
}

/// Cycles through a fixed sequence of scores, repeating the last value
/// once exhausted. Used by tests to exercise `run_cycle`'s gate/feedback
/// loop without a real assessor.
#[cfg(any(test, feature = "test-support"))]
pub struct StubAssessor {
    scores: Vec<f64>,
    calls: parking_lot::Mutex<usize>,
}

#[cfg(any(test, feature = "test-support"))]
impl StubAssessor {
    pub fn new(scores: impl Into<Vec<f64>>) -> Self {
        let scores = scores.into();
        assert!(!scores.is_empty(), "StubAssessor requires at least one score");
        Self { scores, calls: parking_lot::Mutex::new(0) }
    }
}

#[cfg(any(test, feature = "test-support"))]
#[async_trait]
impl QualityAssessor for StubAssessor {
    async fn assess(&self, _task: &Task, _result: &TaskResult) -> Result<QualityAssessment, String> {
        let mut calls = self.calls.lock();
        let idx = (*calls).min(self.scores.len() - 1);
        *calls += 1;
        Ok(QualityAssessment { score: self.scores[idx], issues: Vec::new(), suggestions: Vec::new() })
    }
}

#[cfg(test)]
#[path = "assessor_tests.rs"]
mod tests;
