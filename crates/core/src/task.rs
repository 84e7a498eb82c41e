// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task and cycle-result data model for the Coordination Loop (C6).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Identifier for a [`Task`], unique within a hive.
    pub struct TaskId("tsk-");
}

/// A unit of work dispatched to a worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub target_worker: String,
    pub instruction: serde_json::Value,
    pub deadline: DateTime<Utc>,
    pub iteration_index: u32,
    pub max_iterations: u32,
    pub quality_threshold: f64,
}

/// Outcome status of a single dispatched task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Ok,
    Error,
    Timeout,
}

/// Result of one [`Task`] dispatch (single-shot or one leg of a parallel
/// fan-out). An individual failure is represented here, not propagated as
/// an exception.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    pub task_id: TaskId,
    pub worker: String,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskResult {
    pub fn ok(task_id: TaskId, worker: impl Into<String>, response: serde_json::Value) -> Self {
        Self { task_id, worker: worker.into(), status: TaskStatus::Ok, response: Some(response), error: None }
    }

    pub fn error(task_id: TaskId, worker: impl Into<String>, error: impl Into<String>) -> Self {
        Self { task_id, worker: worker.into(), status: TaskStatus::Error, response: None, error: Some(error.into()) }
    }

    pub fn timeout(task_id: TaskId, worker: impl Into<String>, message: impl Into<String>) -> Self {
        Self { task_id, worker: worker.into(), status: TaskStatus::Timeout, response: None, error: Some(message.into()) }
    }
}

/// Assessment produced by a `QualityAssessor`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityAssessment {
    pub score: f64,
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// Terminal outcome of `run_cycle`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleResult {
    pub success: bool,
    pub iterations: u32,
    pub last_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl CycleResult {
    pub fn approved(iterations: u32, score: f64) -> Self {
        Self { success: true, iterations, last_score: score, reason: None }
    }

    pub fn exhausted(iterations: u32, last_score: f64) -> Self {
        Self {
            success: false,
            iterations,
            last_score,
            reason: Some("max_iterations_exceeded".to_string()),
        }
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
