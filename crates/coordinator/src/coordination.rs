// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Coordination Loop (C6): `send_task`, `send_parallel`, and the
//! iterative `run_cycle` gate.

use crate::assessor::QualityAssessor;
use crate::watch::{WatchEvent, WatchLog};
use chrono::Utc;
use hive_comb::Router;
use hive_core::{
    CycleResult, Message, MessageKind, Priority, QualityAssessment, Task, TaskId, TaskResult, TaskStatus,
};
use hive_pane::PaneTransport;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const DEFAULT_TTL: chrono::Duration = chrono::Duration::minutes(5);
const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(30);

/// Options for [`CoordinationLoop::send_task`].
#[derive(Debug, Clone)]
pub struct SendTaskOptions {
    pub kind: MessageKind,
    pub priority: Priority,
    pub wait_for_response: bool,
    pub response_timeout: Duration,
}

impl Default for SendTaskOptions {
    fn default() -> Self {
        Self {
            kind: MessageKind::TaskAssignment,
            priority: Priority::Normal,
            wait_for_response: false,
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
        }
    }
}

/// One leg of a [`CoordinationLoop::send_parallel`] fan-out.
#[derive(Debug, Clone)]
pub struct ParallelTask {
    pub worker: String,
    pub instruction: serde_json::Value,
    pub opts: SendTaskOptions,
}

/// Options for [`CoordinationLoop::run_cycle`].
#[derive(Debug, Clone)]
pub struct RunCycleOptions {
    pub max_iterations: u32,
    pub quality_threshold: f64,
    pub response_timeout: Duration,
}

impl Default for RunCycleOptions {
    fn default() -> Self {
        Self { max_iterations: 3, quality_threshold: 80.0, response_timeout: DEFAULT_RESPONSE_TIMEOUT }
    }
}

/// Render the `TASK:<ID>:<instruction>` wire line. The instruction is
/// rendered as plain text when it already is one, otherwise as compact
/// JSON.
fn render_task_line(task_id: &TaskId, instruction: &serde_json::Value) -> String {
    let body = instruction.as_str().map(str::to_string).unwrap_or_else(|| instruction.to_string());
    format!("TASK:{task_id}:{body}")
}

/// Dispatch one task: format (C4 convention), deliver through the pane
/// (C5), persist through the router (C2), optionally await a pane
/// response. Free function (not a method) so it can be driven inside a
/// spawned task for `send_parallel` without borrowing `&self`.
async fn dispatch_task(
    router: Arc<Router>,
    pane: Arc<PaneTransport>,
    worker: String,
    task_id: TaskId,
    instruction: serde_json::Value,
    opts: SendTaskOptions,
    ttl: chrono::Duration,
) -> TaskResult {
    let line = render_task_line(&task_id, &instruction);
    let now = Utc::now();

    let pane_outcome = if opts.wait_for_response {
        pane.send_command_await(&worker, &line, opts.response_timeout).await.map(Some)
    } else {
        pane.send_line(&worker, &line).await.map(|_| None)
    };

    let pane_outcome = match pane_outcome {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::warn!(worker, task_id = %task_id, error = %err, "pane transport failed on dispatch");
            return TaskResult::error(task_id, worker, err.to_string());
        }
    };

    tracing::info!(
        from = "coordinator",
        to = %worker,
        kind = ?opts.kind,
        task_id = %task_id,
        "dispatched task"
    );

    match Message::new(
        "coordinator",
        &worker,
        opts.kind,
        opts.priority,
        instruction,
        now,
        now + ttl,
        None,
    ) {
        Ok(message) => {
            if let Err(err) = router.send(&message, now) {
                tracing::warn!(worker, task_id = %task_id, error = %err, "failed to persist task to the Comb");
            }
        }
        Err(err) => tracing::warn!(worker, task_id = %task_id, error = %err, "failed to build task message"),
    }

    match pane_outcome {
        None => TaskResult::ok(task_id, worker, serde_json::Value::Null),
        Some(response) if response.ok => {
            tracing::info!(from = %worker, to = "coordinator", task_id = %task_id, "received task response");
            TaskResult::ok(task_id, worker, serde_json::Value::String(response.response))
        }
        Some(response) => TaskResult::timeout(task_id, worker, response.response),
    }
}

/// Drives `send_task`/`send_parallel`/`run_cycle` over the Comb's Router
/// and the Pane Transport, gated by a pluggable [`QualityAssessor`].
pub struct CoordinationLoop {
    router: Arc<Router>,
    pane: Arc<PaneTransport>,
    watch: Arc<WatchLog>,
    assessor: Arc<dyn QualityAssessor>,
    ttl: chrono::Duration,
    cancel: CancellationToken,
}

impl CoordinationLoop {
    pub fn new(
        router: Arc<Router>,
        pane: Arc<PaneTransport>,
        watch: Arc<WatchLog>,
        assessor: Arc<dyn QualityAssessor>,
    ) -> Self {
        Self { router, pane, watch, assessor, ttl: DEFAULT_TTL, cancel: CancellationToken::new() }
    }

    pub fn with_ttl(mut self, ttl: chrono::Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// A clone of the internal cancellation signal; calling `.cancel()` on
    /// it stops `run_cycle` between iterations. There
    /// is no hard cancel — an in-flight pane await always finishes.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn record(&self, event: WatchEvent) {
        if let Err(err) = self.watch.record(event) {
            tracing::warn!(error = %err, "failed to append watch log entry");
        }
    }

    /// Single-shot dispatch.
    pub async fn send_task(
        &self,
        worker: &str,
        instruction: serde_json::Value,
        opts: SendTaskOptions,
    ) -> TaskResult {
        let task_id = TaskId::new();
        self.record(WatchEvent::new(Utc::now(), "coordinator", worker, "send", format!("dispatch {task_id}")));
        let result =
            dispatch_task(self.router.clone(), self.pane.clone(), worker.to_string(), task_id, instruction, opts, self.ttl)
                .await;
        self.record(WatchEvent::new(
            Utc::now(),
            worker,
            "coordinator",
            "receive",
            format!("{:?}", result.status),
        ));
        result
    }

    /// Fan out concurrently to multiple workers. An individual failure
    /// becomes a `status=Error` result at its own index; it never cancels
    /// the rest of the batch.
    pub async fn send_parallel(&self, tasks: Vec<ParallelTask>) -> Vec<TaskResult> {
        let total = tasks.len();
        self.record(WatchEvent::new(Utc::now(), "coordinator", "*", "parallel_begin", format!("{total} tasks")));

        let mut set = tokio::task::JoinSet::new();
        for (index, task) in tasks.into_iter().enumerate() {
            let router = self.router.clone();
            let pane = self.pane.clone();
            let ttl = self.ttl;
            let task_id = TaskId::new();
            set.spawn(async move {
                let result =
                    dispatch_task(router, pane, task.worker, task_id, task.instruction, task.opts, ttl).await;
                (index, result)
            });
        }

        let mut results: Vec<Option<TaskResult>> = (0..total).map(|_| None).collect();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, result)) => results[index] = Some(result),
                Err(join_err) => {
                    tracing::warn!(error = %join_err, "a parallel dispatch task did not complete");
                }
            }
        }

        self.record(WatchEvent::new(Utc::now(), "*", "coordinator", "parallel_end", format!("{total} tasks")));
        results
            .into_iter()
            .enumerate()
            .map(|(index, r)| {
                r.unwrap_or_else(|| TaskResult::error(TaskId::new(), format!("task-{index}"), "dispatch task panicked"))
            })
            .collect()
    }

    /// The iterative dispatch/execute/evaluate/gate/feedback cycle. Always
    /// terminates within `opts.max_iterations`, regardless of assessor
    /// behavior.
    pub async fn run_cycle(
        &self,
        worker: &str,
        spec: serde_json::Value,
        opts: RunCycleOptions,
    ) -> CycleResult {
        let mut spec = spec;
        let mut last_score = 0.0;

        for i in 1..=opts.max_iterations {
            if self.cancel.is_cancelled() {
                return CycleResult {
                    success: false,
                    iterations: i - 1,
                    last_score,
                    reason: Some("cancelled".to_string()),
                };
            }

            self.record(WatchEvent::new(Utc::now(), "coordinator", worker, "cycle_begin", format!("iteration {i}")));

            let task_id = TaskId::new();
            let augmented = augment_spec(&spec, i, opts.max_iterations, opts.quality_threshold);
            let send_opts = SendTaskOptions {
                kind: MessageKind::TaskAssignment,
                priority: Priority::Normal,
                wait_for_response: true,
                response_timeout: opts.response_timeout,
            };
            let result = dispatch_task(
                self.router.clone(),
                self.pane.clone(),
                worker.to_string(),
                task_id.clone(),
                augmented.clone(),
                send_opts,
                self.ttl,
            )
            .await;

            let task = Task {
                id: task_id,
                target_worker: worker.to_string(),
                instruction: augmented,
                deadline: Utc::now() + self.ttl,
                iteration_index: i,
                max_iterations: opts.max_iterations,
                quality_threshold: opts.quality_threshold,
            };

            let assessment = match result.status {
                TaskStatus::Error => QualityAssessment {
                    score: 0.0,
                    issues: vec![result.error.clone().unwrap_or_else(|| "transport error".to_string())],
                    suggestions: Vec::new(),
                },
                TaskStatus::Ok | TaskStatus::Timeout => match self.assessor.assess(&task, &result).await {
                    Ok(a) => a,
                    Err(e) => QualityAssessment {
                        score: 0.0,
                        issues: vec![format!("assessor failed: {e}")],
                        suggestions: Vec::new(),
                    },
                },
            };
            last_score = assessment.score;

            if assessment.score >= opts.quality_threshold {
                self.send_gate_message(worker, "approval", &assessment).await;
                tracing::info!(
                    from = "coordinator",
                    to = %worker,
                    kind = ?MessageKind::Notification,
                    iteration = i,
                    score = assessment.score,
                    "cycle approved"
                );
                self.record(WatchEvent::new(Utc::now(), "coordinator", worker, "cycle_end", format!("approved at {i}")));
                return CycleResult::approved(i, assessment.score);
            }

            self.send_gate_message(worker, "feedback", &assessment).await;
            self.record(WatchEvent::new(
                Utc::now(),
                "coordinator",
                worker,
                "feedback",
                format!("score {} below {}", assessment.score, opts.quality_threshold),
            ));
            spec = enrich_spec(spec, i, &assessment);
        }

        CycleResult::exhausted(opts.max_iterations, last_score)
    }

    async fn send_gate_message(&self, worker: &str, kind: &str, assessment: &QualityAssessment) {
        let now = Utc::now();
        let body = serde_json::json!({
            "gate": kind,
            "score": assessment.score,
            "issues": assessment.issues,
            "suggestions": assessment.suggestions,
        });
        if let Ok(message) = Message::new(
            "coordinator",
            worker,
            MessageKind::Notification,
            Priority::Normal,
            body,
            now,
            now + self.ttl,
            None,
        ) {
            if let Err(err) = self.router.send(&message, now) {
                tracing::warn!(worker, %err, "failed to persist gate message");
            }
        }
    }
}

/// Augment `spec` with iteration context before the next dispatch.
fn augment_spec(spec: &serde_json::Value, iteration: u32, max_iterations: u32, quality_threshold: f64) -> serde_json::Value {
    let mut augmented = spec.clone();
    if let serde_json::Value::Object(map) = &mut augmented {
        map.insert("iteration_index".to_string(), serde_json::json!(iteration));
        map.insert("max_iterations".to_string(), serde_json::json!(max_iterations));
        map.insert("quality_threshold".to_string(), serde_json::json!(quality_threshold));
    } else {
        augmented = serde_json::json!({
            "original": spec,
            "iteration_index": iteration,
            "max_iterations": max_iterations,
            "quality_threshold": quality_threshold,
        });
    }
    augmented
}

/// Fold the previous attempt's assessment into `spec` as feedback for the
/// next dispatch.
fn enrich_spec(spec: serde_json::Value, iteration: u32, assessment: &QualityAssessment) -> serde_json::Value {
    let mut spec = spec;
    if let serde_json::Value::Object(map) = &mut spec {
        map.insert(
            "previous_attempt".to_string(),
            serde_json::json!({
                "iteration": iteration,
                "score": assessment.score,
                "issues": assessment.issues,
                "suggestions": assessment.suggestions,
            }),
        );
    }
    spec
}

#[cfg(test)]
#[path = "coordination_tests.rs"]
mod tests;
