// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::assessor::StubAssessor;
use crate::watch::WatchLog;
use hive_comb::{FsSubstrate, Router};
use hive_pane::{FakeMuxDriver, PaneTransport};
use std::sync::Arc;
use std::time::Duration;

struct Harness {
    _dir: tempfile::TempDir,
    router: Arc<Router>,
    pane: Arc<PaneTransport>,
    watch: Arc<WatchLog>,
    mux: Arc<FakeMuxDriver>,
}

async fn harness(workers: &[&str]) -> Harness {
    let dir = tempfile::tempdir().expect("tempdir");
    let fs = Arc::new(FsSubstrate::new(dir.path()));
    fs.ensure_structure().expect("ensure_structure");
    let router = Arc::new(Router::new(fs.clone()));
    let watch = Arc::new(WatchLog::new(fs));
    let mux = Arc::new(FakeMuxDriver::new());
    let pane = Arc::new(PaneTransport::new(mux.clone(), "hive-test"));
    let names: Vec<String> = workers.iter().map(|w| w.to_string()).collect();
    pane.ensure_session(&names).await.expect("ensure_session");
    Harness { _dir: dir, router, pane, watch, mux }
}

fn loop_with(h: &Harness, assessor: Arc<dyn QualityAssessor>) -> CoordinationLoop {
    CoordinationLoop::new(h.router.clone(), h.pane.clone(), h.watch.clone(), assessor)
}

#[tokio::test]
async fn send_task_fire_and_forget_writes_the_wire_line_and_persists_a_message() {
    let h = harness(&["dev"]).await;
    let assessor: Arc<dyn QualityAssessor> = Arc::new(StubAssessor::new(vec![100.0]));
    let coord = loop_with(&h, assessor);

    let result = coord
        .send_task("dev", serde_json::json!("fix the login bug"), SendTaskOptions::default())
        .await;

    assert_eq!(result.status, hive_core::TaskStatus::Ok);
    let sent = h.mux.sent_lines("hive-test:dev");
    assert_eq!(sent.len(), 1);
    assert!(sent[0].starts_with(&format!("TASK:{}:", result.task_id)));
    assert!(sent[0].ends_with("fix the login bug"));

    // A durable copy landed in dev's inbox too (Transparent Wrapper discipline).
    let delivered = h.router.receive("dev", chrono::Utc::now());
    assert_eq!(delivered.len(), 1);
}

#[tokio::test]
async fn send_task_await_returns_the_captured_pane_response() {
    let h = harness(&["dev"]).await;
    let mux = h.mux.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        mux.push_output("hive-test:dev", &["working on it...", "done $"]);
    });
    let assessor: Arc<dyn QualityAssessor> = Arc::new(StubAssessor::new(vec![100.0]));
    let coord = loop_with(&h, assessor);

    let opts = SendTaskOptions { wait_for_response: true, response_timeout: Duration::from_secs(2), ..Default::default() };
    let result = coord.send_task("dev", serde_json::json!("ping"), opts).await;

    assert_eq!(result.status, hive_core::TaskStatus::Ok);
    let response = result.response.expect("response present").as_str().unwrap_or_default().to_string();
    assert!(response.contains("done"));
}

#[tokio::test]
async fn send_task_to_unknown_pane_is_an_error_result_not_a_panic() {
    let h = harness(&["dev"]).await;
    let assessor: Arc<dyn QualityAssessor> = Arc::new(StubAssessor::new(vec![100.0]));
    let coord = loop_with(&h, assessor);

    let result = coord.send_task("ghost", serde_json::json!("hello"), SendTaskOptions::default()).await;
    assert_eq!(result.status, hive_core::TaskStatus::Error);
}

#[tokio::test]
async fn send_parallel_preserves_per_task_identity_and_isolates_failures() {
    let h = harness(&["dev", "reviewer"]).await;
    let assessor: Arc<dyn QualityAssessor> = Arc::new(StubAssessor::new(vec![100.0]));
    let coord = loop_with(&h, assessor);

    let tasks = vec![
        ParallelTask { worker: "dev".to_string(), instruction: serde_json::json!("a"), opts: SendTaskOptions::default() },
        ParallelTask { worker: "reviewer".to_string(), instruction: serde_json::json!("b"), opts: SendTaskOptions::default() },
        ParallelTask { worker: "ghost".to_string(), instruction: serde_json::json!("c"), opts: SendTaskOptions::default() },
    ];

    let results = coord.send_parallel(tasks).await;
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].status, hive_core::TaskStatus::Ok);
    assert_eq!(results[1].status, hive_core::TaskStatus::Ok);
    assert_eq!(results[2].status, hive_core::TaskStatus::Error);
}

#[tokio::test]
async fn run_cycle_approves_once_the_quality_threshold_is_met() {
    let h = harness(&["dev"]).await;
    h.mux.push_output("hive-test:dev", &["> "]);
    let assessor: Arc<dyn QualityAssessor> = Arc::new(StubAssessor::new(vec![60.0, 75.0, 92.0]));
    let coord = loop_with(&h, assessor);

    let opts = RunCycleOptions { max_iterations: 3, quality_threshold: 90.0, response_timeout: Duration::from_millis(50) };
    let result = coord.run_cycle("dev", serde_json::json!({ "goal": "ship it" }), opts).await;

    assert!(result.success);
    assert_eq!(result.iterations, 3);
    assert_eq!(result.last_score, 92.0);

    let contents = std::fs::read_to_string(h.watch.path()).expect("watch log exists");
    let dispatch_events = contents.lines().filter(|l| l.contains("cycle_begin")).count();
    let feedback_events = contents.lines().filter(|l| l.contains("\"feedback\"")).count();
    assert_eq!(dispatch_events, 3);
    assert_eq!(feedback_events, 2);
}

#[tokio::test]
async fn run_cycle_exhausts_max_iterations_when_the_gate_is_never_met() {
    let h = harness(&["dev"]).await;
    h.mux.push_output("hive-test:dev", &["> "]);
    let assessor: Arc<dyn QualityAssessor> = Arc::new(StubAssessor::new(vec![10.0]));
    let coord = loop_with(&h, assessor);

    let opts = RunCycleOptions { max_iterations: 3, quality_threshold: 90.0, response_timeout: Duration::from_millis(50) };
    let result = coord.run_cycle("dev", serde_json::json!({ "goal": "ship it" }), opts).await;

    assert!(!result.success);
    assert_eq!(result.iterations, 3);
    assert_eq!(result.reason.as_deref(), Some("max_iterations_exceeded"));
}

#[tokio::test]
async fn run_cycle_respects_cooperative_cancellation_between_iterations() {
    let h = harness(&["dev"]).await;
    h.mux.push_output("hive-test:dev", &["> "]);
    let assessor: Arc<dyn QualityAssessor> = Arc::new(StubAssessor::new(vec![10.0]));
    let coord = loop_with(&h, assessor);
    coord.cancellation_token().cancel();

    let opts = RunCycleOptions { max_iterations: 5, quality_threshold: 90.0, response_timeout: Duration::from_millis(50) };
    let result = coord.run_cycle("dev", serde_json::json!({}), opts).await;

    assert!(!result.success);
    assert_eq!(result.iterations, 0);
    assert_eq!(result.reason.as_deref(), Some("cancelled"));
}

#[tokio::test]
async fn run_cycle_treats_an_assessor_error_as_score_zero_and_keeps_going() {
    struct FailingAssessor;
    #[async_trait::async_trait]
    impl QualityAssessor for FailingAssessor {
        async fn assess(
            &self,
            _task: &hive_core::Task,
            _result: &hive_core::TaskResult,
        ) -> Result<hive_core::QualityAssessment, String> {
            Err("boom".to_string())
        }
    }

    let h = harness(&["dev"]).await;
    h.mux.push_output("hive-test:dev", &["> "]);
    let assessor: Arc<dyn QualityAssessor> = Arc::new(FailingAssessor);
    let coord = loop_with(&h, assessor);

    let opts = RunCycleOptions { max_iterations: 2, quality_threshold: 50.0, response_timeout: Duration::from_millis(50) };
    let result = coord.run_cycle("dev", serde_json::json!({}), opts).await;

    assert!(!result.success);
    assert_eq!(result.iterations, 2);
    assert_eq!(result.last_score, 0.0);
}
