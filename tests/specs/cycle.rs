//! End-to-end coverage of the Coordination Loop (C6) through the `hive`
//! façade: fire-and-forget dispatch, await-response dispatch, parallel
//! fan-out with isolated failures, and the `run_cycle` quality gate.

use crate::support::{test_hive, test_hive_with_scores};
use hive::{ParallelTask, RunCycleOptions, SendTaskOptions, TaskStatus};
use std::time::Duration;

#[tokio::test]
async fn fire_and_forget_send_task_writes_the_wire_line_without_waiting() {
    let (_dir, hive, mux) = test_hive();
    hive.ensure_session(&["dev".to_string()]).await.expect("ensure_session");

    let result = hive
        .send_task("dev", serde_json::json!("fix the login bug"), SendTaskOptions::default())
        .await;

    assert_eq!(result.status, TaskStatus::Ok);
    assert_eq!(result.response, Some(serde_json::Value::Null));
    let sent = mux.sent_lines("hive-specs:dev");
    assert_eq!(sent.len(), 1);
    assert!(sent[0].starts_with("TASK:"));
    assert!(sent[0].ends_with("fix the login bug"));
}

#[tokio::test]
async fn awaited_send_task_returns_the_response_captured_from_the_pane() {
    let (_dir, hive, mux) = test_hive();
    hive.ensure_session(&["dev".to_string()]).await.expect("ensure_session");

    let pusher = {
        let mux = mux.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            mux.push_output("hive-specs:dev", &["done $"]);
        })
    };

    let opts = SendTaskOptions { wait_for_response: true, response_timeout: Duration::from_secs(2), ..Default::default() };
    let result = hive.send_task("dev", serde_json::json!("run the tests"), opts).await;
    pusher.await.expect("pusher task");

    assert_eq!(result.status, TaskStatus::Ok);
    assert!(result.response.is_some());
}

#[tokio::test]
async fn dispatch_to_a_pane_that_was_never_created_fails_as_a_result_not_a_panic() {
    let (_dir, hive, _mux) = test_hive();
    // Deliberately skip ensure_session: "unknown-worker" has no pane handle.
    let result = hive.send_task("unknown-worker", serde_json::json!("do something"), SendTaskOptions::default()).await;
    assert_eq!(result.status, TaskStatus::Error);
    assert!(result.error.is_some());
}

#[tokio::test]
async fn send_parallel_keeps_each_tasks_identity_and_one_failure_does_not_sink_the_others() {
    let (_dir, hive, _mux) = test_hive();
    hive.ensure_session(&["dev".to_string(), "scout".to_string()]).await.expect("ensure_session");

    let tasks = vec![
        ParallelTask { worker: "dev".to_string(), instruction: serde_json::json!("task one"), opts: SendTaskOptions::default() },
        ParallelTask { worker: "scout".to_string(), instruction: serde_json::json!("task two"), opts: SendTaskOptions::default() },
        ParallelTask { worker: "nobody".to_string(), instruction: serde_json::json!("task three"), opts: SendTaskOptions::default() },
    ];

    let results = hive.send_parallel(tasks).await;
    assert_eq!(results.len(), 3);

    let by_worker: std::collections::HashMap<&str, &hive::TaskResult> =
        results.iter().map(|r| (r.worker.as_str(), r)).collect();
    assert_eq!(by_worker["dev"].status, TaskStatus::Ok);
    assert_eq!(by_worker["scout"].status, TaskStatus::Ok);
    assert_eq!(by_worker["nobody"].status, TaskStatus::Error);
}

#[tokio::test]
async fn run_cycle_stops_as_soon_as_the_quality_threshold_is_met() {
    let (_dir, hive, _mux) = test_hive_with_scores(vec![50.0, 65.0, 95.0, 10.0]);
    hive.ensure_session(&["dev".to_string()]).await.expect("ensure_session");

    let opts = RunCycleOptions { max_iterations: 4, quality_threshold: 90.0, response_timeout: Duration::from_millis(50) };
    let result = hive.run_cycle("dev", serde_json::json!({ "goal": "ship the feature" }), opts).await;

    assert!(result.success);
    assert_eq!(result.iterations, 3);
    assert_eq!(result.last_score, 95.0);
}

#[tokio::test]
async fn run_cycle_reports_exhaustion_when_the_gate_is_never_met() {
    let (_dir, hive, _mux) = test_hive_with_scores(vec![40.0, 45.0]);
    hive.ensure_session(&["dev".to_string()]).await.expect("ensure_session");

    let opts = RunCycleOptions { max_iterations: 2, quality_threshold: 90.0, response_timeout: Duration::from_millis(50) };
    let result = hive.run_cycle("dev", serde_json::json!({ "goal": "ship the feature" }), opts).await;

    assert!(!result.success);
    assert_eq!(result.iterations, 2);
    assert_eq!(result.reason.as_deref(), Some("max_iterations_exceeded"));
}

#[tokio::test]
async fn run_cycle_honors_cooperative_cancellation_between_iterations() {
    let (_dir, hive, _mux) = test_hive_with_scores(vec![40.0, 95.0]);
    hive.ensure_session(&["dev".to_string()]).await.expect("ensure_session");
    hive.cancellation_token().cancel();

    let opts = RunCycleOptions { max_iterations: 3, quality_threshold: 90.0, response_timeout: Duration::from_millis(50) };
    let result = hive.run_cycle("dev", serde_json::json!({ "goal": "ship the feature" }), opts).await;

    assert!(!result.success);
    assert_eq!(result.iterations, 0);
    assert_eq!(result.reason.as_deref(), Some("cancelled"));
}
