//! End-to-end coverage of the Pane Transport and daemon supervision (C5)
//! through the `hive` façade: session setup, daemon start/stop/restart,
//! and health checks.

use crate::support::test_hive;
use hive::DaemonState;
use std::time::Duration;

#[tokio::test]
async fn start_daemon_waits_for_a_ready_marker_then_reports_running() {
    let (_dir, hive, mux) = test_hive();
    hive.ensure_session(&["dev".to_string()]).await.expect("ensure_session");
    mux.push_output("hive-specs:dev", &["Loading...", "claude>"]);

    let ready = hive.start_daemon("dev", "claude --dangerously-skip-permissions", Duration::from_secs(2)).await.expect("start_daemon");
    assert!(ready);
    assert_eq!(hive.pane("dev").expect("pane").daemon_state, DaemonState::Running);
}

#[tokio::test]
async fn start_daemon_times_out_and_reports_false_when_no_marker_ever_appears() {
    let (_dir, hive, _mux) = test_hive();
    hive.ensure_session(&["dev".to_string()]).await.expect("ensure_session");

    let ready = hive.start_daemon("dev", "something odd", Duration::from_millis(50)).await.expect("start_daemon");
    assert!(!ready);
}

#[tokio::test]
async fn health_check_succeeds_once_a_response_is_captured() {
    let (_dir, hive, mux) = test_hive();
    hive.ensure_session(&["dev".to_string()]).await.expect("ensure_session");

    let pusher = {
        let mux = mux.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            mux.push_output("hive-specs:dev", &["pong $"]);
        })
    };
    let healthy = hive.health_check("dev").await.expect("health_check");
    pusher.await.expect("pusher task");
    assert!(healthy);
}

#[tokio::test]
async fn stop_daemon_marks_it_stopped_and_restart_brings_it_back() {
    let (_dir, hive, mux) = test_hive();
    hive.ensure_session(&["dev".to_string()]).await.expect("ensure_session");
    mux.push_output("hive-specs:dev", &["claude>"]);
    assert!(hive.start_daemon("dev", "claude", Duration::from_secs(1)).await.expect("start"));

    hive.stop_daemon("dev").await.expect("stop_daemon");
    assert_eq!(hive.pane("dev").expect("pane").daemon_state, DaemonState::Stopped);

    mux.push_output("hive-specs:dev", &["claude>"]);
    let restarted = hive.restart_daemon("dev", "claude", Duration::from_secs(1)).await.expect("restart_daemon");
    assert!(restarted);
    assert_eq!(hive.pane("dev").expect("pane").daemon_state, DaemonState::Running);
}

#[tokio::test]
async fn start_all_daemons_only_starts_panes_that_exist_in_the_session() {
    let (_dir, hive, mux) = test_hive();
    hive.ensure_session(&["dev".to_string(), "scout".to_string()]).await.expect("ensure_session");
    mux.push_output("hive-specs:dev", &["claude>"]);
    mux.push_output("hive-specs:scout", &["claude>"]);

    let mut commands = std::collections::HashMap::new();
    commands.insert("dev".to_string(), "claude".to_string());
    commands.insert("scout".to_string(), "claude".to_string());
    commands.insert("ghost".to_string(), "claude".to_string());

    let results = hive.start_all_daemons(&commands, Duration::from_secs(1)).await;
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|(_, ready)| *ready));

    hive.stop_all_daemons().await;
    assert_eq!(hive.pane("dev").expect("pane").daemon_state, DaemonState::Stopped);
    assert_eq!(hive.pane("scout").expect("pane").daemon_state, DaemonState::Stopped);
}
