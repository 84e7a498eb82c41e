//! End-to-end coverage of the Message Router (C2) through the `hive`
//! façade: delivery ordering, respond/notify/error correlation, reaping,
//! and per-worker stats.

use crate::support::test_hive;
use chrono::Utc;
use hive::{Message, MessageKind, Priority};

#[test]
fn multiple_senders_fan_in_to_one_inbox_in_priority_then_fifo_order() {
    let (_dir, hive, _mux) = test_hive();
    let now = Utc::now();
    let ttl = now + chrono::Duration::minutes(5);

    for (from, priority) in [("queen", Priority::Normal), ("scout", Priority::Urgent), ("queen", Priority::Low)] {
        let m = Message::new(from, "dev", MessageKind::Notification, priority, serde_json::json!({ "from": from }), now, ttl, None)
            .expect("build message");
        hive.send(&m, now).expect("send");
    }

    let inbox = hive.receive("dev", now);
    assert_eq!(inbox.len(), 3);
    assert_eq!(inbox[0].priority, Priority::Urgent);
    assert_eq!(inbox[1].priority, Priority::Normal);
    assert_eq!(inbox[2].priority, Priority::Low);

    // A second receive finds nothing left — messages moved inbox -> sent.
    assert!(hive.receive("dev", now).is_empty());
}

#[test]
fn notify_and_error_both_carry_no_correlation_id() {
    let (_dir, hive, _mux) = test_hive();
    let now = Utc::now();

    let n = hive.notify("queen", "dev", serde_json::json!({ "status": "starting" }), None, now).expect("notify");
    assert_eq!(n.correlation_id, None);
    assert_eq!(n.kind, MessageKind::Notification);

    let e = hive.error("dev", "queen", "pane crashed", Some(serde_json::json!({ "code": 1 })), now).expect("error");
    assert_eq!(e.correlation_id, None);
    assert_eq!(e.kind, MessageKind::Error);

    let queen_inbox = hive.receive("queen", now);
    assert_eq!(queen_inbox.len(), 1);
    assert_eq!(queen_inbox[0].id, e.id);
}

#[test]
fn reap_expired_only_removes_messages_past_their_ttl() {
    let (_dir, hive, _mux) = test_hive();
    let now = Utc::now();

    let short_lived = Message::new(
        "queen",
        "dev",
        MessageKind::Notification,
        Priority::Normal,
        serde_json::Value::Null,
        now,
        now + chrono::Duration::milliseconds(1),
        None,
    )
    .expect("build");
    let long_lived = Message::new(
        "queen",
        "dev",
        MessageKind::Notification,
        Priority::Normal,
        serde_json::Value::Null,
        now,
        now + chrono::Duration::hours(1),
        None,
    )
    .expect("build");
    hive.send(&short_lived, now).expect("send short");
    hive.send(&long_lived, now).expect("send long");

    let later = now + chrono::Duration::seconds(1);
    let reaped = hive.reap_expired_messages(later);
    assert_eq!(reaped, 1);

    let inbox = hive.receive("dev", later);
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].id, long_lived.id);
}

#[test]
fn message_stats_reports_per_worker_sent_and_received_counts() {
    let (_dir, hive, _mux) = test_hive();
    let now = Utc::now();
    let ttl = now + chrono::Duration::minutes(5);

    let m = Message::new("queen", "dev", MessageKind::TaskAssignment, Priority::Normal, serde_json::json!({}), now, ttl, None)
        .expect("build");
    hive.send(&m, now).expect("send");
    hive.receive("dev", now);

    let stats = hive.message_stats();
    let dev = stats.get("dev").expect("dev should have stats");
    assert_eq!(dev.delivered, 1);
    let queen = stats.get("queen").expect("queen should have stats");
    assert_eq!(queen.sent, 1);
}
