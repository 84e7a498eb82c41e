//! End-to-end coverage of the Sync Manager (C3) through the `hive`
//! façade: reentrant locks, barriers, and forced release.

use crate::support::test_hive;
use std::time::Duration;

#[test]
fn the_same_holder_may_reacquire_a_lock_it_already_holds() {
    let (_dir, hive, _mux) = test_hive();
    assert!(hive.acquire("shared-config", "dev", Duration::from_secs(1)));
    // Reentrant: same holder, same resource, does not deadlock against itself.
    assert!(hive.acquire("shared-config", "dev", Duration::from_secs(1)));
    assert_eq!(hive.holder("shared-config").as_deref(), Some("dev"));
}

#[test]
fn a_different_holder_is_blocked_until_release() {
    let (_dir, hive, _mux) = test_hive();
    assert!(hive.acquire("shared-config", "dev", Duration::from_secs(1)));
    assert!(!hive.acquire("shared-config", "scout", Duration::from_millis(100)));
    assert!(hive.is_locked("shared-config"));

    assert!(hive.release("shared-config", "dev"));
    assert!(!hive.is_locked("shared-config"));
    assert!(hive.acquire("shared-config", "scout", Duration::from_secs(1)));
}

#[test]
fn a_barrier_releases_only_once_every_expected_worker_has_arrived() {
    let (_dir, hive, _mux) = test_hive();
    hive.create_barrier("phase-1-done", 3);

    // Each of these calls is made with nobody else concurrently arriving,
    // so the first two see only 1-of-3 and 2-of-3 arrived and must time
    // out rather than release early.
    assert!(!hive.wait_at_barrier("phase-1-done", "dev", Duration::from_millis(50)));
    assert!(!hive.wait_at_barrier("phase-1-done", "scout", Duration::from_millis(50)));
    // The third distinct arrival brings the count to the expected 3: this
    // call observes the release immediately, no timeout needed.
    assert!(hive.wait_at_barrier("phase-1-done", "builder", Duration::from_millis(50)));
}

#[test]
fn force_release_by_drops_every_lock_held_by_a_crashed_worker() {
    let (_dir, hive, _mux) = test_hive();
    assert!(hive.acquire("resource-a", "dev", Duration::from_secs(1)));
    assert!(hive.acquire("resource-b", "dev", Duration::from_secs(1)));
    assert!(hive.acquire("resource-c", "scout", Duration::from_secs(1)));

    let released = hive.force_release_by("dev");
    assert_eq!(released, 2);
    assert!(!hive.is_locked("resource-a"));
    assert!(!hive.is_locked("resource-b"));
    assert!(hive.is_locked("resource-c"));
}
