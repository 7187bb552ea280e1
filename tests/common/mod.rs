#![allow(dead_code)]

pub use crank_test_utils::builders;
pub use crank_test_utils::fake_work::{FakeWork, FakeWorkManager};
pub use crank_test_utils::init_tracing;
pub use crank_test_utils::recording::{ObserverCall, RecordingLog, RecordingObserver};

use crank::dag::{NodeCounts, WorkGraph};

/// `NodeCounts` in field order: waiting, pending, running, success, error,
/// summed wait count.
pub fn counts(
    waiting: usize,
    pending: usize,
    running: usize,
    success: usize,
    error: usize,
    wait_count: usize,
) -> NodeCounts {
    NodeCounts {
        waiting,
        pending,
        running,
        success,
        error,
        wait_count,
    }
}

/// Assert both partitions and re-verify every invariant by full scan.
#[track_caller]
pub fn check_counts(g: &WorkGraph, live: NodeCounts, dead: NodeCounts) {
    assert_eq!(g.live_counts(), live, "live counts wrong");
    assert_eq!(g.dead_counts(), dead, "dead counts wrong");
    if let Err(err) = g.check_invariants() {
        panic!("invariant violated: {err}");
    }
}
