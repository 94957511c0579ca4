use std::sync::atomic::Ordering;
use std::thread;
use std::time::{Duration, Instant};

use super::worker::{LoopStatus, LoopWorker, MAX_PERIOD, period_for};

fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    false
}

#[test]
fn worker_runs_until_stopped() {
    let mut worker = LoopWorker::spawn("test-loop", |stop| {
        while !stop.load(Ordering::Acquire) {
            thread::sleep(Duration::from_millis(1));
        }
    });
    assert_eq!(worker.status(), LoopStatus::Running);
    worker.shutdown();
    assert_eq!(worker.status(), LoopStatus::Stopped);
}

#[test]
fn panicked_worker_reports_stalled() {
    let mut worker = LoopWorker::spawn("test-panic", |_stop| panic!("boom"));
    assert!(wait_until(|| worker.status() == LoopStatus::Stalled));
    worker.shutdown();
    assert_eq!(worker.status(), LoopStatus::Stalled);
}

#[test]
fn failed_spawn_reports_stalled() {
    let worker = LoopWorker::failed("test-failed", &"no threads");
    assert_eq!(worker.status(), LoopStatus::Stalled);
}

#[test]
fn period_is_capped_for_tiny_rates() {
    assert_eq!(period_for(20.0), Duration::from_millis(50));
    assert_eq!(period_for(0.01), MAX_PERIOD);
    assert_eq!(period_for(f32::MIN_POSITIVE / 4.0), MAX_PERIOD);
}
