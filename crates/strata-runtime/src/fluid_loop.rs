use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, TrySendError, bounded};
use strata_fluid::{FluidSolver, FluidTickStats};

use crate::worker::{LoopStatus, LoopWorker, period_for};

const REPORT_CAPACITY: usize = 256;

#[derive(Clone, Copy, Debug)]
pub struct FluidTickReport {
    pub tick: u64,
    pub stats: FluidTickStats,
    pub elapsed: Duration,
}

/// Runs `FluidSolver::tick` at the configured rate on its own thread and
/// re-presents the visible chunks after ticks that moved liquid.
pub struct FluidLoop {
    worker: LoopWorker,
    reports: Receiver<FluidTickReport>,
    ticks: Arc<AtomicU64>,
}

impl FluidLoop {
    pub fn spawn(solver: FluidSolver) -> Self {
        let (tx, rx) = bounded::<FluidTickReport>(REPORT_CAPACITY);
        let ticks = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&ticks);
        let period = period_for(solver.config().tick_hz);
        let worker = LoopWorker::spawn("strata-fluid", move |stop| {
            while !stop.load(Ordering::Acquire) {
                let t0 = Instant::now();
                let stats = solver.tick();
                if stats.changes > 0 {
                    solver.grid().refresh_visible();
                }
                let tick = counter.fetch_add(1, Ordering::Relaxed) + 1;
                let report = FluidTickReport {
                    tick,
                    stats,
                    elapsed: t0.elapsed(),
                };
                match tx.try_send(report) {
                    // Reports are advisory; a full channel drops this one.
                    Ok(()) | Err(TrySendError::Full(_)) => {}
                    Err(TrySendError::Disconnected(_)) => break,
                }
                thread::sleep(period.saturating_sub(t0.elapsed()));
            }
        });
        Self {
            worker,
            reports: rx,
            ticks,
        }
    }

    pub fn status(&self) -> LoopStatus {
        self.worker.status()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    pub fn drain_reports(&self) -> Vec<FluidTickReport> {
        self.reports.try_iter().collect()
    }

    pub fn shutdown(mut self) {
        self.worker.shutdown();
    }
}
