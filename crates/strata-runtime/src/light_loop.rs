use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use rayon::ThreadPoolBuilder;
use strata_chunk::BlockRect;
use strata_lighting::{LightField, LightSink, Lighting};

use crate::worker::{LoopStatus, LoopWorker, period_for};

const IDLE_SLEEP: Duration = Duration::from_millis(2);

/// Recomputes the light field whenever the visible window or the grid
/// revision moves, at most `max_hz` times per second.
///
/// The result channel holds one field. A new field replaces an unread one, so
/// the consumer never falls behind the grid.
pub struct LightLoop {
    worker: LoopWorker,
    fields: Receiver<Arc<LightField>>,
    last: Mutex<Option<Arc<LightField>>>,
    computed: Arc<AtomicU64>,
}

impl LightLoop {
    pub fn spawn(lighting: Lighting, sink: Option<Arc<dyn LightSink>>) -> Self {
        let (tx, rx) = bounded::<Arc<LightField>>(1);
        let stale = rx.clone();
        let computed = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&computed);
        let workers = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
            .saturating_sub(1)
            .max(1);
        let pool = match ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("strata-light-{i}"))
            .build()
        {
            Ok(pool) => pool,
            Err(e) => {
                return Self {
                    worker: LoopWorker::failed("strata-light", &e),
                    fields: rx,
                    last: Mutex::new(None),
                    computed,
                };
            }
        };
        let min_period = period_for(lighting.config().max_hz);
        let grid = Arc::clone(lighting.grid());
        let worker = LoopWorker::spawn("strata-light", move |stop| {
            let mut last: Option<(BlockRect, u64)> = None;
            while !stop.load(Ordering::Acquire) {
                let t0 = Instant::now();
                let key = grid.visible_window().map(|w| (w, grid.revision()));
                let Some((window, rev)) = key.filter(|k| Some(*k) != last) else {
                    thread::sleep(IDLE_SLEEP);
                    continue;
                };
                let field = Arc::new(pool.install(|| lighting.compute_window(window)));
                last = Some((window, rev));
                counter.fetch_add(1, Ordering::Relaxed);
                if let Some(sink) = &sink {
                    sink.on_light_field(Arc::clone(&field));
                }
                if !publish(&tx, &stale, field) {
                    break;
                }
                thread::sleep(min_period.saturating_sub(t0.elapsed()));
            }
        });
        Self {
            worker,
            fields: rx,
            last: Mutex::new(None),
            computed,
        }
    }

    pub fn status(&self) -> LoopStatus {
        self.worker.status()
    }

    /// Fields computed since the loop started.
    pub fn computed(&self) -> u64 {
        self.computed.load(Ordering::Relaxed)
    }

    /// Newest computed field. Keeps returning it until a newer one arrives.
    pub fn latest(&self) -> Option<Arc<LightField>> {
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(field) = self.fields.try_iter().last() {
            *last = Some(field);
        }
        last.clone()
    }

    pub fn shutdown(mut self) {
        self.worker.shutdown();
    }
}

/// Sends `field`, evicting an unread older field if the slot is taken.
/// Returns false once the receiving side is gone.
fn publish(
    tx: &Sender<Arc<LightField>>,
    stale: &Receiver<Arc<LightField>>,
    mut field: Arc<LightField>,
) -> bool {
    loop {
        match tx.try_send(field) {
            Ok(()) => return true,
            Err(TrySendError::Full(back)) => {
                let _ = stale.try_recv();
                field = back;
            }
            Err(TrySendError::Disconnected(_)) => return false,
        }
    }
}
