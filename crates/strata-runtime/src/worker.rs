use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Longest sleep between two ticks of a loop, so a stop request is seen promptly.
pub(crate) const MAX_PERIOD: Duration = Duration::from_secs(1);

/// Tick period for a rate in Hz, capped at `MAX_PERIOD`.
pub(crate) fn period_for(hz: f32) -> Duration {
    Duration::try_from_secs_f32(1.0 / hz).map_or(MAX_PERIOD, |p| p.min(MAX_PERIOD))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopStatus {
    Running,
    Stopped,
    /// The loop never started or died without being asked to stop.
    Stalled,
}

/// A named background thread that runs until its stop flag is raised.
pub(crate) struct LoopWorker {
    name: &'static str,
    stop: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
    faulted: bool,
    warned: AtomicBool,
}

impl LoopWorker {
    pub(crate) fn spawn<F>(name: &'static str, body: F) -> Self
    where
        F: FnOnce(Arc<AtomicBool>) + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        match thread::Builder::new().name(name.to_string()).spawn(move || body(flag)) {
            Ok(join) => {
                log::info!(target: "runtime", "{name} loop started");
                Self {
                    name,
                    stop,
                    join: Some(join),
                    faulted: false,
                    warned: AtomicBool::new(false),
                }
            }
            Err(e) => Self::failed(name, &e),
        }
    }

    /// A worker that could not be started; reports `Stalled`.
    pub(crate) fn failed(name: &'static str, err: &dyn std::fmt::Display) -> Self {
        log::warn!(target: "runtime", "{name} loop failed to start: {err}");
        Self {
            name,
            stop: Arc::new(AtomicBool::new(true)),
            join: None,
            faulted: true,
            warned: AtomicBool::new(true),
        }
    }

    pub(crate) fn status(&self) -> LoopStatus {
        match &self.join {
            None if self.faulted => LoopStatus::Stalled,
            None => LoopStatus::Stopped,
            Some(h) if !h.is_finished() => LoopStatus::Running,
            Some(_) if self.stop.load(Ordering::Acquire) => LoopStatus::Stopped,
            Some(_) => {
                if !self.warned.swap(true, Ordering::AcqRel) {
                    log::warn!(target: "runtime", "{} loop exited unexpectedly", self.name);
                }
                LoopStatus::Stalled
            }
        }
    }

    pub(crate) fn request_stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    /// Raises the stop flag and waits for the current tick to finish.
    pub(crate) fn shutdown(&mut self) {
        self.request_stop();
        if let Some(join) = self.join.take() {
            if join.join().is_err() {
                log::warn!(target: "runtime", "{} loop panicked", self.name);
                self.faulted = true;
            } else {
                log::info!(target: "runtime", "{} loop stopped", self.name);
            }
        }
    }
}

impl Drop for LoopWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}
