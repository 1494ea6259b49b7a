//! Periodic tick driver shared by all simulators
//!
//! A handle owns the simulator behind a `RwLock` and at most one tokio task
//! that ticks it on an interval. The tick holds the write lock for its whole
//! duration, so readers only ever see the state between two complete ticks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::core::error::{Result, TrackerError};
use crate::telemetry::Telemetry;

/// One domain simulator
pub trait Simulator: Send + Sync + 'static {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Wall-clock period between ticks
    fn tick_interval(&self) -> Duration;

    /// Advance the state to `now` and publish telemetry
    fn tick(&mut self, now: DateTime<Utc>, telemetry: &Telemetry);
}

struct Worker {
    handle: JoinHandle<()>,
    cancelled: Arc<AtomicBool>,
}

/// Owned simulator plus its optional background tick task
pub struct SimulatorHandle<S: Simulator> {
    state: Arc<RwLock<S>>,
    telemetry: Telemetry,
    worker: Mutex<Option<Worker>>,
}

impl<S: Simulator> SimulatorHandle<S> {
    pub fn new(simulator: S, telemetry: Telemetry) -> Self {
        Self {
            state: Arc::new(RwLock::new(simulator)),
            telemetry,
            worker: Mutex::new(None),
        }
    }

    /// Spawn the tick task on the current tokio runtime
    ///
    /// Starting a running simulator logs a warning and changes nothing.
    pub fn start(&self) -> Result<()> {
        let name = self.read(|sim| sim.name());
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|_| TrackerError::NoRuntime(name))?;

        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        if worker.is_some() {
            tracing::warn!(simulator = name, "simulator already running");
            return Ok(());
        }

        let period = self.read(|sim| sim.tick_interval());
        let cancelled = Arc::new(AtomicBool::new(false));
        let state = Arc::clone(&self.state);
        let telemetry = self.telemetry.clone();
        let flag = Arc::clone(&cancelled);

        let handle = runtime.spawn(async move {
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick completes immediately; the first update runs one period in
            interval.tick().await;

            loop {
                interval.tick().await;
                {
                    let mut sim = state.write().unwrap_or_else(PoisonError::into_inner);
                    if flag.load(Ordering::Acquire) {
                        break;
                    }
                    sim.tick(Utc::now(), &telemetry);
                }
            }
        });

        *worker = Some(Worker { handle, cancelled });
        tracing::info!(simulator = name, period_ms = period.as_millis() as u64, "simulator started");
        Ok(())
    }

    /// Cancel the tick task
    ///
    /// Idempotent and safe before `start()`. No tick runs after this returns.
    pub fn stop(&self) {
        let name = self.read(|sim| sim.name());
        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match worker {
            Some(worker) => {
                worker.cancelled.store(true, Ordering::Release);
                // Wait out any tick already holding the lock
                drop(self.state.write().unwrap_or_else(PoisonError::into_inner));
                worker.handle.abort();
                tracing::info!(simulator = name, "simulator stopped");
            }
            None => {
                tracing::warn!(simulator = name, "stop requested but simulator is not running");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Run one tick synchronously at `now`
    pub fn tick_at(&self, now: DateTime<Utc>) {
        let mut sim = self.state.write().unwrap_or_else(PoisonError::into_inner);
        sim.tick(now, &self.telemetry);
    }

    pub fn tick_now(&self) {
        self.tick_at(Utc::now());
    }

    /// Read from the current state; return owned data out of the closure
    pub fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        let sim = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&sim)
    }
}

impl<S: Simulator> Drop for SimulatorHandle<S> {
    fn drop(&mut self) {
        let worker = self
            .worker
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(worker) = worker {
            worker.cancelled.store(true, Ordering::Release);
            worker.handle.abort();
        }
    }
}
