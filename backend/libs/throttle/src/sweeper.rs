//! Throttle Sweeper Background Job
//!
//! Periodically evicts expired records from the [`ThrottleStore`] so memory
//! stays bounded by the number of subjects active within one window.
//!
//! The sweep never changes what `check` observes: `check` already treats an
//! expired record as absent. It only reclaims space.

use crate::clock::SharedClock;
use crate::metrics::ThrottleMetrics;
use crate::store::ThrottleStore;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

/// Default sweep period (10 minutes)
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

pub struct SweepScheduler {
    store: Arc<ThrottleStore>,
    clock: SharedClock,
    interval: Duration,
}

impl SweepScheduler {
    pub fn new(store: Arc<ThrottleStore>, clock: SharedClock, interval: Duration) -> Self {
        Self {
            store,
            clock,
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run a single sweep at the clock's current instant
    ///
    /// Returns the number of records removed.
    pub fn sweep_once(&self) -> usize {
        let started = Instant::now();
        let removed = self.store.sweep_expired(self.clock.now());
        let remaining = self.store.len();

        ThrottleMetrics::record_sweep(removed, remaining);

        if removed > 0 {
            tracing::info!(
                removed = removed,
                remaining = remaining,
                duration_us = started.elapsed().as_micros() as u64,
                "Swept expired throttle records"
            );
        } else {
            tracing::debug!(remaining = remaining, "Throttle sweep found nothing to evict");
        }

        removed
    }

    /// Spawn the periodic sweep on the current tokio runtime
    ///
    /// The task exits when `shutdown` flips to `true` or its sender is dropped.
    /// Other shutdown notifications do not delay the next sweep.
    pub fn spawn(self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            tracing::info!(
                "Starting throttle sweeper (interval={}s)",
                self.interval().as_secs()
            );

            // tokio rejects a zero period
            let mut ticker = interval(self.interval().max(Duration::from_millis(1)));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // first tick completes immediately
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.sweep_once();
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            tracing::info!("Throttle sweeper stopped");
                            break;
                        }
                    }
                }
            }
        })
    }
}
