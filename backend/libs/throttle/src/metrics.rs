/// Prometheus metrics for throttling
#[cfg(feature = "metrics")]
use prometheus::{register_int_counter, register_int_counter_vec, register_int_gauge, IntCounter, IntCounterVec, IntGauge};

#[cfg(feature = "metrics")]
use once_cell::sync::Lazy;

#[cfg(feature = "metrics")]
static THROTTLE_DECISIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "throttle_decisions_total",
        "Total throttle decisions by limiter and outcome",
        &["limiter", "outcome"]
    )
    .expect("Failed to register throttle decisions metric")
});

#[cfg(feature = "metrics")]
static THROTTLE_SWEEP_REMOVED: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "throttle_sweep_removed_total",
        "Total expired throttle records evicted by the sweeper"
    )
    .expect("Failed to register throttle sweep metric")
});

#[cfg(feature = "metrics")]
static THROTTLE_TRACKED_KEYS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "throttle_tracked_keys",
        "Number of keys held by the throttle store after the last sweep"
    )
    .expect("Failed to register throttle tracked keys metric")
});

/// Metrics collector for limiter decisions and store housekeeping
#[cfg(feature = "metrics")]
pub struct ThrottleMetrics;

#[cfg(feature = "metrics")]
impl ThrottleMetrics {
    /// `outcome` is one of `allowed`, `denied`, `unauthenticated`
    pub fn record_decision(limiter: &str, outcome: &str) {
        THROTTLE_DECISIONS
            .with_label_values(&[limiter, outcome])
            .inc();
    }

    pub fn record_sweep(removed: usize, remaining: usize) {
        THROTTLE_SWEEP_REMOVED.inc_by(removed as u64);
        THROTTLE_TRACKED_KEYS.set(remaining as i64);
    }
}

// No-op implementation when metrics feature is disabled
#[cfg(not(feature = "metrics"))]
pub struct ThrottleMetrics;

#[cfg(not(feature = "metrics"))]
impl ThrottleMetrics {
    pub fn record_decision(_limiter: &str, _outcome: &str) {}
    pub fn record_sweep(_removed: usize, _remaining: usize) {}
}
