//! Feed Distribution Metrics
//!
//! Prometheus metrics for feed composition. Throttle metrics are registered by
//! the `throttle` library (feature `metrics`) into the same default registry.

use once_cell::sync::Lazy;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

static FEED_COMPOSITIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "feed_compositions_total",
        "Total feed compositions by mode (full/organic_only/empty)",
        &["mode"]
    )
    .expect("Failed to register feed compositions metric")
});

static FEED_SPONSORED_PLACED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "feed_sponsored_placed_total",
        "Sponsored items considered for placement (placed/dropped)",
        &["outcome"]
    )
    .expect("Failed to register sponsored placement metric")
});

static FEED_ITEMS_REJECTED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "feed_items_rejected_total",
        "Items excluded from a feed because they failed validation",
        &["kind"]
    )
    .expect("Failed to register rejected items metric")
});

/// Record a composition by mode
pub fn record_composition(mode: &str) {
    FEED_COMPOSITIONS_TOTAL.with_label_values(&[mode]).inc();
}

/// Record placed vs dropped sponsored items for one composition
pub fn record_sponsored_placement(placed: usize, dropped: usize) {
    FEED_SPONSORED_PLACED_TOTAL
        .with_label_values(&["placed"])
        .inc_by(placed as u64);
    FEED_SPONSORED_PLACED_TOTAL
        .with_label_values(&["dropped"])
        .inc_by(dropped as u64);
}

/// Record an item rejected by validation (`organic` or `sponsored`)
pub fn record_rejected(kind: &str) {
    FEED_ITEMS_REJECTED_TOTAL.with_label_values(&[kind]).inc();
}

/// Render the default registry in Prometheus text format
pub fn render() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
