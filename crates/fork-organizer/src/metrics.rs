//! # Organizer Metrics
//!
//! Prometheus metrics for monitoring block admission.
//!
//! Enable with the `metrics` feature:
//! ```toml
//! fork-organizer = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `organizer_blocks_organized_total` - Counter of accepted reorganizations
//! - `organizer_blocks_rejected_total` - Counter of rejected submissions (by reason)
//! - `organizer_reorg_depth` - Histogram of displaced-block counts per swap
//! - `organizer_organize_latency_seconds` - Histogram of submission times

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_counter_vec, register_histogram, register_int_counter, CounterVec, Histogram,
    IntCounter,
};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Total successful reorganizations
    pub static ref BLOCKS_ORGANIZED: IntCounter = register_int_counter!(
        "organizer_blocks_organized_total",
        "Total number of submissions that reorganized the chain"
    )
    .expect("Failed to create BLOCKS_ORGANIZED metric");

    /// Total rejected submissions, labeled by rejection reason
    pub static ref BLOCKS_REJECTED: CounterVec = register_counter_vec!(
        "organizer_blocks_rejected_total",
        "Total number of rejected block submissions",
        &["reason"]
    )
    .expect("Failed to create BLOCKS_REJECTED metric");

    /// Histogram of reorganization depth (displaced blocks per swap)
    pub static ref REORG_DEPTH: Histogram = register_histogram!(
        "organizer_reorg_depth",
        "Number of confirmed blocks displaced per reorganization",
        vec![0.0, 1.0, 2.0, 3.0, 5.0, 10.0, 25.0, 50.0, 100.0]
    )
    .expect("Failed to create REORG_DEPTH metric");

    /// Histogram of submission latency
    pub static ref ORGANIZE_LATENCY: Histogram = register_histogram!(
        "organizer_organize_latency_seconds",
        "Time taken to complete a block submission in seconds",
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    )
    .expect("Failed to create ORGANIZE_LATENCY metric");
}

/// Record a successful reorganization
#[cfg(feature = "metrics")]
pub fn record_block_organized() {
    BLOCKS_ORGANIZED.inc();
}

/// Record a rejected submission with reason
#[cfg(feature = "metrics")]
pub fn record_block_rejected(reason: &str) {
    BLOCKS_REJECTED.with_label_values(&[reason]).inc();
}

/// Record the depth of a reorganization
#[cfg(feature = "metrics")]
pub fn record_reorg_depth(displaced: usize) {
    REORG_DEPTH.observe(displaced as f64);
}

/// Record submission latency
#[cfg(feature = "metrics")]
pub fn record_organize_latency(seconds: f64) {
    ORGANIZE_LATENCY.observe(seconds);
}

// No-op implementations when metrics feature is disabled
#[cfg(not(feature = "metrics"))]
pub fn record_block_organized() {}

#[cfg(not(feature = "metrics"))]
pub fn record_block_rejected(_reason: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_reorg_depth(_displaced: usize) {}

#[cfg(not(feature = "metrics"))]
pub fn record_organize_latency(_seconds: f64) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_noop_when_disabled() {
        // These should compile and run without panic even without metrics feature
        record_block_organized();
        record_block_rejected("test");
        record_reorg_depth(3);
        record_organize_latency(0.5);
    }
}
