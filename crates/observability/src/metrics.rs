//! Relay metrics recording and aggregation.
//!
//! The `record_*` helpers publish to the `metrics` facade (exported via
//! Prometheus when enabled); `RelayStatsAggregator` keeps an in-memory
//! tally for the end-of-run summary.

use contracts::Timestamp;
use metrics::{counter, gauge, histogram};

/// Record a frame accepted into the pipeline
pub fn record_frame_ingested() {
    counter!("frame_relay_frames_ingested_total").increment(1);
}

/// Record a result delivered to the egress queue
///
/// `latency_ms` is capture-to-delivery latency.
pub fn record_frame_delivered(latency_ms: f64) {
    counter!("frame_relay_frames_delivered_total").increment(1);
    histogram!("frame_relay_delivery_latency_ms").record(latency_ms);
}

/// Record a frame dropped by a worker for exceeding the staleness budget
pub fn record_stale_drop(lateness_ms: f64) {
    counter!("frame_relay_frames_stale_dropped_total").increment(1);
    histogram!("frame_relay_stale_lateness_ms").record(lateness_ms);
}

/// Record a result rejected by the collector watermark
pub fn record_out_of_order_drop() {
    counter!("frame_relay_results_out_of_order_total").increment(1);
}

/// Record a queued result replaced by a fresher one before delivery
pub fn record_superseded_in_queue() {
    counter!("frame_relay_results_superseded_total").increment(1);
}

/// Record a per-frame transform failure
pub fn record_transform_failure(transform: &str) {
    counter!(
        "frame_relay_transform_failures_total",
        "transform" => transform.to_string()
    )
    .increment(1);
}

/// Record the current watermark for skew diagnostics
pub fn record_watermark(watermark: Timestamp) {
    gauge!("frame_relay_watermark_us").set(watermark.as_micros() as f64);
}

/// In-memory aggregation of relay counters for the run summary
#[derive(Debug, Clone, Default)]
pub struct RelayStatsAggregator {
    /// Frames accepted into the pipeline
    pub frames_ingested: u64,

    /// Results delivered to the egress queue
    pub frames_delivered: u64,

    /// Frames dropped for staleness at a worker
    pub stale_drops: u64,

    /// Results rejected by the watermark
    pub out_of_order_drops: u64,

    /// Queued results replaced before delivery
    pub superseded_in_queue: u64,

    /// Per-frame transform failures
    pub transform_failures: u64,

    /// Delivery latency statistics (ms)
    pub latency_ms: RunningStats,
}

impl RelayStatsAggregator {
    /// Create a new aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one delivered frame with its latency
    pub fn push_delivery(&mut self, latency_ms: f64) {
        self.frames_delivered += 1;
        self.latency_ms.push(latency_ms);
    }

    /// Generate a summary report
    pub fn summary(&self) -> RelaySummary {
        let total_drops = self.stale_drops + self.out_of_order_drops + self.transform_failures;
        RelaySummary {
            frames_ingested: self.frames_ingested,
            frames_delivered: self.frames_delivered,
            stale_drops: self.stale_drops,
            out_of_order_drops: self.out_of_order_drops,
            superseded_in_queue: self.superseded_in_queue,
            transform_failures: self.transform_failures,
            drop_rate: if self.frames_ingested > 0 {
                total_drops as f64 / self.frames_ingested as f64 * 100.0
            } else {
                0.0
            },
            latency_ms: StatsSummary::from(&self.latency_ms),
        }
    }

    /// Reset all tallies
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Summary of one pipeline run
#[derive(Debug, Clone, Default)]
pub struct RelaySummary {
    pub frames_ingested: u64,
    pub frames_delivered: u64,
    pub stale_drops: u64,
    pub out_of_order_drops: u64,
    pub superseded_in_queue: u64,
    pub transform_failures: u64,
    pub drop_rate: f64,
    pub latency_ms: StatsSummary,
}

impl std::fmt::Display for RelaySummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Relay Summary ===")?;
        writeln!(f, "Frames ingested: {}", self.frames_ingested)?;
        writeln!(f, "Frames delivered: {}", self.frames_delivered)?;
        writeln!(f, "Stale drops: {}", self.stale_drops)?;
        writeln!(f, "Out-of-order drops: {}", self.out_of_order_drops)?;
        writeln!(f, "Superseded in queue: {}", self.superseded_in_queue)?;
        writeln!(f, "Transform failures: {}", self.transform_failures)?;
        writeln!(f, "Drop rate: {:.2}%", self.drop_rate)?;
        writeln!(f, "Delivery latency (ms): {}", self.latency_ms)?;
        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics calculator (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Add a new value
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// Sample count
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Mean
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// Standard deviation
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Minimum value
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Maximum value
    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();

        stats.push(1.0);
        stats.push(2.0);
        stats.push(3.0);
        stats.push(4.0);
        stats.push(5.0);

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_summary() {
        let mut aggregator = RelayStatsAggregator::new();
        aggregator.frames_ingested = 10;
        aggregator.stale_drops = 2;
        aggregator.out_of_order_drops = 1;
        aggregator.push_delivery(12.5);
        aggregator.push_delivery(17.5);

        let summary = aggregator.summary();
        assert_eq!(summary.frames_delivered, 2);
        assert!((summary.drop_rate - 30.0).abs() < 1e-10);
        assert!((summary.latency_ms.mean - 15.0).abs() < 1e-10);
    }

    #[test]
    fn test_summary_display() {
        let mut aggregator = RelayStatsAggregator::new();
        aggregator.frames_ingested = 100;
        aggregator.stale_drops = 5;
        let output = format!("{}", aggregator.summary());
        assert!(output.contains("Frames ingested: 100"));
        assert!(output.contains("Stale drops: 5"));
        assert!(output.contains("N/A"));
    }
}
