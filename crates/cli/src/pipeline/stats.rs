//! Pipeline statistics and metrics.

use std::time::Duration;

use observability::{RelayStatsAggregator, RelaySummary};

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Frames accepted from the client into the pipeline
    pub frames_ingested: u64,

    /// Results delivered to the egress queue
    pub frames_delivered: u64,

    /// Frames dropped at a worker for exceeding the staleness budget
    pub stale_drops: u64,

    /// Results rejected by the collector watermark
    pub out_of_order_drops: u64,

    /// Queued results replaced by a fresher one before the client read them
    pub superseded_in_queue: u64,

    /// Per-frame transform failures
    pub transform_failures: u64,

    /// Frames dropped because a fabric channel was full
    pub fabric_rejections: u64,

    /// Client frames refused by a full ingress slot
    pub ingress_rejections: u64,

    /// Inbound client messages
    pub inbound_frames: u64,

    /// Outbound result messages
    pub outbound_frames: u64,

    /// Sessions accepted over the run
    pub sessions_opened: u64,

    /// Connections refused while a session was active
    pub sessions_refused: u64,

    /// Worker pool size
    pub worker_count: usize,

    /// Total duration of the pipeline run
    pub duration: Duration,
}

impl PipelineStats {
    /// Delivered frames per second
    pub fn fps(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.frames_delivered as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Share of ingested frames that never reached the client, in percent
    pub fn drop_rate(&self) -> f64 {
        if self.frames_ingested > 0 {
            let dropped = self.frames_ingested.saturating_sub(self.frames_delivered);
            (dropped as f64 / self.frames_ingested as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Aggregate the counters into a relay summary
    pub fn relay_summary(&self) -> RelaySummary {
        let mut aggregator = RelayStatsAggregator::new();
        aggregator.frames_ingested = self.frames_ingested;
        aggregator.frames_delivered = self.frames_delivered;
        aggregator.stale_drops = self.stale_drops;
        aggregator.out_of_order_drops = self.out_of_order_drops;
        aggregator.superseded_in_queue = self.superseded_in_queue;
        aggregator.transform_failures = self.transform_failures;
        aggregator.summary()
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Pipeline Statistics ===\n");
        println!("Duration: {:.2}s", self.duration.as_secs_f64());
        println!("Workers: {}", self.worker_count);
        println!("Sessions: {} opened, {} refused", self.sessions_opened, self.sessions_refused);
        println!(
            "Client traffic: {} in / {} out",
            self.inbound_frames, self.outbound_frames
        );
        println!("Delivered FPS: {:.2}", self.fps());
        println!("End-to-end drop rate: {:.2}%", self.drop_rate());
        println!(
            "Queue rejections: {} ingress, {} fabric",
            self.ingress_rejections, self.fabric_rejections
        );
        println!();
        print!("{}", self.relay_summary());
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fps_and_drop_rate() {
        let stats = PipelineStats {
            frames_ingested: 100,
            frames_delivered: 80,
            duration: Duration::from_secs(4),
            ..Default::default()
        };
        assert!((stats.fps() - 20.0).abs() < 1e-10);
        assert!((stats.drop_rate() - 20.0).abs() < 1e-10);
    }

    #[test]
    fn test_zero_duration_fps() {
        let stats = PipelineStats::default();
        assert_eq!(stats.fps(), 0.0);
        assert_eq!(stats.drop_rate(), 0.0);
    }

    #[test]
    fn test_relay_summary_carries_counters() {
        let stats = PipelineStats {
            frames_ingested: 10,
            stale_drops: 3,
            ..Default::default()
        };
        let summary = stats.relay_summary();
        assert_eq!(summary.stale_drops, 3);
        assert!((summary.drop_rate - 30.0).abs() < 1e-10);
    }
}
