//! Point-in-time copy of the pipeline counters.

use std::time::Duration;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetrySnapshot {
    pub uptime: Duration,
    pub batches_rendered: u64,
    pub frames_queued: u64,
    pub frames_consumed: u64,
    /// Frames the consumer received after their display time.
    pub frames_late: u64,
    pub objects_drawn: u64,
    pub objects_skipped: u64,
    pub propagation_failures: u64,
    pub lookahead_waits: u64,
    pub avg_render_ms: f64,
}

impl TelemetrySnapshot {
    /// Frames consumed per second of uptime.
    pub fn consumed_fps(&self) -> f64 {
        let secs = self.uptime.as_secs_f64();
        if secs > 0.0 {
            self.frames_consumed as f64 / secs
        } else {
            0.0
        }
    }

    /// One-line human readable summary.
    pub fn summary(&self) -> String {
        format!(
            "{} batches ({:.1} ms avg), {} frames queued, {} shown ({} late, {:.1} fps), {} propagation failures",
            self.batches_rendered,
            self.avg_render_ms,
            self.frames_queued,
            self.frames_consumed,
            self.frames_late,
            self.consumed_fps(),
            self.propagation_failures,
        )
    }
}
