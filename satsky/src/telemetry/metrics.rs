//! Atomic pipeline counters.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use super::snapshot::TelemetrySnapshot;
use crate::render::RenderStats;

/// Counters shared between the producer thread and the consumer.
#[derive(Debug)]
pub struct PipelineMetrics {
    start_time: Instant,
    batches_rendered: AtomicU64,
    frames_queued: AtomicU64,
    frames_consumed: AtomicU64,
    frames_late: AtomicU64,
    objects_drawn: AtomicU64,
    objects_skipped: AtomicU64,
    propagation_failures: AtomicU64,
    render_time_us: AtomicU64,
    lookahead_waits: AtomicU64,
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            batches_rendered: AtomicU64::new(0),
            frames_queued: AtomicU64::new(0),
            frames_consumed: AtomicU64::new(0),
            frames_late: AtomicU64::new(0),
            objects_drawn: AtomicU64::new(0),
            objects_skipped: AtomicU64::new(0),
            propagation_failures: AtomicU64::new(0),
            render_time_us: AtomicU64::new(0),
            lookahead_waits: AtomicU64::new(0),
        }
    }

    /// Records one rendered batch.
    pub fn batch_rendered(&self, stats: &RenderStats) {
        self.batches_rendered.fetch_add(1, Ordering::Relaxed);
        self.objects_drawn
            .fetch_add(stats.drawn as u64, Ordering::Relaxed);
        self.objects_skipped
            .fetch_add(stats.skipped as u64, Ordering::Relaxed);
        self.propagation_failures
            .fetch_add(stats.failures as u64, Ordering::Relaxed);
        self.render_time_us
            .fetch_add(stats.elapsed.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn frame_queued(&self) {
        self.frames_queued.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a frame taken by the consumer; `late` if its time had passed.
    pub fn frame_consumed(&self, late: bool) {
        self.frames_consumed.fetch_add(1, Ordering::Relaxed);
        if late {
            self.frames_late.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Records one poll interval spent waiting for the look-ahead window.
    pub fn lookahead_wait(&self) {
        self.lookahead_waits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        let batches_rendered = self.batches_rendered.load(Ordering::Relaxed);
        let render_time_us = self.render_time_us.load(Ordering::Relaxed);
        let avg_render_ms = if batches_rendered > 0 {
            render_time_us as f64 / batches_rendered as f64 / 1000.0
        } else {
            0.0
        };

        TelemetrySnapshot {
            uptime: self.start_time.elapsed(),
            batches_rendered,
            frames_queued: self.frames_queued.load(Ordering::Relaxed),
            frames_consumed: self.frames_consumed.load(Ordering::Relaxed),
            frames_late: self.frames_late.load(Ordering::Relaxed),
            objects_drawn: self.objects_drawn.load(Ordering::Relaxed),
            objects_skipped: self.objects_skipped.load(Ordering::Relaxed),
            propagation_failures: self.propagation_failures.load(Ordering::Relaxed),
            lookahead_waits: self.lookahead_waits.load(Ordering::Relaxed),
            avg_render_ms,
        }
    }
}
