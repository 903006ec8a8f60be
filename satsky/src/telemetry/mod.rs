//! Pipeline telemetry for observability and user feedback.
//!
//! Lock-free atomic counters updated by the producer and the consumer, read
//! as point-in-time snapshots.
//!
//! # Architecture
//!
//! ```text
//! Producer / Consumer ─────► PipelineMetrics ─────► TelemetrySnapshot ─────► CLI summary
//!                            (atomic counters)     (point-in-time copy)
//! ```
//!
//! # Example
//!
//! ```
//! use satsky::telemetry::PipelineMetrics;
//!
//! let metrics = PipelineMetrics::new();
//! metrics.frame_queued();
//! metrics.frame_consumed(false);
//!
//! let snapshot = metrics.snapshot();
//! assert_eq!(snapshot.frames_consumed, 1);
//! ```

mod metrics;
mod snapshot;

pub use metrics::PipelineMetrics;
pub use snapshot::TelemetrySnapshot;
