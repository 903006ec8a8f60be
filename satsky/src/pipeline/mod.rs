//! Real-time frame production.
//!
//! A producer thread renders batches ahead of the wall clock and hands the
//! frames to the display consumer through a bounded queue.
//!
//! # Architecture
//!
//! ```text
//!            producer thread                              consumer
//! ┌──────────────────────────────────────┐        ┌───────────────────────┐
//! │ Scheduler                            │        │ pop_timeout           │
//! │  wait look-ahead window (poll exit)  │        │ FramePacer::wait_until│
//! │  PipelineSession::produce_batch      │──────► │ display / pick        │
//! │  push M frames (blocks when full)    │ Frame  │                       │
//! │  advance start by M × period         │ Queue  │                       │
//! └──────────────────────────────────────┘        └───────────────────────┘
//!                 ▲                                           │
//!                 └────────────── ExitFlag ◄──────────────────┘
//! ```
//!
//! The producer closes the queue whenever it stops, so the consumer sees
//! [`PopResult::Closed`] once everything already produced is drained.

mod control;
mod error;
mod pacer;
mod queue;
mod scheduler;
mod session;

pub use control::{Clock, ExitFlag, ManualClock, SystemClock};
pub use error::PipelineError;
pub use pacer::{FramePacer, Pace, DEFAULT_LATE_TOLERANCE};
pub use queue::{Frame, FrameQueue, PopResult, QueueError};
pub use scheduler::{
    ProducerHandle, Scheduler, SchedulerConfig, SchedulerState, DEFAULT_LOOKAHEAD_BATCHES,
    DEFAULT_POLL_INTERVAL, DEFAULT_START_DELAY,
};
pub use session::PipelineSession;
