//! Real-time paced batch production.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use chrono::{DateTime, SubsecRound, Utc};
use tracing::{debug, error, info};

use super::control::{Clock, ExitFlag};
use super::error::PipelineError;
use super::queue::FrameQueue;
use super::session::PipelineSession;
use crate::propagation::Propagator;

/// Default number of batches the producer may run ahead of real time.
pub const DEFAULT_LOOKAHEAD_BATCHES: u32 = 3;

/// Default granularity of every suspend point.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Default delay between startup and the first frame.
pub const DEFAULT_START_DELAY: Duration = Duration::from_secs(10);

/// Pacing settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub lookahead_batches: u32,
    pub poll_interval: Duration,
    /// Added to the current time (truncated to the second) for the first
    /// batch start.
    pub start_delay: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            lookahead_batches: DEFAULT_LOOKAHEAD_BATCHES,
            poll_interval: DEFAULT_POLL_INTERVAL,
            start_delay: DEFAULT_START_DELAY,
        }
    }
}

impl SchedulerConfig {
    pub fn with_lookahead_batches(mut self, batches: u32) -> Self {
        self.lookahead_batches = batches;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_start_delay(mut self, delay: Duration) -> Self {
        self.start_delay = delay;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Producing,
    Stopped,
}

/// Drives a [`PipelineSession`] batch by batch, never more than
/// `lookahead_batches` batch durations ahead of the clock.
///
/// ```text
/// ┌──────────────┐  exit   ┌─────────┐
/// │  Producing   │────────►│ Stopped │
/// └──────────────┘         └─────────┘
///   wait window → compute → render → push M frames → advance
/// ```
pub struct Scheduler<P: Propagator, C: Clock> {
    session: PipelineSession<P>,
    queue: Arc<FrameQueue>,
    clock: Arc<C>,
    exit: ExitFlag,
    config: SchedulerConfig,
    batch_span: chrono::Duration,
    horizon: chrono::Duration,
    next_start: DateTime<Utc>,
    state: SchedulerState,
}

impl<P: Propagator, C: Clock> Scheduler<P, C> {
    /// Creates a scheduler whose first batch starts at the clock's current
    /// second plus the configured start delay.
    pub fn new(
        session: PipelineSession<P>,
        queue: Arc<FrameQueue>,
        clock: Arc<C>,
        exit: ExitFlag,
        config: SchedulerConfig,
    ) -> Result<Self, PipelineError> {
        let invalid = |what: &str| PipelineError::InvalidConfig(what.to_string());

        if config.poll_interval.is_zero() {
            return Err(invalid("poll interval must be positive"));
        }
        let batch_span = chrono::Duration::from_std(session.converter().batch_duration())
            .map_err(|_| invalid("batch duration out of range"))?;
        let start_delay = chrono::Duration::from_std(config.start_delay)
            .map_err(|_| invalid("start delay out of range"))?;
        let horizon = i32::try_from(config.lookahead_batches)
            .ok()
            .and_then(|batches| batch_span.checked_mul(batches))
            .ok_or_else(|| invalid("look-ahead window out of range"))?;

        let next_start = clock.now().trunc_subsecs(0) + start_delay;
        Ok(Self {
            session,
            queue,
            clock,
            exit,
            config,
            batch_span,
            horizon,
            next_start,
            state: SchedulerState::Producing,
        })
    }

    /// Overrides the first batch start.
    pub fn with_start(mut self, start: DateTime<Utc>) -> Self {
        self.next_start = start;
        self
    }

    pub fn next_start(&self) -> DateTime<Utc> {
        self.next_start
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Sleeps until the next batch start is inside the look-ahead window.
    ///
    /// Returns `false` if exit was requested first.
    fn wait_for_window(&self) -> bool {
        loop {
            if self.exit.is_requested() {
                return false;
            }
            if self.next_start - self.clock.now() <= self.horizon {
                return true;
            }
            self.session.metrics().lookahead_wait();
            self.clock.sleep(self.config.poll_interval);
        }
    }

    /// Runs one iteration of the production loop.
    ///
    /// Returns `Ok(false)` once the scheduler has stopped.
    pub fn step(&mut self) -> Result<bool, PipelineError> {
        if self.state == SchedulerState::Stopped {
            return Ok(false);
        }
        if !self.wait_for_window() {
            debug!("Exit requested, not starting another batch");
            self.state = SchedulerState::Stopped;
            return Ok(false);
        }

        let frames = self.session.produce_batch(self.next_start)?;
        for frame in frames {
            if let Err(e) = self
                .queue
                .push(frame, &self.exit, self.config.poll_interval)
            {
                debug!(reason = %e, "Frame queue no longer accepting frames");
                self.state = SchedulerState::Stopped;
                return Ok(false);
            }
            self.session.metrics().frame_queued();
        }

        debug!(start = %self.next_start, queued = self.queue.len(), "Batch queued");
        self.next_start += self.batch_span;
        Ok(true)
    }

    /// Produces batches until exit, queue closure or an error, then closes
    /// the queue.
    pub fn run(mut self) -> Result<(), PipelineError> {
        info!(start = %self.next_start, "Producer started");
        let result = loop {
            match self.step() {
                Ok(true) => continue,
                Ok(false) => break Ok(()),
                Err(e) => break Err(e),
            }
        };

        self.state = SchedulerState::Stopped;
        self.queue.close();
        match &result {
            Ok(()) => info!("Producer stopped"),
            Err(e) => error!(error = %e, "Producer failed"),
        }
        result
    }
}

impl<P, C> Scheduler<P, C>
where
    P: Propagator + 'static,
    P::State: 'static,
    C: Clock + 'static,
{
    /// Runs the scheduler on a dedicated, named producer thread.
    pub fn spawn(self) -> Result<ProducerHandle, PipelineError> {
        let handle = std::thread::Builder::new()
            .name("satsky-producer".to_string())
            .spawn(move || self.run())
            .map_err(PipelineError::Spawn)?;
        Ok(ProducerHandle { handle })
    }
}

/// Join handle of a spawned producer.
#[derive(Debug)]
pub struct ProducerHandle {
    handle: JoinHandle<Result<(), PipelineError>>,
}

impl ProducerHandle {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the producer and returns its result.
    pub fn join(self) -> Result<(), PipelineError> {
        self.handle
            .join()
            .map_err(|_| PipelineError::ProducerPanicked)?
    }
}
