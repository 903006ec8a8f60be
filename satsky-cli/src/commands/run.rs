//! Run command - produce frames ahead of real time and consume them at
//! their timestamps.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use satsky::pick::ObjectTracker;
use satsky::pipeline::{
    ExitFlag, Frame, FramePacer, FrameQueue, Pace, PipelineSession, PopResult, Scheduler,
    SystemClock,
};
use satsky::propagation::Sgp4Propagator;
use satsky::telemetry::PipelineMetrics;
use tracing::{debug, info};

use crate::error::CliError;
use crate::runner::CliRunner;

/// How often the consumer prints a telemetry line.
const TELEMETRY_INTERVAL: Duration = Duration::from_secs(30);

/// Arguments for the run command.
pub struct RunArgs {
    pub tle_dir: Option<PathBuf>,
    pub start: Option<DateTime<Utc>>,
    /// Sky time to show before exiting.
    pub duration: Option<Duration>,
    pub output: Option<PathBuf>,
    pub save_every: usize,
    pub pick: Option<(i64, i64)>,
    pub pick_radius: u32,
}

/// Parses a `ROW,COL` pixel argument.
pub fn parse_pixel(value: &str) -> Result<(i64, i64), String> {
    let (row, col) = value
        .split_once(',')
        .ok_or_else(|| format!("expected ROW,COL, got '{}'", value))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<i64>()
            .map_err(|e| format!("invalid pixel coordinate '{}': {}", part, e))
    };
    Ok((parse(row)?, parse(col)?))
}

/// Run the run command.
pub fn run(mut runner: CliRunner, args: RunArgs) -> Result<(), CliError> {
    runner.log_startup("run");
    if let Some(dir) = &args.tle_dir {
        runner.config_mut().catalog.tle_dir = dir.clone();
    }
    let config = runner.config().clone();

    let catalog = runner.load_catalog()?;
    if catalog.is_empty() {
        return Err(CliError::Config(format!(
            "No element files found in {}",
            config.catalog.tle_dir.display()
        )));
    }

    let metrics = Arc::new(PipelineMetrics::new());
    let session = PipelineSession::new(
        Sgp4Propagator::new(),
        &catalog,
        config.time_converter()?,
        config.render_config(),
        Arc::clone(&metrics),
    )?;

    let queue = Arc::new(FrameQueue::new(config.pipeline.queue_capacity));
    let clock = Arc::new(SystemClock);
    let exit = ExitFlag::new();
    let mut scheduler = Scheduler::new(
        session,
        Arc::clone(&queue),
        Arc::clone(&clock),
        exit.clone(),
        config.scheduler_config(),
    )?;
    if let Some(start) = args.start {
        scheduler = scheduler.with_start(start);
    }

    println!("SatSky v{}", satsky::VERSION);
    println!("===========");
    println!();
    println!("Objects:     {}", catalog.len());
    println!(
        "Observer:    {:.4}°, {:.4}°, {:.0} m",
        config.observer.latitude_deg, config.observer.longitude_deg, config.observer.altitude_m
    );
    println!(
        "Frames:      {} px, {} per batch every {:.3} s",
        config.render.image_size,
        config.timing.frames_per_batch,
        config.timing.frame_period_secs
    );
    println!("First frame: {}", scheduler.next_start());
    if let Some(dir) = &args.output {
        println!("Output:      {}", dir.display());
    }
    println!();
    println!("Press Ctrl+C to exit");
    println!();

    let handler_exit = exit.clone();
    ctrlc::set_handler(move || {
        handler_exit.request();
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    let frame_limit = args
        .duration
        .map(|d| frames_for(d, config.frame_period()));
    let mut sink = FrameSink::new(&args)?;
    let pacer = FramePacer::new(clock, exit.clone(), config.poll_interval());
    let producer = scheduler.spawn()?;

    let consumed = consume(
        &queue,
        &pacer,
        &exit,
        &metrics,
        &mut sink,
        frame_limit,
        config.poll_interval(),
    );

    exit.request();
    let produced = producer.join();

    let snapshot = metrics.snapshot();
    println!();
    println!("Session Summary");
    println!("───────────────");
    println!("  {}", snapshot.summary());
    println!(
        "  Objects drawn: {}, skipped: {}",
        snapshot.objects_drawn, snapshot.objects_skipped
    );
    if sink.saved > 0 {
        println!("  Frames written: {}", sink.saved);
    }
    debug!(snapshot = %serde_json::to_string(&snapshot)?, "Final telemetry");

    consumed?;
    produced?;
    Ok(())
}

/// Number of frames covering `duration`, at least one.
fn frames_for(duration: Duration, period: Duration) -> u64 {
    let frames = (duration.as_secs_f64() / period.as_secs_f64()).ceil();
    (frames as u64).max(1)
}

fn consume(
    queue: &FrameQueue,
    pacer: &FramePacer<SystemClock>,
    exit: &ExitFlag,
    metrics: &PipelineMetrics,
    sink: &mut FrameSink,
    frame_limit: Option<u64>,
    poll_interval: Duration,
) -> Result<(), CliError> {
    let mut shown: u64 = 0;
    let mut last_telemetry = Instant::now();

    while !exit.is_requested() {
        if frame_limit.is_some_and(|limit| shown >= limit) {
            info!(frames = shown, "Requested duration shown");
            break;
        }

        let frame = match queue.pop_timeout(poll_interval) {
            PopResult::Frame(frame) => frame,
            PopResult::Timeout => continue,
            PopResult::Closed => {
                debug!("Frame queue closed");
                break;
            }
        };

        match pacer.wait_until(frame.timestamp) {
            Pace::Exit => break,
            Pace::Show { late } => {
                metrics.frame_consumed(late);
                sink.show(&frame)?;
                shown += 1;
            }
        }

        if last_telemetry.elapsed() >= TELEMETRY_INTERVAL {
            println!("[{}] {}", frame.timestamp.format("%H:%M:%S"), metrics.snapshot().summary());
            last_telemetry = Instant::now();
        }
    }
    Ok(())
}

/// Headless display: writes frames to disk and follows a picked object.
struct FrameSink {
    output: Option<PathBuf>,
    save_every: usize,
    pending_pick: Option<(i64, i64)>,
    tracker: ObjectTracker,
    shown: usize,
    saved: usize,
}

impl FrameSink {
    fn new(args: &RunArgs) -> Result<Self, CliError> {
        if let Some(dir) = &args.output {
            std::fs::create_dir_all(dir)?;
        }
        Ok(Self {
            output: args.output.clone(),
            save_every: args.save_every.max(1),
            pending_pick: args.pick,
            tracker: ObjectTracker::new(args.pick_radius),
            shown: 0,
            saved: 0,
        })
    }

    fn show(&mut self, frame: &Frame) -> Result<(), CliError> {
        self.follow(frame);

        if let Some(dir) = &self.output {
            if self.shown % self.save_every == 0 {
                let name = format!("frame-{}.png", frame.timestamp.format("%Y%m%dT%H%M%S%.3fZ"));
                frame.image.save(dir.join(name))?;
                self.saved += 1;
            }
        }
        self.shown += 1;
        Ok(())
    }

    fn follow(&mut self, frame: &Frame) {
        if let Some((row, col)) = self.pending_pick.take() {
            match self.tracker.select(&frame.index, row, col) {
                Some(track) => {
                    let name = frame
                        .objects
                        .by_pixel_value(track.value)
                        .map(|object| object.name.as_str())
                        .unwrap_or("?");
                    info!(
                        object = name,
                        row = track.row,
                        col = track.col,
                        time = %frame.timestamp,
                        "Tracking object"
                    );
                }
                None => info!(row, col, "Nothing near pick position"),
            }
            return;
        }

        if self.tracker.current().is_none() {
            return;
        }
        match self.tracker.update(&frame.index) {
            Some(track) => debug!(row = track.row, col = track.col, "Track"),
            None => info!(time = %frame.timestamp, "Lost tracked object"),
        }
    }
}
