//! Integration tests for the frame pipeline.
//!
//! These tests drive the complete flow on a manual clock:
//! - element files → catalog → propagator dispatch
//! - batch rendering → bounded queue → consumer
//! - picking objects out of delivered frames
//!
//! Run with: `cargo test --test pipeline_integration`

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use tempfile::TempDir;

use satsky::catalog::{Catalog, CatalogLoader};
use satsky::elements::ElementRecord;
use satsky::pick::{ObjectTracker, PickQuery};
use satsky::pipeline::{
    Clock, ExitFlag, Frame, FrameQueue, ManualClock, PipelineSession, PopResult, Scheduler,
    SchedulerConfig,
};
use satsky::propagation::{PropagationError, Propagator, Sgp4Propagator};
use satsky::render::{IndexBuffer, Observer, RenderConfig};
use satsky::telemetry::PipelineMetrics;
use satsky::time::{JulianTime, TimeSystemConverter};

// ============================================================================
// Helper Functions
// ============================================================================

const ISS: &str = "1 25544U 98067A   25185.47485775  .00005492  00000+0  10282-3 0  9993\n\
                   2 25544  51.6344 221.3901 0002450 331.8120  28.2736 15.50368910517843\n";
const CSS: &str = "1 48274U 21035A   25185.52916667  .00022916  00000+0  26233-3 0  9997\n\
                   2 48274  41.4669 289.2546 0005585 317.1417  42.8934 15.60658307237216\n";

const IMAGE_SIZE: u32 = 64;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 7, 5, 12, 0, 0).unwrap()
}

fn catalog_dir(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, contents) in files {
        std::fs::write(dir.path().join(name), contents).unwrap();
    }
    dir
}

fn load(dir: &Path) -> Catalog {
    CatalogLoader::new(dir).load().unwrap()
}

fn render_config() -> RenderConfig {
    RenderConfig::default()
        .with_image_size(IMAGE_SIZE)
        .with_marker_radius(1)
}

fn converter(frames: usize) -> TimeSystemConverter {
    TimeSystemConverter::new(Duration::from_secs(1), frames, 0.0).unwrap()
}

/// Number of 4-connected regions holding `value`.
fn regions(index: &IndexBuffer, value: u32) -> usize {
    let size = index.size() as i64;
    let mut seen = vec![false; (size * size) as usize];
    let mut count = 0;

    for row in 0..size {
        for col in 0..size {
            let at = (row * size + col) as usize;
            if seen[at] || index.get(row, col) != Some(value) {
                continue;
            }
            count += 1;
            let mut stack = vec![(row, col)];
            seen[at] = true;
            while let Some((r, c)) = stack.pop() {
                for (nr, nc) in [(r - 1, c), (r + 1, c), (r, c - 1), (r, c + 1)] {
                    if index.get(nr, nc) != Some(value) {
                        continue;
                    }
                    let next = (nr * size + nc) as usize;
                    if !seen[next] {
                        seen[next] = true;
                        stack.push((nr, nc));
                    }
                }
            }
        }
    }
    count
}

fn drain(queue: &FrameQueue) -> Vec<Frame> {
    let mut frames = Vec::new();
    loop {
        match queue.pop_timeout(Duration::from_secs(5)) {
            PopResult::Frame(frame) => frames.push(*frame),
            PopResult::Closed => return frames,
            PopResult::Timeout => panic!("producer stalled"),
        }
    }
}

/// Holds every object a kilometre above the observer's Earth-fixed position.
struct ZenithPropagator {
    site: [f64; 3],
}

impl ZenithPropagator {
    fn new(observer: &Observer) -> Self {
        let site = observer.ecef_km();
        let scale = (site.norm() + 400.0) / site.norm();
        Self {
            site: [site.x * scale, site.y * scale, site.z * scale],
        }
    }
}

impl Propagator for ZenithPropagator {
    type State = [f64; 3];

    fn name(&self) -> &'static str {
        "zenith"
    }

    fn initialize(&self, _record: &ElementRecord) -> Result<[f64; 3], PropagationError> {
        Ok(self.site)
    }

    fn position(&self, state: &[f64; 3], time: &JulianTime) -> Result<[f64; 3], PropagationError> {
        let (sin_g, cos_g) = time.gmst().sin_cos();
        Ok([
            cos_g * state[0] - sin_g * state[1],
            sin_g * state[0] + cos_g * state[1],
            state[2],
        ])
    }
}

// ============================================================================
// Integration Tests
// ============================================================================

/// A single-frame batch of one object never splits it into several markers.
#[test]
fn test_single_object_renders_one_region() {
    let dir = catalog_dir(&[("iss.tle", ISS)]);
    let catalog = load(dir.path());
    let metrics = Arc::new(PipelineMetrics::new());

    let config = render_config();
    let zenith = ZenithPropagator::new(&config.observer);
    let mut session =
        PipelineSession::new(zenith, &catalog, converter(1), config, Arc::clone(&metrics))
            .unwrap();

    let frames = session.produce_batch(start()).unwrap();
    assert_eq!(frames.len(), 1);
    assert_eq!(regions(&frames[0].index, 1), 1);
    assert_eq!(frames[0].index.count(2), 0);

    // Real SGP4: the object may or may not be above the horizon
    let mut session = PipelineSession::new(
        Sgp4Propagator::new(),
        &catalog,
        converter(1),
        render_config(),
        metrics,
    )
    .unwrap();
    for hour in 0..6 {
        let frames = session
            .produce_batch(start() + chrono::Duration::hours(hour))
            .unwrap();
        assert!(regions(&frames[0].index, 1) <= 1);
    }
}

/// Frames arrive in timestamp order with no gaps across batch boundaries.
#[test]
fn test_queue_order_across_batches() {
    let dir = catalog_dir(&[("a-css.tle", CSS), ("b-iss.tle", ISS)]);
    let catalog = load(dir.path());
    assert_eq!(catalog.len(), 2);

    let metrics = Arc::new(PipelineMetrics::new());
    let session = PipelineSession::new(
        Sgp4Propagator::new(),
        &catalog,
        converter(3),
        render_config(),
        Arc::clone(&metrics),
    )
    .unwrap();

    let clock = Arc::new(ManualClock::new(start()));
    let queue = Arc::new(FrameQueue::new(4));
    let exit = ExitFlag::new();
    let config = SchedulerConfig::default()
        .with_lookahead_batches(2)
        .with_poll_interval(Duration::from_millis(100))
        .with_start_delay(Duration::ZERO);

    let mut scheduler = Scheduler::new(
        session,
        Arc::clone(&queue),
        Arc::clone(&clock),
        exit.clone(),
        config,
    )
    .unwrap();

    // Three batches fit the look-ahead window without the clock moving
    let mut produced = Vec::new();
    for _ in 0..3 {
        assert!(scheduler.step().unwrap());
        while let Some(frame) = queue.try_pop() {
            produced.push(frame);
        }
    }
    assert_eq!(clock.sleeps(), 0);
    assert_eq!(produced.len(), 9);

    for (i, frame) in produced.iter().enumerate() {
        assert_eq!(frame.timestamp, start() + chrono::Duration::seconds(i as i64));
        assert!(frame.index.data().iter().all(|&value| value <= 2));
        assert_eq!(frame.objects.len(), 2);
    }
    assert_eq!(metrics.snapshot().batches_rendered, 3);
    assert_eq!(metrics.snapshot().frames_queued, 9);
}

/// A spawned producer feeds a consumer until exit, then closes the queue.
#[test]
fn test_producer_consumer_shutdown() {
    let dir = catalog_dir(&[("iss.tle", ISS)]);
    let catalog = load(dir.path());

    let config = render_config();
    let zenith = ZenithPropagator::new(&config.observer);
    let session = PipelineSession::new(
        zenith,
        &catalog,
        converter(5),
        config,
        Arc::new(PipelineMetrics::new()),
    )
    .unwrap();

    let clock = Arc::new(ManualClock::new(start()));
    let queue = Arc::new(FrameQueue::new(3));
    let exit = ExitFlag::new();
    let handle = Scheduler::new(
        session,
        Arc::clone(&queue),
        Arc::clone(&clock),
        exit.clone(),
        SchedulerConfig::default().with_poll_interval(Duration::from_millis(50)),
    )
    .unwrap()
    .spawn()
    .unwrap();

    let mut consumed = Vec::new();
    while consumed.len() < 12 {
        match queue.pop_timeout(Duration::from_secs(5)) {
            PopResult::Frame(frame) => consumed.push(*frame),
            other => panic!("unexpected {:?}", other),
        }
    }
    exit.request();
    consumed.extend(drain(&queue));
    handle.join().unwrap();

    assert!(queue.is_closed());
    let first = consumed[0].timestamp;
    assert_eq!(first, start() + chrono::Duration::seconds(10));
    for pair in consumed.windows(2) {
        assert_eq!(pair[1].timestamp - pair[0].timestamp, chrono::Duration::seconds(1));
    }
    assert!(clock.now() >= start());
}

/// Clicking near a marker finds the object and tracking follows it.
#[test]
fn test_pick_and_track_delivered_frames() {
    let dir = catalog_dir(&[("iss.tle", ISS)]);
    let catalog = load(dir.path());

    let config = render_config();
    let zenith = ZenithPropagator::new(&config.observer);
    let mut session = PipelineSession::new(
        zenith,
        &catalog,
        converter(4),
        config,
        Arc::new(PipelineMetrics::new()),
    )
    .unwrap();
    let frames = session.produce_batch(start()).unwrap();

    let centre = i64::from(IMAGE_SIZE / 2);
    let result = PickQuery::click(centre + 4, centre - 3).resolve(&frames[0].index, 10);
    assert!(result.found);
    let object = frames[0].object_at(result.row, result.col).unwrap();
    assert_eq!(object.catalog_id, "25544");

    let miss = PickQuery::click(0, 0).resolve(&frames[0].index, 3);
    assert!(!miss.found);

    let mut tracker = ObjectTracker::new(10);
    let track = tracker
        .select(&frames[0].index, centre + 4, centre - 3)
        .unwrap();
    assert_eq!(track.value, 1);
    for frame in &frames[1..] {
        assert_eq!(tracker.update(&frame.index).map(|t| t.value), Some(1));
    }
}
