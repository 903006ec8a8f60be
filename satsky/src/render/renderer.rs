//! Parallel batch renderer.

use std::time::{Duration, Instant};

use image::{Rgba, RgbaImage};
use rayon::prelude::*;
use tracing::debug;

use super::buffers::{paint_marker, FrameBuffers, IndexBuffer};
use super::error::RenderError;
use super::observer::{Observer, ObserverFrame};
use super::palette::{regime_color, UNKNOWN_COLOR};
use super::projection::{Pixel, SkyProjection};
use crate::catalog::ObjectTable;
use crate::propagation::{Propagator, StateArena};
use crate::time::{JulianTime, TimeBatch};

/// Default image width and height in pixels.
pub const DEFAULT_IMAGE_SIZE: u32 = 1024;

/// Default marker radius in pixels.
pub const DEFAULT_MARKER_RADIUS: u32 = 2;

const MAX_IMAGE_SIZE: u32 = 16_384;
const MAX_MARKER_RADIUS: u32 = 64;

/// Renderer settings.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Width and height of every frame.
    pub image_size: u32,
    /// Marker disc radius; 0 paints a single pixel.
    pub marker_radius: u32,
    /// Elevation mapped to the edge of the sky disc.
    pub min_elevation_deg: f64,
    pub observer: Observer,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            image_size: DEFAULT_IMAGE_SIZE,
            marker_radius: DEFAULT_MARKER_RADIUS,
            min_elevation_deg: 0.0,
            observer: Observer::default(),
        }
    }
}

impl RenderConfig {
    pub fn with_image_size(mut self, size: u32) -> Self {
        self.image_size = size;
        self
    }

    pub fn with_marker_radius(mut self, radius: u32) -> Self {
        self.marker_radius = radius;
        self
    }

    pub fn with_min_elevation(mut self, degrees: f64) -> Self {
        self.min_elevation_deg = degrees;
        self
    }

    pub fn with_observer(mut self, observer: Observer) -> Self {
        self.observer = observer;
        self
    }

    pub fn validate(&self) -> Result<(), RenderError> {
        if self.image_size == 0 || self.image_size > MAX_IMAGE_SIZE {
            return Err(RenderError::InvalidConfig(format!(
                "image size {} outside 1..={}",
                self.image_size, MAX_IMAGE_SIZE
            )));
        }
        if self.marker_radius > MAX_MARKER_RADIUS {
            return Err(RenderError::InvalidConfig(format!(
                "marker radius {} above {}",
                self.marker_radius, MAX_MARKER_RADIUS
            )));
        }
        if !(-90.0..90.0).contains(&self.min_elevation_deg) {
            return Err(RenderError::InvalidConfig(format!(
                "minimum elevation {} outside [-90, 90)",
                self.min_elevation_deg
            )));
        }
        let site = &self.observer;
        if !(-90.0..=90.0).contains(&site.latitude_deg)
            || !(-180.0..=180.0).contains(&site.longitude_deg)
            || !site.altitude_m.is_finite()
        {
            return Err(RenderError::InvalidConfig(format!(
                "observer position {:?} out of range",
                site
            )));
        }
        Ok(())
    }
}

/// Counters for one rendered batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub frames: usize,
    pub objects: usize,
    /// Objects painted in at least one frame.
    pub drawn: usize,
    /// Objects hidden at both boundary frames and therefore not traced.
    pub skipped: usize,
    /// Samples whose propagation failed.
    pub failures: usize,
    pub elapsed: Duration,
}

/// Projected pixel of one object in every frame of a batch.
struct Track {
    pixels: Vec<Option<Pixel>>,
    failures: usize,
    skipped: bool,
}

/// Per-batch inputs shared by every object worker.
struct Tracer<'a> {
    projection: &'a SkyProjection,
    site: &'a ObserverFrame,
    /// Each frame's time with its precomputed sidereal angle.
    times: &'a [(JulianTime, f64)],
}

impl Tracer<'_> {
    /// Propagates and projects one object.
    ///
    /// Only the first and last frames are tried at first. An object visible
    /// at neither is assumed absent for the whole batch, so a fast pass
    /// entirely inside a long batch can be missed.
    fn trace<P: Propagator>(&self, propagator: &P, state: &P::State) -> Track {
        let frames = self.times.len();
        let mut failures = 0;
        let mut locate = |frame: usize| {
            let (time, gmst) = &self.times[frame];
            match propagator.position(state, time) {
                Ok(teme) => self
                    .projection
                    .project(&self.site.look_angles(&teme, *gmst)),
                Err(_) => {
                    failures += 1;
                    None
                }
            }
        };

        let first = locate(0);
        let last = if frames > 1 { locate(frames - 1) } else { first };
        if first.is_none() && last.is_none() {
            return Track {
                pixels: Vec::new(),
                failures,
                skipped: true,
            };
        }

        let mut pixels = Vec::with_capacity(frames);
        pixels.push(first);
        pixels.extend((1..frames.saturating_sub(1)).map(&mut locate));
        if frames > 1 {
            pixels.push(last);
        }
        Track {
            pixels,
            failures,
            skipped: false,
        }
    }
}

/// Renders batches of frames into buffers it owns and reuses.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use satsky::catalog::Catalog;
/// use satsky::propagation::{dispatch_states, Sgp4Propagator};
/// use satsky::render::{ProjectionRenderer, RenderConfig};
/// use satsky::time::TimeSystemConverter;
///
/// let catalog = Catalog::from_records(Vec::new());
/// let propagator = Sgp4Propagator::new();
/// let arena = dispatch_states(&propagator, catalog.records()).unwrap();
///
/// let converter = TimeSystemConverter::new(Duration::from_secs(1), 2, 0.0).unwrap();
/// let batch = converter.compute_at(chrono::Utc::now()).unwrap();
///
/// let mut renderer = ProjectionRenderer::new(RenderConfig::default().with_image_size(64)).unwrap();
/// let stats = renderer.render(&propagator, &arena, catalog.objects(), &batch);
/// assert_eq!(stats.frames, 2);
/// assert_eq!(renderer.indices()[0].count(0), 64 * 64);
/// ```
#[derive(Debug)]
pub struct ProjectionRenderer {
    config: RenderConfig,
    projection: SkyProjection,
    site: ObserverFrame,
    buffers: FrameBuffers,
}

impl ProjectionRenderer {
    pub fn new(config: RenderConfig) -> Result<Self, RenderError> {
        config.validate()?;
        Ok(Self {
            projection: SkyProjection::new(config.image_size, config.min_elevation_deg),
            site: ObserverFrame::new(&config.observer),
            buffers: FrameBuffers::new(config.image_size),
            config,
        })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Images of the last rendered batch, in frame order.
    pub fn images(&self) -> &[RgbaImage] {
        &self.buffers.images
    }

    /// Index buffers of the last rendered batch, in frame order.
    pub fn indices(&self) -> &[IndexBuffer] {
        &self.buffers.indices
    }

    /// Renders every frame of `batch`, replacing the previous batch.
    ///
    /// Objects are traced in parallel; frames are then painted in parallel
    /// in ascending object order, so where markers overlap the higher object
    /// index wins. Propagation failures hide the affected samples and are
    /// counted in the returned stats.
    pub fn render<P: Propagator>(
        &mut self,
        propagator: &P,
        arena: &StateArena<P::State>,
        objects: &ObjectTable,
        batch: &TimeBatch,
    ) -> RenderStats {
        let started = Instant::now();
        let frames = batch.len();
        self.buffers.prepare(frames);

        let times: Vec<(JulianTime, f64)> = batch
            .samples()
            .iter()
            .map(|sample| (sample.julian, sample.julian.gmst()))
            .collect();
        let tracer = Tracer {
            projection: &self.projection,
            site: &self.site,
            times: &times,
        };
        let tracks: Vec<Track> = arena
            .states()
            .par_iter()
            .map(|state| tracer.trace(propagator, state))
            .collect();

        let mut stats = RenderStats {
            frames,
            objects: arena.len(),
            ..RenderStats::default()
        };
        let mut marks: Vec<Vec<(Pixel, u32, Rgba<u8>)>> = vec![Vec::new(); frames];
        for (index, track) in tracks.iter().enumerate() {
            stats.failures += track.failures;
            if track.skipped {
                stats.skipped += 1;
                continue;
            }

            let color = objects
                .get(index)
                .map(|descriptor| regime_color(descriptor.regime))
                .unwrap_or(UNKNOWN_COLOR);
            let value = index as u32 + 1;
            let mut drawn = false;
            for (frame, pixel) in track.pixels.iter().enumerate() {
                if let Some(pixel) = pixel {
                    marks[frame].push((*pixel, value, color));
                    drawn = true;
                }
            }
            if drawn {
                stats.drawn += 1;
            }
        }

        let radius = self.config.marker_radius;
        self.buffers
            .images
            .par_iter_mut()
            .zip(self.buffers.indices.par_iter_mut())
            .zip(marks.par_iter())
            .for_each(|((image, index), marks)| {
                for &(pixel, value, color) in marks {
                    paint_marker(image, index, pixel, radius, color, value);
                }
            });

        stats.elapsed = started.elapsed();
        debug!(
            frames,
            objects = stats.objects,
            drawn = stats.drawn,
            skipped = stats.skipped,
            failures = stats.failures,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "Rendered batch"
        );
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::elements::{parse_element_set, ElementRecord};
    use crate::propagation::{dispatch_states, PropagationError, REFERENCE_LINE1, REFERENCE_LINE2};
    use crate::render::WGS84_A_KM;
    use crate::time::{CalendarInstant, TimeSystemConverter};

    const SIZE: u32 = 64;
    const CENTRE: i64 = SIZE as i64 / 2;

    /// Test state: an Earth-fixed position, optionally visible only inside a
    /// window of frame numbers.
    #[derive(Clone, Copy)]
    struct Fixed {
        earth_fixed: [f64; 3],
        window: Option<(u32, u32)>,
        fail: bool,
    }

    /// Reads `catalog_number` as an index into its list of states.
    struct FixedPropagator {
        states: Vec<Fixed>,
    }

    impl Propagator for FixedPropagator {
        type State = Fixed;

        fn name(&self) -> &'static str {
            "fixed"
        }

        fn initialize(&self, record: &ElementRecord) -> Result<Fixed, PropagationError> {
            Ok(self
                .states
                .get(record.catalog_number as usize)
                .copied()
                .unwrap_or(OVERHEAD))
        }

        fn position(&self, state: &Fixed, time: &JulianTime) -> Result<[f64; 3], PropagationError> {
            if state.fail {
                return Err(PropagationError::Propagation {
                    minutes: 0.0,
                    reason: "decayed".to_string(),
                });
            }
            let frame = (time.jd_frac * 86_400.0).round() as u32;
            let hidden = state
                .window
                .is_some_and(|(start, end)| frame < start || frame > end);
            let [x, y, z] = if hidden {
                BELOW.earth_fixed
            } else {
                state.earth_fixed
            };
            let (sin_g, cos_g) = time.gmst().sin_cos();
            Ok([cos_g * x - sin_g * y, sin_g * x + cos_g * y, z])
        }
    }

    const OVERHEAD: Fixed = Fixed {
        earth_fixed: [WGS84_A_KM + 400.0, 0.0, 0.0],
        window: None,
        fail: false,
    };
    const BELOW: Fixed = Fixed {
        earth_fixed: [-WGS84_A_KM - 400.0, 0.0, 0.0],
        window: None,
        fail: false,
    };

    fn records(count: u32) -> Vec<ElementRecord> {
        let base = parse_element_set("ref", REFERENCE_LINE1, REFERENCE_LINE2)
            .unwrap()
            .record;
        (0..count)
            .map(|n| ElementRecord {
                catalog_number: n,
                catalog_id: format!("{:05}", n),
                ..base.clone()
            })
            .collect()
    }

    /// Frames one second apart from midnight, so frame `k` has `jd_frac = k / 86400`.
    fn batch(frames: usize) -> TimeBatch {
        TimeSystemConverter::new(std::time::Duration::from_secs(1), frames, 0.0)
            .unwrap()
            .compute(&CalendarInstant::new(2025, 7, 5, 0, 0, 0.0))
            .unwrap()
    }

    fn render(states: Vec<Fixed>, frames: usize) -> (ProjectionRenderer, RenderStats) {
        let propagator = FixedPropagator { states };
        let catalog = Catalog::from_records(records(propagator.states.len() as u32));
        let arena = dispatch_states(&propagator, catalog.records()).unwrap();
        let config = RenderConfig::default()
            .with_image_size(SIZE)
            .with_observer(Observer::new(0.0, 0.0, 0.0));
        let mut renderer = ProjectionRenderer::new(config).unwrap();
        let stats = renderer.render(&propagator, &arena, catalog.objects(), &batch(frames));
        (renderer, stats)
    }

    #[test]
    fn test_overhead_object_drawn_at_centre() {
        let (renderer, stats) = render(vec![OVERHEAD], 3);

        assert_eq!(stats.frames, 3);
        assert_eq!(stats.drawn, 1);
        assert_eq!(stats.skipped, 0);
        for (image, index) in renderer.images().iter().zip(renderer.indices()) {
            assert_eq!(index.get(CENTRE, CENTRE), Some(1));
            assert_eq!(index.count(1), 13);
            assert_eq!(image.get_pixel(CENTRE as u32, CENTRE as u32).0[3], 0xff);
            assert_eq!(image.get_pixel(0, 0).0, [0; 4]);
        }
    }

    #[test]
    fn test_hidden_object_leaves_buffers_empty() {
        let (renderer, stats) = render(vec![BELOW], 4);

        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.drawn, 0);
        assert!(renderer
            .indices()
            .iter()
            .all(|index| index.count(0) == (SIZE * SIZE) as usize));
    }

    #[test]
    fn test_higher_index_wins_overlap() {
        let (renderer, _) = render(vec![OVERHEAD, OVERHEAD, BELOW], 1);
        let index = &renderer.indices()[0];
        assert_eq!(index.get(CENTRE, CENTRE), Some(2));
        assert_eq!(index.count(1), 0);
    }

    #[test]
    fn test_visible_only_between_boundaries_is_skipped() {
        let transit = Fixed {
            window: Some((2, 2)),
            ..OVERHEAD
        };
        let (renderer, stats) = render(vec![transit], 5);

        assert_eq!(stats.skipped, 1);
        assert_eq!(renderer.indices()[2].count(1), 0);
    }

    #[test]
    fn test_visible_at_one_boundary_is_traced() {
        let setting = Fixed {
            window: Some((0, 1)),
            ..OVERHEAD
        };
        let (renderer, stats) = render(vec![setting], 5);

        assert_eq!(stats.drawn, 1);
        let counts: Vec<usize> = renderer.indices().iter().map(|i| i.count(1)).collect();
        assert_eq!(counts, vec![13, 13, 0, 0, 0]);
    }

    #[test]
    fn test_propagation_failures_counted() {
        let decayed = Fixed {
            fail: true,
            ..OVERHEAD
        };
        let (_, stats) = render(vec![decayed, OVERHEAD], 5);

        assert_eq!(stats.failures, 2);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.drawn, 1);
    }

    #[test]
    fn test_buffers_cleared_between_batches() {
        let propagator = FixedPropagator {
            states: vec![OVERHEAD],
        };
        let catalog = Catalog::from_records(records(1));
        let arena = dispatch_states(&propagator, catalog.records()).unwrap();
        let config = RenderConfig::default()
            .with_image_size(SIZE)
            .with_observer(Observer::new(0.0, 0.0, 0.0));
        let mut renderer = ProjectionRenderer::new(config).unwrap();

        renderer.render(&propagator, &arena, catalog.objects(), &batch(2));
        assert_eq!(renderer.indices()[0].count(1), 13);

        let hidden = FixedPropagator { states: vec![BELOW] };
        let hidden_arena = dispatch_states(&hidden, catalog.records()).unwrap();
        renderer.render(&hidden, &hidden_arena, catalog.objects(), &batch(2));
        assert_eq!(renderer.indices()[0].count(1), 0);
        assert!(renderer.images()[0].pixels().all(|p| p.0 == [0; 4]));
    }

    #[test]
    fn test_config_validation() {
        assert!(RenderConfig::default().validate().is_ok());
        assert!(RenderConfig::default().with_image_size(0).validate().is_err());
        assert!(RenderConfig::default().with_min_elevation(90.0).validate().is_err());
        assert!(RenderConfig::default().with_marker_radius(65).validate().is_err());
        assert!(RenderConfig::default()
            .with_observer(Observer::new(91.0, 0.0, 0.0))
            .validate()
            .is_err());
    }
}
