//! One loaded catalog wired to a converter and a renderer.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use super::error::PipelineError;
use super::queue::Frame;
use crate::catalog::{Catalog, ObjectTable};
use crate::propagation::{dispatch_states, Propagator, StateArena};
use crate::render::{ProjectionRenderer, RenderConfig};
use crate::telemetry::PipelineMetrics;
use crate::time::TimeSystemConverter;

/// Everything needed to turn a start instant into a batch of frames.
///
/// Owns the state arena (built once) and the renderer with its reused
/// buffers.
pub struct PipelineSession<P: Propagator> {
    propagator: P,
    arena: Arc<StateArena<P::State>>,
    objects: Arc<ObjectTable>,
    converter: TimeSystemConverter,
    renderer: ProjectionRenderer,
    metrics: Arc<PipelineMetrics>,
}

impl<P: Propagator> PipelineSession<P> {
    /// Dispatches propagator state for every catalog record.
    ///
    /// # Errors
    ///
    /// Fails if the render configuration is invalid or if any record cannot
    /// be initialized.
    pub fn new(
        propagator: P,
        catalog: &Catalog,
        converter: TimeSystemConverter,
        render_config: RenderConfig,
        metrics: Arc<PipelineMetrics>,
    ) -> Result<Self, PipelineError> {
        let renderer = ProjectionRenderer::new(render_config)?;
        let arena = dispatch_states(&propagator, catalog.records())?;

        info!(
            objects = arena.len(),
            frames_per_batch = converter.frames(),
            period_ms = converter.period().as_millis() as u64,
            image_size = renderer.config().image_size,
            "Pipeline session ready"
        );

        Ok(Self {
            propagator,
            arena: Arc::new(arena),
            objects: Arc::clone(catalog.objects()),
            converter,
            renderer,
            metrics,
        })
    }

    pub fn converter(&self) -> &TimeSystemConverter {
        &self.converter
    }

    pub fn objects(&self) -> &Arc<ObjectTable> {
        &self.objects
    }

    pub fn arena(&self) -> &Arc<StateArena<P::State>> {
        &self.arena
    }

    pub fn metrics(&self) -> &Arc<PipelineMetrics> {
        &self.metrics
    }

    /// Computes, renders and packages one batch starting at `start`.
    pub fn produce_batch(&mut self, start: DateTime<Utc>) -> Result<Vec<Frame>, PipelineError> {
        let batch = self.converter.compute_at(start)?;
        let stats = self
            .renderer
            .render(&self.propagator, &self.arena, &self.objects, &batch);
        self.metrics.batch_rendered(&stats);

        let frames = batch
            .samples()
            .iter()
            .zip(self.renderer.images())
            .zip(self.renderer.indices())
            .map(|((sample, image), index)| Frame {
                timestamp: sample.timestamp,
                image: image.clone(),
                index: index.clone(),
                objects: Arc::clone(&self.objects),
            })
            .collect();
        Ok(frames)
    }
}
