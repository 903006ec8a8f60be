//! Error types for the production pipeline.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::propagation::PropagationError;
use crate::render::RenderError;
use crate::time::TimeError;

/// Anything that stops the pipeline from producing frames.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Time(#[from] TimeError),

    #[error(transparent)]
    Propagation(#[from] PropagationError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Invalid pipeline configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to spawn producer thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Producer thread panicked")]
    ProducerPanicked,
}
