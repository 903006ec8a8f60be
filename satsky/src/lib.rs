//! SatSky - real-time all-sky satellite projections
//!
//! This library turns a catalog of two-line element sets into a stream of
//! sky-projection frames, each paired with a per-pixel object-index buffer
//! so a display can resolve clicks back to catalog objects.
//!
//! # Modules
//!
//! - [`elements`]: two-line element set parsing and formatting
//! - [`catalog`]: element file directories and object metadata
//! - [`time`]: wall-clock instants to propagator time batches
//! - [`propagation`]: propagator abstraction and parallel state dispatch
//! - [`render`]: all-sky projection images and index buffers
//! - [`pipeline`]: look-ahead producer, frame queue and consumer pacing
//! - [`pick`]: nearest-active-pixel search and object tracking
//! - [`telemetry`]: pipeline counters
//! - [`config`]: INI configuration file

pub mod catalog;
pub mod config;
pub mod elements;
pub mod pick;
pub mod pipeline;
pub mod propagation;
pub mod render;
pub mod telemetry;
pub mod time;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
