//! All-sky projection rendering.
//!
//! For each frame of a batch the renderer produces an RGBA image of the sky
//! above the observer and a same-sized index buffer naming the object under
//! each pixel.
//!
//! # Architecture
//!
//! ```text
//! TimeBatch ─┬─► GMST per frame
//!            │
//! StateArena ┴─► par_iter over objects ─► Track (pixel per frame)
//!                                              │
//!                         marks per frame ◄────┘
//!                               │
//!                 par_iter over frames ─► paint discs ─► images + index buffers
//! ```
//!
//! Positions go TEME → Earth-fixed (GMST rotation) → East-North-Up at the
//! observer → azimuth/elevation → [`SkyProjection`].
//!
//! Buffers belong to the [`ProjectionRenderer`] and are cleared at the start
//! of every batch before any marker is painted.

mod buffers;
mod error;
mod observer;
mod palette;
mod projection;
mod renderer;

pub use buffers::IndexBuffer;
pub use error::RenderError;
pub use observer::{LookAngles, Observer, ObserverFrame, WGS84_A_KM, WGS84_F};
pub use palette::{regime_color, UNKNOWN_COLOR};
pub use projection::{Pixel, SkyProjection};
pub use renderer::{
    ProjectionRenderer, RenderConfig, RenderStats, DEFAULT_IMAGE_SIZE, DEFAULT_MARKER_RADIUS,
};
