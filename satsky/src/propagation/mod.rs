//! Propagator dispatch.
//!
//! Element records become opaque per-object propagator state exactly once
//! per catalog load. The renderer then queries positions from that state
//! for every frame.
//!
//! # Architecture
//!
//! ```text
//! ElementRecord[] ──probe──► StateLayout
//!        │
//!        └──rayon par_iter──► initialize() ──► StateArena<State>
//!                                                   │
//!                               position(state, t) ◄┘  (read-only, shared)
//! ```
//!
//! [`Propagator`] is the seam: [`Sgp4Propagator`] wraps the `sgp4` crate,
//! and tests substitute simple deterministic propagators.

mod arena;
mod error;
mod propagator;
mod sgp4_propagator;

pub use arena::{dispatch_states, StateArena};
pub use error::PropagationError;
pub use propagator::{Propagator, StateLayout, REFERENCE_LINE1, REFERENCE_LINE2};
pub use sgp4_propagator::{Sgp4Propagator, Sgp4State};
