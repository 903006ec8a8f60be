//! Resolving screen positions to objects.
//!
//! A click rarely lands exactly on a marker, so picks search outward from
//! the clicked pixel for the nearest pixel owned by an object.
//! [`ObjectTracker`] uses the same search each frame, restricted to the
//! tracked object's index, to follow it as it moves.

mod search;
mod tracker;

pub use search::{find_nearest, PixelMatch};
pub use tracker::{ObjectTracker, PickQuery, PickResult, Track, DEFAULT_PICK_RADIUS};
