//! The propagator seam.

use std::mem;

use super::error::PropagationError;
use crate::elements::{parse_element_set, ElementRecord};
use crate::time::JulianTime;

/// Built-in element set used by the capability probe.
pub const REFERENCE_LINE1: &str =
    "1 25544U 98067A   25185.47485775  .00005492  00000+0  10282-3 0  9993";
pub const REFERENCE_LINE2: &str =
    "2 25544  51.6344 221.3901 0002450 331.8120  28.2736 15.50368910517843";

/// Size and alignment of one per-object propagator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateLayout {
    /// Bytes per state slot.
    pub stride: usize,
    pub align: usize,
}

impl StateLayout {
    pub fn of<S>() -> Self {
        Self {
            stride: mem::size_of::<S>(),
            align: mem::align_of::<S>(),
        }
    }
}

/// An orbital propagator treated as an opaque numerical routine.
///
/// State is derived once per object and then only handed back to
/// [`position`](Propagator::position). Implementations must be shareable
/// across rayon workers.
pub trait Propagator: Send + Sync {
    /// Opaque per-object state.
    type State: Send + Sync;

    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Derives the state for one record.
    fn initialize(&self, record: &ElementRecord) -> Result<Self::State, PropagationError>;

    /// TEME position in kilometres at `time`.
    fn position(
        &self,
        state: &Self::State,
        time: &JulianTime,
    ) -> Result<[f64; 3], PropagationError>;

    /// Runs the propagator once on the reference element set and reports
    /// the state layout.
    ///
    /// # Errors
    ///
    /// Returns [`PropagationError::Capacity`] if the reference set cannot be
    /// initialized or propagated, or if the state is zero-sized.
    fn probe(&self) -> Result<StateLayout, PropagationError> {
        let reference = parse_element_set("reference", REFERENCE_LINE1, REFERENCE_LINE2)
            .map_err(|e| PropagationError::Capacity(e.to_string()))?
            .record;
        let state = self
            .initialize(&reference)
            .map_err(|e| PropagationError::Capacity(e.to_string()))?;

        let (jd, jd_frac) = reference.epoch_julian();
        let at_epoch = JulianTime {
            jd,
            jd_frac,
            jd_ut1: jd,
            jd_ut1_frac: jd_frac,
            ttt: 0.0,
        };
        self.position(&state, &at_epoch)
            .map_err(|e| PropagationError::Capacity(e.to_string()))?;

        let layout = StateLayout::of::<Self::State>();
        if layout.stride == 0 {
            return Err(PropagationError::Capacity(format!(
                "{} reports a zero-sized state",
                self.name()
            )));
        }
        Ok(layout)
    }
}
