//! SGP4/SDP4 propagation through the `sgp4` crate.

use sgp4::{Constants, Elements, MinutesSinceEpoch};

use super::error::PropagationError;
use super::propagator::Propagator;
use crate::elements::{Classification, ElementRecord};
use crate::time::JulianTime;

/// Per-object SGP4 state: the initialized constants plus the epoch as a
/// split Julian date.
#[derive(Debug, Clone)]
pub struct Sgp4State {
    constants: Constants,
    epoch_jd: f64,
    epoch_frac: f64,
}

impl Sgp4State {
    /// Epoch as `(jd, fraction)`.
    pub fn epoch(&self) -> (f64, f64) {
        (self.epoch_jd, self.epoch_frac)
    }
}

/// The standard SGP4 propagator (SDP4 for deep-space orbits).
#[derive(Debug, Clone, Copy, Default)]
pub struct Sgp4Propagator;

impl Sgp4Propagator {
    pub fn new() -> Self {
        Self
    }

    fn elements(record: &ElementRecord) -> Result<Elements, PropagationError> {
        let invalid = |reason: &str| PropagationError::Initialization {
            catalog_id: record.catalog_id.clone(),
            reason: reason.to_string(),
        };

        if !(0.0..1.0).contains(&record.eccentricity) {
            return Err(invalid("eccentricity outside [0, 1)"));
        }
        if record.mean_motion <= 0.0 {
            return Err(invalid("mean motion must be positive"));
        }
        let datetime = record
            .epoch_datetime()
            .ok_or_else(|| invalid("epoch day does not fit the epoch year"))?;

        Ok(Elements {
            object_name: None,
            international_designator: (!record.international_designator.is_empty())
                .then(|| record.international_designator.clone()),
            norad_id: u64::from(record.catalog_number),
            classification: match record.classification {
                Classification::Unclassified => sgp4::Classification::Unclassified,
                Classification::Classified => sgp4::Classification::Classified,
                Classification::Secret => sgp4::Classification::Secret,
            },
            datetime,
            mean_motion_dot: record.mean_motion_dot,
            mean_motion_ddot: record.mean_motion_ddot,
            drag_term: record.bstar,
            element_set_number: u64::from(record.element_number),
            inclination: record.inclination_deg,
            right_ascension: record.right_ascension_deg,
            eccentricity: record.eccentricity,
            argument_of_perigee: record.argument_of_perigee_deg,
            mean_anomaly: record.mean_anomaly_deg,
            mean_motion: record.mean_motion,
            revolution_number: u64::from(record.revolution_number),
            ephemeris_type: record.ephemeris_type,
        })
    }
}

impl Propagator for Sgp4Propagator {
    type State = Sgp4State;

    fn name(&self) -> &'static str {
        "sgp4"
    }

    fn initialize(&self, record: &ElementRecord) -> Result<Sgp4State, PropagationError> {
        let elements = Self::elements(record)?;
        let constants =
            Constants::from_elements(&elements).map_err(|e| PropagationError::Initialization {
                catalog_id: record.catalog_id.clone(),
                reason: e.to_string(),
            })?;
        let (epoch_jd, epoch_frac) = record.epoch_julian();

        Ok(Sgp4State {
            constants,
            epoch_jd,
            epoch_frac,
        })
    }

    fn position(&self, state: &Sgp4State, time: &JulianTime) -> Result<[f64; 3], PropagationError> {
        let minutes = time.minutes_since(state.epoch_jd, state.epoch_frac);
        state
            .constants
            .propagate(MinutesSinceEpoch(minutes))
            .map(|prediction| prediction.position)
            .map_err(|e| PropagationError::Propagation {
                minutes,
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::parse_element_set;
    use crate::propagation::{REFERENCE_LINE1, REFERENCE_LINE2};

    fn iss() -> ElementRecord {
        parse_element_set("iss", REFERENCE_LINE1, REFERENCE_LINE2)
            .unwrap()
            .record
    }

    fn at(jd: f64, jd_frac: f64) -> JulianTime {
        JulianTime {
            jd,
            jd_frac,
            jd_ut1: jd,
            jd_ut1_frac: jd_frac,
            ttt: 0.0,
        }
    }

    fn norm(v: [f64; 3]) -> f64 {
        (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
    }

    #[test]
    fn test_iss_radius_at_epoch() {
        let propagator = Sgp4Propagator::new();
        let state = propagator.initialize(&iss()).unwrap();
        let (jd, frac) = state.epoch();

        let radius = norm(propagator.position(&state, &at(jd, frac)).unwrap());
        assert!(radius > 6600.0 && radius < 6900.0, "radius {}", radius);
    }

    #[test]
    fn test_iss_moves_between_samples() {
        let propagator = Sgp4Propagator::new();
        let state = propagator.initialize(&iss()).unwrap();
        let (jd, frac) = state.epoch();

        let a = propagator.position(&state, &at(jd, frac)).unwrap();
        // One minute later the station has moved roughly 460 km
        let b = propagator.position(&state, &at(jd, frac + 1.0 / 1440.0)).unwrap();
        let moved = norm([b[0] - a[0], b[1] - a[1], b[2] - a[2]]);
        assert!(moved > 400.0 && moved < 520.0, "moved {}", moved);
    }

    #[test]
    fn test_invalid_elements_rejected() {
        let propagator = Sgp4Propagator::new();

        let mut record = iss();
        record.eccentricity = 1.2;
        assert!(matches!(
            propagator.initialize(&record),
            Err(PropagationError::Initialization { .. })
        ));

        let mut record = iss();
        record.mean_motion = 0.0;
        assert!(propagator.initialize(&record).is_err());

        let mut record = iss();
        record.epoch_day = 400.0;
        assert!(propagator.initialize(&record).is_err());
    }

    #[test]
    fn test_probe_reports_layout() {
        let layout = Sgp4Propagator::new().probe().unwrap();
        assert_eq!(layout.stride, std::mem::size_of::<Sgp4State>());
        assert!(layout.stride > 0);
    }
}
