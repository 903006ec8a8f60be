//! The validated element record and its canonical text form.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::checksum::compute_checksum;
use crate::time::{jday, normalize_julian};

/// Security classification carried in column 8 of line 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    Unclassified,
    Classified,
    Secret,
}

impl Classification {
    /// Parses the single-letter code (`U`, `C` or `S`).
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'U' => Some(Classification::Unclassified),
            'C' => Some(Classification::Classified),
            'S' => Some(Classification::Secret),
            _ => None,
        }
    }

    /// Returns the single-letter code.
    pub fn code(self) -> char {
        match self {
            Classification::Unclassified => 'U',
            Classification::Classified => 'C',
            Classification::Secret => 'S',
        }
    }
}

/// Broad orbit family, derived from mean motion and eccentricity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrbitRegime {
    /// Period under 128 minutes.
    Low,
    /// Between low orbits and geosynchronous.
    Medium,
    /// About one revolution per sidereal day.
    Geosynchronous,
    /// Eccentricity above 0.25.
    HighlyElliptical,
}

/// One object's orbital elements at a reference epoch.
///
/// Angles are in degrees and mean motion in revolutions per day, exactly as
/// they appear in the source lines. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementRecord {
    /// Five-character catalog id as written (Alpha-5 letters preserved).
    pub catalog_id: String,
    /// Numeric catalog number (Alpha-5 decoded).
    pub catalog_number: u32,
    pub classification: Classification,
    /// International designator, trailing blanks removed; empty when blank.
    pub international_designator: String,
    /// Four-digit epoch year.
    pub epoch_year: i32,
    /// Day of year with fraction; 1.0 is January 1st, 00:00 UTC.
    pub epoch_day: f64,
    /// First time derivative of mean motion divided by two (rev/day²).
    pub mean_motion_dot: f64,
    /// Second time derivative of mean motion divided by six (rev/day³).
    pub mean_motion_ddot: f64,
    /// B* drag term (1/earth radii).
    pub bstar: f64,
    pub ephemeris_type: u8,
    pub element_number: u32,
    pub inclination_deg: f64,
    pub right_ascension_deg: f64,
    pub eccentricity: f64,
    pub argument_of_perigee_deg: f64,
    pub mean_anomaly_deg: f64,
    /// Revolutions per day.
    pub mean_motion: f64,
    pub revolution_number: u32,
}

impl ElementRecord {
    /// Epoch as a Julian date pair `(jd, fraction)` with `jd` at midnight.
    pub fn epoch_julian(&self) -> (f64, f64) {
        let (jd, fraction) = jday(self.epoch_year, 1, 1, 0, 0, 0.0);
        normalize_julian(jd, fraction + self.epoch_day - 1.0)
    }

    /// Epoch as a UTC calendar timestamp.
    ///
    /// Returns `None` if the day of year does not fit the epoch year.
    pub fn epoch_datetime(&self) -> Option<NaiveDateTime> {
        let days_in_year = if NaiveDate::from_yo_opt(self.epoch_year, 366).is_some() {
            366.0
        } else {
            365.0
        };
        if !(1.0..days_in_year + 1.0).contains(&self.epoch_day) {
            return None;
        }

        let start = NaiveDate::from_yo_opt(self.epoch_year, 1)?.and_hms_opt(0, 0, 0)?;
        let offset_nanos = ((self.epoch_day - 1.0) * 86_400e9).round() as i64;
        start.checked_add_signed(chrono::Duration::nanoseconds(offset_nanos))
    }

    /// Classifies the orbit for display purposes.
    pub fn orbit_regime(&self) -> OrbitRegime {
        if self.eccentricity > 0.25 {
            OrbitRegime::HighlyElliptical
        } else if self.mean_motion >= 11.25 {
            OrbitRegime::Low
        } else if (0.99..=1.01).contains(&self.mean_motion) {
            OrbitRegime::Geosynchronous
        } else {
            OrbitRegime::Medium
        }
    }

    /// Formats the record as canonical two-line text with fresh check digits.
    ///
    /// Numeric fields use blank padding; parsing the result reproduces every
    /// field at the precision of the format.
    pub fn to_lines(&self) -> (String, String) {
        let mut line1 = format!(
            "1 {}{} {:<8.8} {:02}{:012.8} {} {} {} {} {:>4}",
            self.catalog_id,
            self.classification.code(),
            self.international_designator,
            self.epoch_year.rem_euclid(100),
            self.epoch_day,
            format_leading_point(self.mean_motion_dot),
            format_assumed_point(self.mean_motion_ddot),
            format_assumed_point(self.bstar),
            self.ephemeris_type,
            self.element_number % 10_000,
        );
        line1.push(char::from(b'0' + compute_checksum(&line1)));

        let mut line2 = format!(
            "2 {} {:8.4} {:8.4} {:07} {:8.4} {:8.4} {:11.8}{:>5}",
            self.catalog_id,
            self.inclination_deg,
            self.right_ascension_deg,
            (self.eccentricity * 1e7).round() as u32,
            self.argument_of_perigee_deg,
            self.mean_anomaly_deg,
            self.mean_motion,
            self.revolution_number % 100_000,
        );
        line2.push(char::from(b'0' + compute_checksum(&line2)));

        (line1, line2)
    }
}

/// Decodes a five-character catalog id, including Alpha-5 ids.
///
/// Alpha-5 replaces the leading digit with a letter worth 10 (`A`) to 33
/// (`Z`), skipping `I` and `O`: `A8924` is 108924.
pub fn decode_catalog_number(id: &str) -> Option<u32> {
    let mut chars = id.chars();
    let lead = match chars.next()? {
        c @ '0'..='9' => c as u32 - '0' as u32,
        c @ 'A'..='H' => c as u32 - 'A' as u32 + 10,
        c @ 'J'..='N' => c as u32 - 'J' as u32 + 18,
        c @ 'P'..='Z' => c as u32 - 'P' as u32 + 23,
        _ => return None,
    };
    let rest = chars.as_str();
    if rest.len() != 4 || !rest.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(lead * 10_000 + rest.parse::<u32>().ok()?)
}

/// `±.dddddddd` with the sign column blank for positive values.
fn format_leading_point(value: f64) -> String {
    let sign = if value < 0.0 { '-' } else { ' ' };
    let digits = format!("{:.8}", value.abs());
    format!("{}{}", sign, digits.trim_start_matches('0'))
}

/// `±ddddd±d`, meaning `±0.ddddd × 10^±d`.
fn format_assumed_point(value: f64) -> String {
    let sign = if value < 0.0 { '-' } else { ' ' };
    let magnitude = value.abs();
    if magnitude == 0.0 {
        return format!("{}00000+0", sign);
    }

    let mut exponent = magnitude.log10().floor() as i32 + 1;
    let mut mantissa = (magnitude / 10f64.powi(exponent) * 1e5).round() as u32;
    if mantissa >= 100_000 {
        mantissa /= 10;
        exponent += 1;
    } else if mantissa < 10_000 {
        exponent -= 1;
        mantissa = (magnitude / 10f64.powi(exponent) * 1e5).round() as u32;
    }
    format!("{}{:05}{:+}", sign, mantissa, exponent)
}
