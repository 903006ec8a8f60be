//! Julian date arithmetic.

use std::f64::consts::TAU;

/// Julian date of the Modified Julian Date origin.
pub const MJD_OFFSET: f64 = 2_400_000.5;

/// Modified Julian Date of J2000.0 (2000-01-01 12:00 TT).
pub const MJD_J2000: f64 = 51_544.5;

/// Days in a Julian century.
pub const DAYS_PER_CENTURY: f64 = 36_525.0;

pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Julian date of a Gregorian calendar instant as `(jd, fraction)`.
///
/// `jd` is the date at the preceding midnight (always `x.5`) and `fraction`
/// the elapsed part of the day. Valid for years 1900 to 2100.
pub fn jday(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: f64) -> (f64, f64) {
    let year = f64::from(year);
    let month = f64::from(month);

    let jd = 367.0 * year - (7.0 * (year + ((month + 9.0) / 12.0).floor()) * 0.25).floor()
        + (275.0 * month / 9.0).floor()
        + f64::from(day)
        + 1_721_013.5;
    let fraction = (second + f64::from(minute) * 60.0 + f64::from(hour) * 3600.0) / SECONDS_PER_DAY;

    (jd, fraction)
}

/// Moves whole days out of `fraction` so that `0 <= fraction < 1`.
pub fn normalize_julian(jd: f64, fraction: f64) -> (f64, f64) {
    let whole = fraction.floor();
    (jd + whole, fraction - whole)
}

/// One time sample in every representation the propagator and projection need.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JulianTime {
    /// UTC Julian date at the preceding midnight.
    pub jd: f64,
    /// UTC fraction of day.
    pub jd_frac: f64,
    /// UT1 Julian date at the preceding midnight.
    pub jd_ut1: f64,
    /// UT1 fraction of day.
    pub jd_ut1_frac: f64,
    /// Julian centuries of Terrestrial Time since J2000.
    pub ttt: f64,
}

impl JulianTime {
    /// Minutes elapsed since an epoch given as a Julian date pair.
    ///
    /// Whole days and fractions are differenced separately to keep
    /// sub-millisecond precision.
    pub fn minutes_since(&self, epoch_jd: f64, epoch_frac: f64) -> f64 {
        ((self.jd - epoch_jd) + (self.jd_frac - epoch_frac)) * 1440.0
    }

    /// Modified Julian Date on the UT1 scale.
    pub fn mjd_ut1(&self) -> f64 {
        (self.jd_ut1 - MJD_OFFSET) + self.jd_ut1_frac
    }

    /// Greenwich Mean Sidereal Time in radians, in `[0, 2π)`.
    ///
    /// IAU 1982 polynomial for GMST at 0h UT1 plus the sidereal rotation
    /// accumulated over the fraction of the day.
    pub fn gmst(&self) -> f64 {
        const C0: f64 = 24_110.548_41;
        const C1: f64 = 8_640_184.812_866;
        const C2: f64 = 9.3104e-2;
        const C3: f64 = -6.2e-6;
        // Sidereal days per solar day
        const RAP: f64 = 1.002_737_909_34;

        let midnight = self.jd_ut1 - MJD_OFFSET;
        let t = (midnight - MJD_J2000) / DAYS_PER_CENTURY;
        let gmst0 = (((C3 * t + C2) * t + C1) * t + C0) * TAU / SECONDS_PER_DAY;

        (gmst0 + self.jd_ut1_frac * TAU * RAP).rem_euclid(TAU)
    }
}
