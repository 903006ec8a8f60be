//! Batched conversion of a wall-clock start instant into propagator time.

use std::time::Duration;

use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};
use hifitime::{Epoch, Unit};
use tracing::debug;

use super::error::TimeError;
use super::julian::{
    jday, normalize_julian, JulianTime, DAYS_PER_CENTURY, MJD_J2000, SECONDS_PER_DAY,
};

/// A UTC calendar instant with fractional seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalendarInstant {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    /// Seconds within the minute; up to 61 to allow a leap second.
    pub second: f64,
}

impl CalendarInstant {
    pub fn new(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: f64) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    pub fn from_datetime(timestamp: &DateTime<Utc>) -> Self {
        Self {
            year: timestamp.year(),
            month: timestamp.month(),
            day: timestamp.day(),
            hour: timestamp.hour(),
            minute: timestamp.minute(),
            second: f64::from(timestamp.second()) + f64::from(timestamp.nanosecond()) / 1e9,
        }
    }

    /// Checks every component against its calendar range.
    pub fn validate(&self) -> Result<(), TimeError> {
        let component = |field: &'static str, value: f64| TimeError::InvalidComponent { field, value };

        if !(1..=12).contains(&self.month) {
            return Err(component("month", f64::from(self.month)));
        }
        if self.hour >= 24 {
            return Err(component("hour", f64::from(self.hour)));
        }
        if self.minute >= 60 {
            return Err(component("minute", f64::from(self.minute)));
        }
        if !self.second.is_finite() || !(0.0..61.0).contains(&self.second) {
            return Err(component("second", self.second));
        }
        if NaiveDate::from_ymd_opt(self.year, self.month, self.day).is_none() {
            return Err(TimeError::InvalidDate {
                year: self.year,
                month: self.month,
                day: self.day,
            });
        }
        Ok(())
    }

    /// Converts to a chrono timestamp, validating first.
    pub fn to_datetime(&self) -> Result<DateTime<Utc>, TimeError> {
        self.validate()?;

        let whole = self.second.floor();
        let mut nanos = (((self.second - whole) * 1e9).round() as u32).min(999_999_999);
        let mut second = whole as u32;
        // chrono expresses a leap second as second 59 with an extra billion nanos
        if second >= 60 {
            second = 59;
            nanos += 1_000_000_000;
        }

        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
            .and_then(|date| date.and_hms_nano_opt(self.hour, self.minute, second, nanos))
            .map(|naive| naive.and_utc())
            .ok_or(TimeError::InvalidDate {
                year: self.year,
                month: self.month,
                day: self.day,
            })
    }

    fn seconds_of_day(&self) -> f64 {
        f64::from(self.hour) * 3600.0 + f64::from(self.minute) * 60.0 + self.second
    }
}

/// One frame's time in wall-clock and propagator form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSample {
    pub timestamp: DateTime<Utc>,
    pub julian: JulianTime,
}

/// The M time samples of one batch, in frame order.
///
/// Never empty.
#[derive(Debug, Clone)]
pub struct TimeBatch {
    samples: Vec<TimeSample>,
    period: chrono::Duration,
}

impl TimeBatch {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[TimeSample] {
        &self.samples
    }

    pub fn first(&self) -> &TimeSample {
        &self.samples[0]
    }

    pub fn last(&self) -> &TimeSample {
        &self.samples[self.samples.len() - 1]
    }

    /// Start instant of the batch that follows this one.
    pub fn next_start(&self) -> DateTime<Utc> {
        self.first().timestamp + self.period * self.samples.len() as i32
    }
}

/// Converts a start instant into a [`TimeBatch`] of `frames` samples spaced
/// `period` apart.
#[derive(Debug, Clone)]
pub struct TimeSystemConverter {
    period: Duration,
    step: chrono::Duration,
    batch_duration: Duration,
    frames: usize,
    ut1_utc_offset_secs: f64,
}

impl TimeSystemConverter {
    /// Creates a converter.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::InvalidPeriod`] for a zero period or a batch
    /// span too long to represent, and
    /// [`TimeError::NoFrames`] for an empty batch.
    pub fn new(period: Duration, frames: usize, ut1_utc_offset_secs: f64) -> Result<Self, TimeError> {
        if frames == 0 || frames > i32::MAX as usize {
            return Err(TimeError::NoFrames);
        }
        let step = chrono::Duration::from_std(period)
            .ok()
            .filter(|step| *step > chrono::Duration::zero())
            .ok_or(TimeError::InvalidPeriod(period.as_secs_f64()))?;
        // The whole batch must also be representable as a timestamp offset
        let batch_duration = u32::try_from(frames)
            .ok()
            .and_then(|frames| period.checked_mul(frames))
            .filter(|span| chrono::Duration::from_std(*span).is_ok())
            .ok_or(TimeError::InvalidPeriod(period.as_secs_f64()))?;

        Ok(Self {
            period,
            step,
            batch_duration,
            frames,
            ut1_utc_offset_secs,
        })
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn ut1_utc_offset_secs(&self) -> f64 {
        self.ut1_utc_offset_secs
    }

    /// Wall-clock span covered by one batch.
    pub fn batch_duration(&self) -> Duration {
        self.batch_duration
    }

    /// Computes all samples of the batch starting at `start`.
    pub fn compute(&self, start: &CalendarInstant) -> Result<TimeBatch, TimeError> {
        let timestamp = start.to_datetime()?;
        let (jd, jd_frac) = jday(
            start.year,
            start.month,
            start.day,
            start.hour,
            start.minute,
            start.second,
        );
        let ttt = terrestrial_centuries(start);

        let period_days = self.period.as_secs_f64() / SECONDS_PER_DAY;
        let ut1_days = self.ut1_utc_offset_secs / SECONDS_PER_DAY;

        let samples = (0..self.frames)
            .map(|frame| {
                let offset_days = frame as f64 * period_days;
                let (jd, jd_frac) = normalize_julian(jd, jd_frac + offset_days);
                let (jd_ut1, jd_ut1_frac) = normalize_julian(jd, jd_frac + ut1_days);
                TimeSample {
                    timestamp: timestamp + self.step * frame as i32,
                    julian: JulianTime {
                        jd,
                        jd_frac,
                        jd_ut1,
                        jd_ut1_frac,
                        ttt: ttt + offset_days / DAYS_PER_CENTURY,
                    },
                }
            })
            .collect();

        debug!(start = %timestamp, frames = self.frames, "Computed time batch");
        Ok(TimeBatch {
            samples,
            period: self.step,
        })
    }

    /// Computes the batch starting at a chrono timestamp.
    pub fn compute_at(&self, start: DateTime<Utc>) -> Result<TimeBatch, TimeError> {
        self.compute(&CalendarInstant::from_datetime(&start))
    }
}

/// Julian centuries of TT since J2000, with UTC mapped through the leap
/// second table.
fn terrestrial_centuries(instant: &CalendarInstant) -> f64 {
    let epoch = Epoch::from_gregorian_utc_at_midnight(instant.year, instant.month as u8, instant.day as u8)
        + Unit::Second * instant.seconds_of_day();
    (epoch.to_mjd_tt_days() - MJD_J2000) / DAYS_PER_CENTURY
}
