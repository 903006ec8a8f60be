//! Wall-clock to propagator time conversion.
//!
//! The propagator and the sky projection need each frame's time as a split
//! Julian date on the UTC and UT1 scales plus Julian centuries of
//! Terrestrial Time. [`TimeSystemConverter`] produces all M samples of a
//! batch in one call.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use satsky::time::{CalendarInstant, TimeSystemConverter};
//!
//! let converter = TimeSystemConverter::new(Duration::from_millis(250), 4, 0.0614).unwrap();
//! let batch = converter
//!     .compute(&CalendarInstant::new(2025, 7, 5, 0, 0, 0.0))
//!     .unwrap();
//!
//! assert_eq!(batch.len(), 4);
//! assert_eq!(batch.first().julian.jd, 2460861.5);
//! ```

mod converter;
mod error;
mod julian;

pub use converter::{CalendarInstant, TimeBatch, TimeSample, TimeSystemConverter};
pub use error::TimeError;
pub use julian::{jday, normalize_julian, JulianTime, MJD_J2000, MJD_OFFSET, SECONDS_PER_DAY};
