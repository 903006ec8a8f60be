//! Error types for time conversion.

use std::fmt;

/// Invalid calendar input or batch configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum TimeError {
    /// A calendar component is outside its valid range.
    InvalidComponent { field: &'static str, value: f64 },
    /// The day does not exist in the given month.
    InvalidDate { year: i32, month: u32, day: u32 },
    /// The frame period is zero, negative or too large.
    InvalidPeriod(f64),
    /// A batch must contain at least one frame.
    NoFrames,
}

impl fmt::Display for TimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeError::InvalidComponent { field, value } => {
                write!(f, "Invalid {}: {}", field, value)
            }
            TimeError::InvalidDate { year, month, day } => {
                write!(f, "Invalid date {:04}-{:02}-{:02}", year, month, day)
            }
            TimeError::InvalidPeriod(secs) => write!(f, "Invalid frame period: {} s", secs),
            TimeError::NoFrames => write!(f, "Batch must contain at least one frame"),
        }
    }
}

impl std::error::Error for TimeError {}
