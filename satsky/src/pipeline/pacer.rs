//! Consumer-side real-time pacing.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use super::control::{Clock, ExitFlag};

/// Default lateness tolerated before a frame counts as late.
pub const DEFAULT_LATE_TOLERANCE: Duration = Duration::from_millis(100);

/// What the consumer should do with a frame after pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pace {
    /// Show the frame; `late` if its time had already passed on arrival.
    Show { late: bool },
    /// Exit was requested while waiting.
    Exit,
}

/// Holds each frame back until its timestamp.
///
/// Sleeps at most one poll interval at a time so an exit request is noticed
/// promptly.
#[derive(Debug)]
pub struct FramePacer<C: Clock> {
    clock: Arc<C>,
    exit: ExitFlag,
    poll_interval: Duration,
    late_tolerance: Duration,
}

impl<C: Clock> FramePacer<C> {
    pub fn new(clock: Arc<C>, exit: ExitFlag, poll_interval: Duration) -> Self {
        Self {
            clock,
            exit,
            poll_interval,
            late_tolerance: DEFAULT_LATE_TOLERANCE,
        }
    }

    pub fn with_late_tolerance(mut self, tolerance: Duration) -> Self {
        self.late_tolerance = tolerance;
        self
    }

    /// Waits until `timestamp` or an exit request.
    pub fn wait_until(&self, timestamp: DateTime<Utc>) -> Pace {
        let mut first_check = true;
        loop {
            if self.exit.is_requested() {
                return Pace::Exit;
            }
            let remaining = timestamp - self.clock.now();
            match remaining.to_std() {
                Ok(remaining) if !remaining.is_zero() => {
                    self.clock.sleep(remaining.min(self.poll_interval));
                }
                _ => {
                    let overdue = (-remaining).to_std().unwrap_or_default();
                    let late = first_check && overdue > self.late_tolerance;
                    return Pace::Show { late };
                }
            }
            first_check = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ManualClock;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 5, 12, 0, 0).unwrap()
    }

    fn pacer(clock: &Arc<ManualClock>, exit: &ExitFlag) -> FramePacer<ManualClock> {
        FramePacer::new(Arc::clone(clock), exit.clone(), Duration::from_secs(1))
    }

    #[test]
    fn test_waits_in_poll_steps() {
        let clock = Arc::new(ManualClock::new(start()));
        let exit = ExitFlag::new();

        let target = start() + chrono::Duration::milliseconds(2500);
        assert_eq!(pacer(&clock, &exit).wait_until(target), Pace::Show { late: false });
        assert_eq!(clock.now(), target);
        assert_eq!(clock.sleeps(), 3);
    }

    #[test]
    fn test_past_frame_is_late() {
        let clock = Arc::new(ManualClock::new(start()));
        let exit = ExitFlag::new();
        let pacer = pacer(&clock, &exit);

        assert_eq!(
            pacer.wait_until(start() - chrono::Duration::seconds(1)),
            Pace::Show { late: true }
        );
        assert_eq!(
            pacer.wait_until(start() - chrono::Duration::milliseconds(50)),
            Pace::Show { late: false }
        );
        assert_eq!(clock.sleeps(), 0);
    }

    #[test]
    fn test_exit_interrupts_wait() {
        let clock = Arc::new(ManualClock::new(start()));
        let exit = ExitFlag::new();
        exit.request();

        let target = start() + chrono::Duration::seconds(60);
        assert_eq!(pacer(&clock, &exit).wait_until(target), Pace::Exit);
        assert_eq!(clock.sleeps(), 0);
    }
}
