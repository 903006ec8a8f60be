//! Click resolution and frame-to-frame object tracking.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::search::{find_nearest, PixelMatch};
use crate::render::IndexBuffer;

/// Default search radius in pixels.
pub const DEFAULT_PICK_RADIUS: u32 = 10;

/// A pick request against one frame's index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickQuery {
    pub row: i64,
    pub col: i64,
    /// Index buffer value of a tracked object; `None` matches any object.
    pub tracked: Option<u32>,
}

/// Outcome of a [`PickQuery`].
///
/// When `found` is false, `row` and `col` echo the query position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickResult {
    pub found: bool,
    pub row: i64,
    pub col: i64,
}

impl PickQuery {
    pub fn click(row: i64, col: i64) -> Self {
        Self {
            row,
            col,
            tracked: None,
        }
    }

    pub fn tracking(row: i64, col: i64, value: u32) -> Self {
        Self {
            row,
            col,
            tracked: Some(value),
        }
    }

    /// Runs the query with the given search radius.
    pub fn resolve(&self, index: &IndexBuffer, max_radius: u32) -> PickResult {
        let predicate = match self.tracked {
            Some(value) => PixelMatch::Equals(value),
            None => PixelMatch::Nonzero,
        };
        match find_nearest(index, self.row, self.col, max_radius, predicate) {
            Some((row, col)) => PickResult {
                found: true,
                row,
                col,
            },
            None => PickResult {
                found: false,
                row: self.row,
                col: self.col,
            },
        }
    }
}

/// The object currently under track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Track {
    /// Index buffer value (object index + 1).
    pub value: u32,
    pub row: i64,
    pub col: i64,
}

/// Keeps one object selected across frames.
///
/// A click selects the nearest object. Each new frame then searches for the
/// same object around its last known position; if it is gone the track is
/// dropped.
#[derive(Debug, Clone)]
pub struct ObjectTracker {
    radius: u32,
    current: Option<Track>,
}

impl Default for ObjectTracker {
    fn default() -> Self {
        Self::new(DEFAULT_PICK_RADIUS)
    }
}

impl ObjectTracker {
    pub fn new(radius: u32) -> Self {
        Self {
            radius,
            current: None,
        }
    }

    pub fn current(&self) -> Option<Track> {
        self.current
    }

    /// Selects the object nearest to a click, replacing any current track.
    pub fn select(&mut self, index: &IndexBuffer, row: i64, col: i64) -> Option<Track> {
        let result = PickQuery::click(row, col).resolve(index, self.radius);
        self.current = result
            .found
            .then(|| index.get(result.row, result.col))
            .flatten()
            .map(|value| Track {
                value,
                row: result.row,
                col: result.col,
            });
        debug!(row, col, track = ?self.current, "Pick");
        self.current
    }

    /// Re-acquires the tracked object in a new frame.
    pub fn update(&mut self, index: &IndexBuffer) -> Option<Track> {
        let track = self.current?;
        let result = PickQuery::tracking(track.row, track.col, track.value).resolve(index, self.radius);
        if result.found {
            self.current = Some(Track {
                row: result.row,
                col: result.col,
                ..track
            });
        } else {
            debug!(value = track.value, "Lost track");
            self.current = None;
        }
        self.current
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Pixel;

    fn buffer_with(pixels: &[(u32, u32, u32)]) -> IndexBuffer {
        let mut buffer = IndexBuffer::new(32);
        for &(row, col, value) in pixels {
            buffer.set(Pixel { row, col }, value);
        }
        buffer
    }

    #[test]
    fn test_pick_query_found() {
        let buffer = buffer_with(&[(5, 5, 3)]);
        let result = PickQuery::click(5, 8).resolve(&buffer, 4);
        assert_eq!(
            result,
            PickResult {
                found: true,
                row: 5,
                col: 5
            }
        );
    }

    #[test]
    fn test_pick_query_not_found_echoes_position() {
        let buffer = buffer_with(&[(5, 5, 3)]);
        let result = PickQuery::tracking(5, 8, 4).resolve(&buffer, 4);
        assert_eq!(
            result,
            PickResult {
                found: false,
                row: 5,
                col: 8
            }
        );
    }

    #[test]
    fn test_tracker_follows_moving_object() {
        let mut tracker = ObjectTracker::new(4);
        let first = buffer_with(&[(10, 10, 7), (10, 14, 2)]);
        let track = tracker.select(&first, 10, 11).unwrap();
        assert_eq!(track.value, 7);

        // Object 2 is now closer to the old position but is not the tracked one
        let second = buffer_with(&[(10, 11, 2), (11, 13, 7)]);
        let track = tracker.update(&second).unwrap();
        assert_eq!((track.value, track.row, track.col), (7, 11, 13));
    }

    #[test]
    fn test_tracker_loses_object() {
        let mut tracker = ObjectTracker::new(2);
        tracker.select(&buffer_with(&[(10, 10, 7)]), 10, 10);

        assert!(tracker.update(&buffer_with(&[(20, 20, 7)])).is_none());
        assert!(tracker.current().is_none());
        assert!(tracker.update(&buffer_with(&[(10, 10, 7)])).is_none());
    }

    #[test]
    fn test_click_on_empty_sky_clears_track() {
        let mut tracker = ObjectTracker::new(2);
        tracker.select(&buffer_with(&[(10, 10, 7)]), 10, 10);
        assert!(tracker.select(&IndexBuffer::new(32), 10, 10).is_none());
        assert!(tracker.current().is_none());
    }
}
