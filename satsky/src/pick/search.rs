//! Ring-by-ring nearest active pixel search.

use crate::render::IndexBuffer;

/// Which index buffer values count as a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelMatch {
    /// Any object.
    Nonzero,
    /// One specific index buffer value.
    Equals(u32),
}

impl PixelMatch {
    pub fn matches(self, value: u32) -> bool {
        match self {
            PixelMatch::Nonzero => value != 0,
            PixelMatch::Equals(expected) => value == expected,
        }
    }
}

/// Finds the nearest pixel whose value satisfies `predicate`.
///
/// The start pixel is tested first. Then square rings of Chebyshev radius
/// 1 to `max_radius` are scanned: for each ring row from top to bottom the
/// left column then the right column, followed by the top and bottom rows
/// from left to right without their corners. Pixels outside the buffer are
/// skipped. The first hit at the smallest radius is returned as
/// `(row, col)`.
pub fn find_nearest(
    index: &IndexBuffer,
    row: i64,
    col: i64,
    max_radius: u32,
    predicate: PixelMatch,
) -> Option<(i64, i64)> {
    let hit = |r: i64, c: i64| index.get(r, c).is_some_and(|value| predicate.matches(value));

    if hit(row, col) {
        return Some((row, col));
    }

    for radius in 1..=i64::from(max_radius) {
        let (top, bottom) = (row - radius, row + radius);
        let (left, right) = (col - radius, col + radius);

        for r in top..=bottom {
            if hit(r, left) {
                return Some((r, left));
            }
            if hit(r, right) {
                return Some((r, right));
            }
        }
        for c in left + 1..right {
            if hit(top, c) {
                return Some((top, c));
            }
            if hit(bottom, c) {
                return Some((bottom, c));
            }
        }
    }
    None
}
