//! All-sky azimuthal equidistant projection.

use super::observer::LookAngles;

/// A pixel position, row-major from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pixel {
    pub row: u32,
    pub col: u32,
}

/// Maps look angles onto a square image of the whole visible sky.
///
/// Zenith sits at the image centre and `min_elevation_deg` on the inscribed
/// circle. Distance from the centre is linear in zenith angle. North is up
/// and east is left, as seen lying on the ground looking up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyProjection {
    size: u32,
    min_elevation_deg: f64,
    centre: f64,
    radius: f64,
}

impl SkyProjection {
    /// `min_elevation_deg` must be below 90.
    pub fn new(size: u32, min_elevation_deg: f64) -> Self {
        // Pixel centres run from 0 to size - 1
        let half = f64::from(size.saturating_sub(1)) / 2.0;
        Self {
            size,
            min_elevation_deg,
            centre: half,
            radius: half,
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn min_elevation_deg(&self) -> f64 {
        self.min_elevation_deg
    }

    /// Pixel for the given look angles, or `None` outside the visible disc.
    pub fn project(&self, look: &LookAngles) -> Option<Pixel> {
        if !(look.elevation_deg >= self.min_elevation_deg) {
            return None;
        }

        let distance =
            self.radius * (90.0 - look.elevation_deg) / (90.0 - self.min_elevation_deg);
        let (sin_az, cos_az) = look.azimuth_deg.to_radians().sin_cos();
        let col = (self.centre - distance * sin_az).round();
        let row = (self.centre - distance * cos_az).round();

        let limit = f64::from(self.size);
        if row < 0.0 || col < 0.0 || row >= limit || col >= limit {
            return None;
        }
        Some(Pixel {
            row: row as u32,
            col: col as u32,
        })
    }
}
