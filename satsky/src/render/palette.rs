//! Marker colours by orbit regime.

use image::Rgba;

use crate::elements::OrbitRegime;

pub fn regime_color(regime: OrbitRegime) -> Rgba<u8> {
    match regime {
        OrbitRegime::Low => Rgba([0x4f, 0xc3, 0xf7, 0xff]),
        OrbitRegime::Medium => Rgba([0x81, 0xc7, 0x84, 0xff]),
        OrbitRegime::Geosynchronous => Rgba([0xff, 0xb7, 0x4d, 0xff]),
        OrbitRegime::HighlyElliptical => Rgba([0xe5, 0x73, 0x73, 0xff]),
    }
}

/// Colour for objects without metadata.
pub const UNKNOWN_COLOR: Rgba<u8> = Rgba([0xff, 0xff, 0xff, 0xff]);
