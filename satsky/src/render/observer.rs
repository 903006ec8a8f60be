//! Observer site geometry: WGS-84 position and topocentric look angles.

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

/// WGS-84 equatorial radius in kilometres.
pub const WGS84_A_KM: f64 = 6378.137;

/// WGS-84 flattening.
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;

/// A fixed ground site in geodetic coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observer {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    /// Height above the ellipsoid in metres.
    pub altitude_m: f64,
}

impl Default for Observer {
    /// Royal Observatory, Greenwich.
    fn default() -> Self {
        Self {
            latitude_deg: 51.4779,
            longitude_deg: -0.0015,
            altitude_m: 45.0,
        }
    }
}

impl Observer {
    pub fn new(latitude_deg: f64, longitude_deg: f64, altitude_m: f64) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
            altitude_m,
        }
    }

    /// Earth-fixed position in kilometres.
    pub fn ecef_km(&self) -> Vector3<f64> {
        let lat = self.latitude_deg.to_radians();
        let lon = self.longitude_deg.to_radians();
        let height_km = self.altitude_m / 1000.0;

        let e2 = WGS84_F * (2.0 - WGS84_F);
        let prime_vertical = WGS84_A_KM / (1.0 - e2 * lat.sin().powi(2)).sqrt();

        Vector3::new(
            (prime_vertical + height_km) * lat.cos() * lon.cos(),
            (prime_vertical + height_km) * lat.cos() * lon.sin(),
            (prime_vertical * (1.0 - e2) + height_km) * lat.sin(),
        )
    }

    /// Rotation from Earth-fixed axes to local East-North-Up axes.
    pub fn enu_rotation(&self) -> Matrix3<f64> {
        let (sin_lat, cos_lat) = self.latitude_deg.to_radians().sin_cos();
        let (sin_lon, cos_lon) = self.longitude_deg.to_radians().sin_cos();

        Matrix3::new(
            -sin_lon,
            cos_lon,
            0.0,
            -sin_lat * cos_lon,
            -sin_lat * sin_lon,
            cos_lat,
            cos_lat * cos_lon,
            cos_lat * sin_lon,
            sin_lat,
        )
    }
}

/// Direction and distance of an object as seen from the site.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookAngles {
    /// Degrees clockwise from north, in `[0, 360)`.
    pub azimuth_deg: f64,
    /// Degrees above the horizon.
    pub elevation_deg: f64,
    pub range_km: f64,
}

/// Precomputed site position and local axes, shared by every render worker.
#[derive(Debug, Clone)]
pub struct ObserverFrame {
    site_ecef: Vector3<f64>,
    enu: Matrix3<f64>,
}

impl ObserverFrame {
    pub fn new(observer: &Observer) -> Self {
        Self {
            site_ecef: observer.ecef_km(),
            enu: observer.enu_rotation(),
        }
    }

    /// Look angles of a TEME position at the given sidereal angle (radians).
    ///
    /// The TEME to Earth-fixed step is a rotation by GMST about the pole;
    /// polar motion is ignored.
    pub fn look_angles(&self, teme_km: &[f64; 3], gmst: f64) -> LookAngles {
        let (sin_g, cos_g) = gmst.sin_cos();
        let earth_fixed = Vector3::new(
            cos_g * teme_km[0] + sin_g * teme_km[1],
            -sin_g * teme_km[0] + cos_g * teme_km[1],
            teme_km[2],
        );

        let local = self.enu * (earth_fixed - self.site_ecef);
        let range_km = local.norm();
        let elevation_deg = (local.z / range_km).asin().to_degrees();
        let azimuth_deg = local.x.atan2(local.y).to_degrees().rem_euclid(360.0);

        LookAngles {
            azimuth_deg,
            elevation_deg,
            range_km,
        }
    }
}
