//! Spherical geometry on the unit sphere.

use glam::DVec3;

/// Unit vector for a latitude/longitude pair given in degrees.
pub fn unit_from_lat_lon(lat_deg: f64, lon_deg: f64) -> DVec3 {
    let lat = lat_deg.to_radians();
    let lon = lon_deg.to_radians();
    DVec3::new(lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin())
}

/// Latitude/longitude in degrees of a (not necessarily unit) vector.
/// Longitude is normalized into `[0, 360)`.
pub fn lat_lon_from_unit(v: DVec3) -> (f64, f64) {
    let n = v.normalize_or_zero();
    let lat = n.z.clamp(-1.0, 1.0).asin().to_degrees();
    let lon = n.y.atan2(n.x).to_degrees().rem_euclid(360.0);
    (lat, lon)
}

/// Local east/north/up basis at a point on the sphere.
#[derive(Debug, Clone, Copy)]
pub struct LocalFrame {
    pub east: DVec3,
    pub north: DVec3,
    pub up: DVec3,
}

impl LocalFrame {
    /// Build the frame at `up` (any non-zero vector). At the poles east is
    /// taken along +Y so the frame stays orthonormal.
    pub fn at(up: DVec3) -> Self {
        let up = up.normalize_or_zero();
        let mut east = DVec3::Z.cross(up);
        if east.length_squared() < 1e-24 {
            east = DVec3::Y;
        }
        let east = east.normalize();
        let north = up.cross(east).normalize_or_zero();
        Self { east, north, up }
    }

    /// Split a Cartesian vector into (radial, north, east) components.
    pub fn decompose(&self, v: DVec3) -> (f64, f64, f64) {
        (v.dot(self.up), v.dot(self.north), v.dot(self.east))
    }

    /// Drop the radial component of `v`.
    pub fn tangential(&self, v: DVec3) -> DVec3 {
        v - self.up * v.dot(self.up)
    }
}
