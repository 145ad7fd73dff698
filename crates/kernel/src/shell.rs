use std::f64::consts::PI;

use crate::voxel::Voxel;

/// One radial layer of the planet.
///
/// Latitude band 0 is the southernmost. Longitude resolution per band shrinks
/// with `cos(latitude)` so voxel areas stay roughly equal.
#[derive(Debug)]
pub struct Shell {
    inner_radius: f64,
    outer_radius: f64,
    lon_counts: Vec<usize>,
    pub(crate) voxels: Vec<Vec<Voxel>>,
}

impl Clone for Shell {
    fn clone(&self) -> Self {
        Self {
            inner_radius: self.inner_radius,
            outer_radius: self.outer_radius,
            lon_counts: self.lon_counts.clone(),
            voxels: self.voxels.clone(),
        }
    }

    // Reuses the band allocations when topology matches, which is always the
    // case between the engine's two buffers.
    fn clone_from(&mut self, source: &Self) {
        self.inner_radius = source.inner_radius;
        self.outer_radius = source.outer_radius;
        self.lon_counts.clone_from(&source.lon_counts);
        self.voxels.clone_from(&source.voxels);
    }
}

impl Shell {
    /// Build a shell of air voxels with `bands` latitude bands.
    pub fn new(inner_radius: f64, outer_radius: f64, bands: usize) -> Self {
        let bands = bands.max(1);
        let lon_counts: Vec<usize> = (0..bands)
            .map(|lat| {
                let center = band_center_rad(lat, bands);
                ((2.0 * bands as f64 * center.cos()).round() as usize).max(1)
            })
            .collect();
        let voxels = lon_counts
            .iter()
            .map(|&n| vec![Voxel::default(); n])
            .collect();
        Self {
            inner_radius,
            outer_radius,
            lon_counts,
            voxels,
        }
    }

    pub fn inner_radius(&self) -> f64 {
        self.inner_radius
    }

    pub fn outer_radius(&self) -> f64 {
        self.outer_radius
    }

    pub fn thickness(&self) -> f64 {
        self.outer_radius - self.inner_radius
    }

    pub fn mid_radius(&self) -> f64 {
        0.5 * (self.inner_radius + self.outer_radius)
    }

    pub fn bands(&self) -> usize {
        self.lon_counts.len()
    }

    pub fn lon_counts(&self) -> &[usize] {
        &self.lon_counts
    }

    pub fn lon_count(&self, lat: usize) -> usize {
        self.lon_counts.get(lat).copied().unwrap_or(0)
    }

    pub fn voxel_count(&self) -> usize {
        self.lon_counts.iter().sum()
    }

    pub fn band(&self, lat: usize) -> Option<&[Voxel]> {
        self.voxels.get(lat).map(Vec::as_slice)
    }

    pub fn get(&self, lat: usize, lon: usize) -> Option<&Voxel> {
        self.voxels.get(lat).and_then(|band| band.get(lon))
    }

    pub fn get_mut(&mut self, lat: usize, lon: usize) -> Option<&mut Voxel> {
        self.voxels.get_mut(lat).and_then(|band| band.get_mut(lon))
    }

    /// Iterate `(lat, lon, voxel)` over the whole shell.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &Voxel)> {
        self.voxels
            .iter()
            .enumerate()
            .flat_map(|(lat, band)| band.iter().enumerate().map(move |(lon, v)| (lat, lon, v)))
    }

    /// Latitude of a band's center in degrees.
    pub fn lat_center_deg(&self, lat: usize) -> f64 {
        band_center_rad(lat, self.bands()).to_degrees()
    }

    /// Longitude of a voxel's center in degrees, in `[0, 360)`.
    pub fn lon_center_deg(&self, lat: usize, lon: usize) -> f64 {
        let n = self.lon_count(lat).max(1);
        (lon as f64 + 0.5) * 360.0 / n as f64
    }

    /// Band containing a latitude (degrees); out-of-range latitudes clamp.
    pub fn band_for_lat(&self, lat_deg: f64) -> usize {
        let bands = self.bands();
        let t = (lat_deg.clamp(-90.0, 90.0) + 90.0) / 180.0;
        ((t * bands as f64).floor() as usize).min(bands - 1)
    }

    /// Longitude index containing a longitude (degrees) within a band.
    pub fn lon_for(&self, lat: usize, lon_deg: f64) -> usize {
        let n = self.lon_count(lat).max(1);
        let t = lon_deg.rem_euclid(360.0) / 360.0;
        ((t * n as f64).floor() as usize).min(n - 1)
    }

    /// Latitudinal height of one band at the mid radius (m).
    pub fn band_height(&self) -> f64 {
        self.mid_radius() * PI / self.bands() as f64
    }

    /// East-west width of one voxel in a band at the mid radius (m).
    pub fn cell_width(&self, lat: usize) -> f64 {
        let n = self.lon_count(lat).max(1);
        let circumference = 2.0 * PI * self.mid_radius() * band_center_rad(lat, self.bands()).cos();
        (circumference / n as f64).max(1.0)
    }

    /// Fraction of the sphere covered by a single voxel of band `lat`.
    pub fn voxel_solid_fraction(&self, lat: usize) -> f64 {
        let bands = self.bands() as f64;
        let lo = -PI / 2.0 + PI * lat as f64 / bands;
        let hi = lo + PI / bands;
        let band_fraction = 0.5 * (hi.sin() - lo.sin());
        band_fraction / self.lon_count(lat).max(1) as f64
    }

    pub fn voxel_volume(&self, lat: usize) -> f64 {
        let shell_volume =
            4.0 / 3.0 * PI * (self.outer_radius.powi(3) - self.inner_radius.powi(3));
        shell_volume * self.voxel_solid_fraction(lat)
    }

    /// Area of a voxel's outer face (m²).
    pub fn voxel_area(&self, lat: usize) -> f64 {
        4.0 * PI * self.outer_radius * self.outer_radius * self.voxel_solid_fraction(lat)
    }

    /// Index in band `to_lat` closest to `lon` of band `from_lat`.
    pub fn map_lon(&self, from_lat: usize, lon: usize, to_lat: usize) -> usize {
        let from = self.lon_count(from_lat).max(1);
        let to = self.lon_count(to_lat).max(1);
        (((lon as f64 + 0.5) * to as f64 / from as f64).floor() as usize).min(to - 1)
    }

    /// Four lateral neighbors of a voxel: east, west, north, south.
    /// East/west wrap around; north/south are `None` past the poles.
    pub fn lateral_neighbors(&self, lat: usize, lon: usize) -> [Option<(usize, usize)>; 4] {
        let n = self.lon_count(lat).max(1);
        let east = Some((lat, (lon + 1) % n));
        let west = Some((lat, (lon + n - 1) % n));
        let north = (lat + 1 < self.bands()).then(|| (lat + 1, self.map_lon(lat, lon, lat + 1)));
        let south = lat
            .checked_sub(1)
            .map(|below| (below, self.map_lon(lat, lon, below)));
        [east, west, north, south]
    }

    /// `voxels[lat].len() == lon_counts[lat]` for every band and `inner < outer`.
    pub fn check_invariants(&self) -> bool {
        self.inner_radius < self.outer_radius
            && self.voxels.len() == self.lon_counts.len()
            && self
                .voxels
                .iter()
                .zip(&self.lon_counts)
                .all(|(band, &n)| band.len() == n)
    }
}

fn band_center_rad(lat: usize, bands: usize) -> f64 {
    -PI / 2.0 + PI * (lat as f64 + 0.5) / bands.max(1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lon_counts_shrink_toward_poles() {
        let s = Shell::new(0.0, 1.0, 18);
        let eq = s.lon_count(9);
        assert!(s.lon_count(0) < eq);
        assert!(s.lon_count(17) < eq);
        assert_eq!(s.lon_count(0), s.lon_count(17));
        assert!(s.check_invariants());
    }

    #[test]
    fn voxel_fractions_cover_sphere() {
        let s = Shell::new(1.0, 2.0, 12);
        let total: f64 = (0..s.bands())
            .map(|lat| s.voxel_solid_fraction(lat) * s.lon_count(lat) as f64)
            .sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn band_lookup_clamps() {
        let s = Shell::new(0.0, 1.0, 10);
        assert_eq!(s.band_for_lat(-120.0), 0);
        assert_eq!(s.band_for_lat(90.0), 9);
        assert_eq!(s.band_for_lat(0.1), 5);
    }

    #[test]
    fn lateral_neighbors_wrap_and_stop_at_poles() {
        let s = Shell::new(0.0, 1.0, 6);
        let n = s.lon_count(0);
        let [east, west, north, south] = s.lateral_neighbors(0, n - 1);
        assert_eq!(east, Some((0, 0)));
        assert_eq!(west, Some((0, n - 2)));
        assert!(north.is_some());
        assert!(south.is_none());
        let [_, _, top, _] = s.lateral_neighbors(5, 0);
        assert!(top.is_none());
    }

    #[test]
    fn clone_from_copies_state() {
        let mut a = Shell::new(0.0, 1.0, 4);
        let mut b = a.clone();
        a.get_mut(1, 1).unwrap().temperature = 500.0;
        b.clone_from(&a);
        assert_eq!(b.get(1, 1).unwrap().temperature, 500.0);
    }
}
