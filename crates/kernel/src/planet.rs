use geosphere_common::units::WATER_FREEZING_K;
use geosphere_common::{VoxelCoord, unit_from_lat_lon};
use glam::DVec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::PlanetConfig;
use crate::material::MaterialKind;
use crate::plate::{Boundary, Plate};
use crate::shell::Shell;
use crate::voxel::Voxel;

/// Core, mantle, crust and atmosphere.
pub const MIN_SHELLS: usize = 4;
/// Coarsest latitude resolution of any shell.
pub const MIN_BANDS: usize = 2;
/// Crust voxels at or above this melt fraction count as volcanically active.
pub const VOLCANIC_MELT_FRACTION: f64 = 0.1;

/// Errors from planet construction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanetError {
    #[error("shell count {requested} is below the minimum of {minimum}")]
    TooFewShells { requested: usize, minimum: usize },
    #[error("radius must be positive and finite, got {0}")]
    InvalidRadius(f64),
    #[error("surface resolution of {requested} bands is below the minimum of {minimum}")]
    InvalidResolution { requested: usize, minimum: usize },
    #[error("atmosphere thickness must be positive and finite, got {0}")]
    InvalidAtmosphere(f64),
}

/// The shelled voxel planet.
///
/// Shells run from the core (index 0) to a thin atmosphere (last index). The
/// crust lives in the shell just below the atmosphere. Topology is fixed at
/// construction; every field of every voxel may change under physics.
#[derive(Debug)]
pub struct Planet {
    pub(crate) shells: Vec<Shell>,
    radius: f64,
    mass: f64,
    sim_time: f64,
    rotation_rate: f64,
    mesh_dirty: bool,
    cycles: u64,
    plates: Vec<Plate>,
    boundaries: Vec<Boundary>,
    last_identification: Option<f64>,
}

impl Clone for Planet {
    fn clone(&self) -> Self {
        Self {
            shells: self.shells.clone(),
            radius: self.radius,
            mass: self.mass,
            sim_time: self.sim_time,
            rotation_rate: self.rotation_rate,
            mesh_dirty: self.mesh_dirty,
            cycles: self.cycles,
            plates: self.plates.clone(),
            boundaries: self.boundaries.clone(),
            last_identification: self.last_identification,
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.shells.clone_from(&source.shells);
        self.radius = source.radius;
        self.mass = source.mass;
        self.sim_time = source.sim_time;
        self.rotation_rate = source.rotation_rate;
        self.mesh_dirty = source.mesh_dirty;
        self.cycles = source.cycles;
        self.plates.clone_from(&source.plates);
        self.boundaries.clone_from(&source.boundaries);
        self.last_identification = source.last_identification;
    }
}

impl Planet {
    /// Build a planet: quadratic shell spacing (denser near the surface),
    /// latitude resolution scaled with radius, materials seeded by depth and a
    /// synthesized continent pattern at the surface, hydrostatic pressure.
    pub fn new(config: &PlanetConfig) -> Result<Self, PlanetError> {
        if config.shells < MIN_SHELLS {
            return Err(PlanetError::TooFewShells {
                requested: config.shells,
                minimum: MIN_SHELLS,
            });
        }
        if !(config.radius_m.is_finite() && config.radius_m > 0.0) {
            return Err(PlanetError::InvalidRadius(config.radius_m));
        }
        if config.surface_bands < MIN_BANDS {
            return Err(PlanetError::InvalidResolution {
                requested: config.surface_bands,
                minimum: MIN_BANDS,
            });
        }
        if !(config.atmosphere_thickness_m.is_finite() && config.atmosphere_thickness_m > 0.0) {
            return Err(PlanetError::InvalidAtmosphere(config.atmosphere_thickness_m));
        }

        let radius = config.radius_m;
        let solid = config.shells - 1;
        let spacing = |t: f64| radius * (1.0 - (1.0 - t) * (1.0 - t));
        let mut shells = Vec::with_capacity(config.shells);
        for k in 0..solid {
            let inner = spacing(k as f64 / solid as f64);
            let outer = spacing((k + 1) as f64 / solid as f64);
            let bands = ((config.surface_bands as f64 * outer / radius).round() as usize)
                .clamp(MIN_BANDS, config.surface_bands);
            shells.push(Shell::new(inner, outer, bands));
        }
        shells.push(Shell::new(
            radius,
            radius + config.atmosphere_thickness_m,
            config.surface_bands,
        ));

        let mut planet = Self {
            shells,
            radius,
            mass: 0.0,
            sim_time: 0.0,
            rotation_rate: config.rotation_rate_rad_s,
            mesh_dirty: true,
            cycles: 0,
            plates: Vec::new(),
            boundaries: Vec::new(),
            last_identification: None,
        };
        planet.seed_materials(config);
        planet.mass = planet.compute_mass();
        let all = 0..planet.shell_count();
        crate::physics::accumulate_pressure(&mut planet, all);

        tracing::info!(
            shells = planet.shell_count(),
            voxels = planet.voxel_count(),
            mass = planet.mass,
            "planet constructed"
        );
        Ok(planet)
    }

    /// Build with default settings for everything but radius and shell count.
    pub fn with_shells(radius_m: f64, shells: usize) -> Result<Self, PlanetError> {
        Self::new(&PlanetConfig {
            radius_m,
            shells,
            ..PlanetConfig::default()
        })
    }

    fn seed_materials(&mut self, config: &PlanetConfig) {
        let crust = self.crust_shell();
        let atmosphere = self.atmosphere_shell();
        let pattern = ContinentPattern::new(config.seed);
        let surface_t = config.surface_temperature_k;
        let core_t = config.core_temperature_k;
        let radius = self.radius;

        for (s, shell) in self.shells.iter_mut().enumerate() {
            let depth = (1.0 - shell.mid_radius() / radius).clamp(0.0, 1.0);
            let interior_t = surface_t + (core_t - surface_t) * depth;
            for lat in 0..shell.bands() {
                let lat_deg = shell.lat_center_deg(lat);
                for lon in 0..shell.lon_count(lat) {
                    let lon_deg = shell.lon_center_deg(lat, lon);
                    let land = pattern.value(lat_deg, lon_deg) - config.continent_threshold;
                    let voxel = if s == atmosphere {
                        let sin_lat = lat_deg.to_radians().sin();
                        let t = surface_t + 12.0 - 50.0 * sin_lat * sin_lat;
                        let kind = if land > 0.0 {
                            MaterialKind::Air
                        } else if t < WATER_FREEZING_K {
                            MaterialKind::Ice
                        } else {
                            MaterialKind::Water
                        };
                        let mut v = Voxel::new(kind);
                        v.temperature = t;
                        v
                    } else if s == crust {
                        let mut v = if land > 0.0 {
                            let mut v = Voxel::new(MaterialKind::Granite);
                            v.elevation = 800.0 + 1500.0 * land.min(1.0);
                            v.age = 1.0e9 * (0.5 + 0.5 * land.min(1.0));
                            v
                        } else {
                            let mut v = Voxel::new(MaterialKind::Basalt);
                            v.elevation = -4000.0;
                            v.age = 1.8e8 * pattern.ocean_age(lat_deg, lon_deg);
                            v
                        };
                        v.temperature = interior_t;
                        v
                    } else {
                        let mut v = Voxel::new(MaterialKind::Peridotite);
                        v.temperature = interior_t;
                        v.age = 4.0e9;
                        v
                    };
                    shell.voxels[lat][lon] = voxel;
                }
            }
        }
    }

    fn compute_mass(&self) -> f64 {
        self.shells
            .iter()
            .map(|shell| {
                shell
                    .iter()
                    .map(|(lat, _, v)| v.density() * shell.voxel_volume(lat))
                    .sum::<f64>()
            })
            .sum()
    }

    pub fn shells(&self) -> &[Shell] {
        &self.shells
    }

    pub fn shell(&self, index: usize) -> Option<&Shell> {
        self.shells.get(index)
    }

    pub fn shell_count(&self) -> usize {
        self.shells.len()
    }

    pub fn voxel_count(&self) -> usize {
        self.shells.iter().map(Shell::voxel_count).sum()
    }

    /// Outermost shell.
    pub fn atmosphere_shell(&self) -> usize {
        self.shells.len() - 1
    }

    /// Shell holding the crust and plate membership.
    pub fn crust_shell(&self) -> usize {
        self.shells.len() - 2
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Simulated years elapsed.
    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    pub fn rotation_rate(&self) -> f64 {
        self.rotation_rate
    }

    /// Completed physics cycles.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Record a finished physics cycle of `dt` years.
    pub fn complete_cycle(&mut self, dt: f64) {
        self.sim_time += dt;
        self.cycles += 1;
        self.mesh_dirty = true;
    }

    pub fn is_mesh_dirty(&self) -> bool {
        self.mesh_dirty
    }

    pub fn clear_mesh_dirty(&mut self) {
        self.mesh_dirty = false;
    }

    pub fn plates(&self) -> &[Plate] {
        &self.plates
    }

    pub fn plates_mut(&mut self) -> &mut [Plate] {
        &mut self.plates
    }

    pub fn set_plates(&mut self, plates: Vec<Plate>) {
        self.plates = plates;
    }

    pub fn plate(&self, id: u16) -> Option<&Plate> {
        self.plates.iter().find(|p| p.id == id)
    }

    pub fn boundaries(&self) -> &[Boundary] {
        &self.boundaries
    }

    pub fn set_boundaries(&mut self, boundaries: Vec<Boundary>) {
        self.boundaries = boundaries;
    }

    /// Simulated time of the last plate identification.
    pub fn last_identification(&self) -> Option<f64> {
        self.last_identification
    }

    pub fn set_last_identification(&mut self, time: f64) {
        self.last_identification = Some(time);
    }

    /// Voxel lookup with longitude wraparound and latitude clamping.
    /// Returns `None` for an out-of-range shell.
    pub fn voxel(&self, shell: usize, lat: isize, lon: isize) -> Option<&Voxel> {
        let s = self.shells.get(shell)?;
        let (lat, lon) = wrap_index(s, lat, lon);
        s.get(lat, lon)
    }

    pub fn voxel_mut(&mut self, shell: usize, lat: isize, lon: isize) -> Option<&mut Voxel> {
        let s = self.shells.get_mut(shell)?;
        let (lat, lon) = wrap_index(s, lat, lon);
        s.get_mut(lat, lon)
    }

    /// Strict lookup: every index must be in range.
    pub fn voxel_at(&self, c: VoxelCoord) -> Option<&Voxel> {
        self.shells.get(c.shell)?.get(c.lat, c.lon)
    }

    pub fn voxel_at_mut(&mut self, c: VoxelCoord) -> Option<&mut Voxel> {
        self.shells.get_mut(c.shell)?.get_mut(c.lat, c.lon)
    }

    /// Coordinate of the voxel containing a latitude/longitude on a shell.
    pub fn coord_for(&self, shell: usize, lat_deg: f64, lon_deg: f64) -> Option<VoxelCoord> {
        let s = self.shells.get(shell)?;
        let lat = s.band_for_lat(lat_deg);
        Some(VoxelCoord::new(shell, lat, s.lon_for(lat, lon_deg)))
    }

    /// First non-air voxel scanning from the outermost shell inward, with its shell index.
    pub fn surface_voxel(&self, lat_deg: f64, lon_deg: f64) -> Option<(usize, &Voxel)> {
        (0..self.shells.len()).rev().find_map(|s| {
            let c = self.coord_for(s, lat_deg, lon_deg)?;
            let v = self.voxel_at(c)?;
            (!v.is_air()).then_some((s, v))
        })
    }

    /// Latitude/longitude (degrees) of a voxel's center.
    pub fn lat_lon(&self, c: VoxelCoord) -> Option<(f64, f64)> {
        let s = self.shells.get(c.shell)?;
        Some((s.lat_center_deg(c.lat), s.lon_center_deg(c.lat, c.lon)))
    }

    pub fn unit_vector(&self, c: VoxelCoord) -> Option<DVec3> {
        self.lat_lon(c)
            .map(|(lat, lon)| unit_from_lat_lon(lat, lon))
    }

    /// Cartesian position of a voxel's center at its shell's mid radius (m).
    pub fn position(&self, c: VoxelCoord) -> Option<DVec3> {
        let mid = self.shells.get(c.shell)?.mid_radius();
        self.unit_vector(c).map(|u| u * mid)
    }

    /// Same latitude/longitude on another shell.
    pub fn map_to_shell(&self, c: VoxelCoord, target: usize) -> Option<VoxelCoord> {
        let (lat_deg, lon_deg) = self.lat_lon(c)?;
        self.coord_for(target, lat_deg, lon_deg)
    }

    /// East, west, north and south neighbors on the same shell.
    pub fn lateral_neighbors(&self, c: VoxelCoord) -> [Option<VoxelCoord>; 4] {
        match self.shells.get(c.shell) {
            Some(s) => s
                .lateral_neighbors(c.lat, c.lon)
                .map(|n| n.map(|(lat, lon)| VoxelCoord::new(c.shell, lat, lon))),
            None => [None; 4],
        }
    }

    /// Inner and outer radial neighbors.
    pub fn radial_neighbors(&self, c: VoxelCoord) -> [Option<VoxelCoord>; 2] {
        let inner = c
            .shell
            .checked_sub(1)
            .and_then(|s| self.map_to_shell(c, s));
        let outer = self.map_to_shell(c, c.shell + 1);
        [inner, outer]
    }

    /// Area of a voxel's outer face (m²).
    pub fn voxel_area(&self, c: VoxelCoord) -> f64 {
        self.shells
            .get(c.shell)
            .map(|s| s.voxel_area(c.lat))
            .unwrap_or(0.0)
    }

    /// Mean temperature of each shell, innermost first.
    pub fn average_temperature_by_shell(&self) -> Vec<f64> {
        self.shells
            .iter()
            .map(|s| {
                let n = s.voxel_count().max(1);
                s.iter().map(|(_, _, v)| v.temperature).sum::<f64>() / n as f64
            })
            .collect()
    }

    /// Crust voxels that are molten or partially molten.
    pub fn volcanism_count(&self) -> usize {
        self.shells[self.crust_shell()]
            .iter()
            .filter(|(_, _, v)| {
                v.material() == MaterialKind::Magma || v.melt_fraction >= VOLCANIC_MELT_FRACTION
            })
            .count()
    }

    /// Plate owning the crust at a latitude/longitude.
    pub fn plate_at(&self, lat_deg: f64, lon_deg: f64) -> Option<&Plate> {
        let c = self.coord_for(self.crust_shell(), lat_deg, lon_deg)?;
        let id = self.voxel_at(c)?.plate_id;
        if id == 0 {
            return None;
        }
        self.plate(id)
    }

    /// Shell invariants hold and radii increase outward.
    pub fn check_invariants(&self) -> bool {
        self.shells.iter().all(Shell::check_invariants)
            && self
                .shells
                .windows(2)
                .all(|w| w[0].outer_radius() <= w[1].inner_radius() + 1e-6)
    }

    /// FNV-1a hash over time and voxel state, for comparing snapshots.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325;
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        mix(&mut h, &self.sim_time.to_le_bytes());
        mix(&mut h, &self.cycles.to_le_bytes());
        for shell in &self.shells {
            for (_, _, v) in shell.iter() {
                mix(&mut h, &[v.material() as u8]);
                mix(&mut h, &v.temperature.to_le_bytes());
                mix(&mut h, &v.pressure.to_le_bytes());
                mix(&mut h, &v.age.to_le_bytes());
                mix(&mut h, &v.elevation.to_le_bytes());
                mix(&mut h, &v.plate_id.to_le_bytes());
            }
        }
        h
    }
}

fn wrap_index(shell: &Shell, lat: isize, lon: isize) -> (usize, usize) {
    let bands = shell.bands() as isize;
    let lat = lat.clamp(0, bands - 1) as usize;
    let count = shell.lon_count(lat).max(1) as isize;
    (lat, lon.rem_euclid(count) as usize)
}

/// Keeps continent phases independent of other streams seeded from the same value.
const CONTINENT_SEED_NAMESPACE: u64 = 0x636f_6e74_696e_65;

/// Deterministic low-frequency field used to lay out continents.
struct ContinentPattern {
    phases: [f64; 6],
}

impl ContinentPattern {
    fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed ^ CONTINENT_SEED_NAMESPACE);
        let phases = std::array::from_fn(|_| rng.random_range(0.0..std::f64::consts::TAU));
        Self { phases }
    }

    /// Roughly in `[-1, 1]`.
    fn value(&self, lat_deg: f64, lon_deg: f64) -> f64 {
        let phi = lat_deg.to_radians();
        let lam = lon_deg.to_radians();
        let p = &self.phases;
        0.55 * (lam + p[0]).sin() * phi.cos()
            + 0.3 * (2.0 * lam + p[1]).sin() * (2.0 * phi + p[2]).cos()
            + 0.15 * (3.0 * lam + p[3]).cos() * (3.0 * phi).cos()
    }

    /// Normalized seafloor age in `[0, 1]`.
    fn ocean_age(&self, lat_deg: f64, lon_deg: f64) -> f64 {
        let lam = lon_deg.to_radians();
        let phi = lat_deg.to_radians();
        0.5 + 0.5 * (2.0 * lam + self.phases[4]).sin() * (phi + self.phases[5]).cos()
    }
}
