use std::fmt;

use geosphere_kernel::{BoundaryKind, MaterialKind, Planet, PlateKind};
use serde::Serialize;

/// Planet inspector for developer tooling.
///
/// Read-only queries against a planet snapshot, shaped for the CLI and
/// debugging output.
pub struct PlanetInspector;

impl PlanetInspector {
    /// Produce a summary of the planet state.
    pub fn summary(planet: &Planet) -> PlanetSummary {
        let temperatures = planet.average_temperature_by_shell();
        PlanetSummary {
            time_years: planet.sim_time(),
            cycles: planet.cycles(),
            radius_m: planet.radius(),
            mass_kg: planet.mass(),
            shells: planet.shell_count(),
            voxels: planet.voxel_count(),
            plates: planet.plates().len(),
            boundaries: planet.boundaries().len(),
            volcanism: planet.volcanism_count(),
            crust_temperature_k: temperatures
                .get(planet.crust_shell())
                .copied()
                .unwrap_or(0.0),
            day_length_hours: day_length_hours(planet.rotation_rate()),
            mesh_dirty: planet.is_mesh_dirty(),
            state_hash: planet.state_hash(),
        }
    }

    /// The outermost non-air voxel under a latitude/longitude.
    pub fn inspect_surface(planet: &Planet, lat_deg: f64, lon_deg: f64) -> Option<VoxelInfo> {
        let (shell, v) = planet.surface_voxel(lat_deg, lon_deg)?;
        Some(VoxelInfo {
            lat_deg,
            lon_deg,
            shell,
            material: v.material(),
            temperature_k: v.temperature,
            pressure_pa: v.pressure,
            density: v.density(),
            elevation_m: v.elevation,
            age_years: v.age,
            melt_fraction: v.melt_fraction,
            stress_pa: v.stress,
            fractured: v.fractured,
            plate_id: v.plate_id,
            horizontal_speed_m_per_yr: v.velocity.horizontal_speed(),
        })
    }

    /// Mean temperature per shell, innermost first.
    pub fn temperature_profile(planet: &Planet) -> Vec<ShellTemperature> {
        planet
            .shells()
            .iter()
            .zip(planet.average_temperature_by_shell())
            .enumerate()
            .map(|(index, (shell, mean_k))| ShellTemperature {
                shell: index,
                inner_radius_m: shell.inner_radius(),
                outer_radius_m: shell.outer_radius(),
                mean_k,
            })
            .collect()
    }

    pub fn plates(planet: &Planet) -> Vec<PlateInfo> {
        planet
            .plates()
            .iter()
            .map(|p| PlateInfo {
                id: p.id,
                kind: p.kind,
                members: p.members.len(),
                boundary_voxels: p.boundary.len(),
                neighbors: planet
                    .boundaries()
                    .iter()
                    .filter_map(|b| b.other(p.id))
                    .collect(),
                area_m2: p.area_m2,
                average_age_years: p.average_age,
                angular_velocity_rad_per_yr: p.angular_velocity,
                pole_lat_deg: p.pole_lat_deg,
                pole_lon_deg: p.pole_lon_deg,
                net_force: p.net_force().length(),
            })
            .collect()
    }

    pub fn boundaries(planet: &Planet) -> Vec<BoundaryInfo> {
        planet
            .boundaries()
            .iter()
            .map(|b| BoundaryInfo {
                plates: b.plates,
                kind: b.kind,
                voxels: b.voxels.len(),
                relative_speed_m_per_yr: b.relative_velocity.length(),
            })
            .collect()
    }
}

fn day_length_hours(rotation_rate: f64) -> f64 {
    if rotation_rate > 0.0 {
        std::f64::consts::TAU / rotation_rate / 3600.0
    } else {
        f64::INFINITY
    }
}

/// Summary of planet state for the inspector.
#[derive(Debug, Clone, Serialize)]
pub struct PlanetSummary {
    pub time_years: f64,
    pub cycles: u64,
    pub radius_m: f64,
    pub mass_kg: f64,
    pub shells: usize,
    pub voxels: usize,
    pub plates: usize,
    pub boundaries: usize,
    pub volcanism: usize,
    pub crust_temperature_k: f64,
    pub day_length_hours: f64,
    pub mesh_dirty: bool,
    pub state_hash: u64,
}

impl fmt::Display for PlanetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Planet: time={:.0}yr ({:.2} Myr) cycles={} shells={} voxels={} plates={} \
             boundaries={} volcanism={} crust_T={:.1}K hash={:#018x}",
            self.time_years,
            self.time_years / 1.0e6,
            self.cycles,
            self.shells,
            self.voxels,
            self.plates,
            self.boundaries,
            self.volcanism,
            self.crust_temperature_k,
            self.state_hash,
        )
    }
}

/// Detailed state of a single voxel.
#[derive(Debug, Clone, Serialize)]
pub struct VoxelInfo {
    pub lat_deg: f64,
    pub lon_deg: f64,
    pub shell: usize,
    pub material: MaterialKind,
    pub temperature_k: f64,
    pub pressure_pa: f64,
    pub density: f64,
    pub elevation_m: f64,
    pub age_years: f64,
    pub melt_fraction: f64,
    pub stress_pa: f64,
    pub fractured: bool,
    pub plate_id: u16,
    pub horizontal_speed_m_per_yr: f64,
}

impl fmt::Display for VoxelInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Voxel ({:.2}, {:.2}) shell={} {} T={:.1}K P={:.3e}Pa elev={:.0}m age={:.0}yr \
             melt={:.2} plate={} speed={:.1}mm/yr",
            self.lat_deg,
            self.lon_deg,
            self.shell,
            self.material,
            self.temperature_k,
            self.pressure_pa,
            self.elevation_m,
            self.age_years,
            self.melt_fraction,
            self.plate_id,
            self.horizontal_speed_m_per_yr * 1000.0,
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ShellTemperature {
    pub shell: usize,
    pub inner_radius_m: f64,
    pub outer_radius_m: f64,
    pub mean_k: f64,
}

impl fmt::Display for ShellTemperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "shell {:>2} [{:>7.0} - {:>7.0} km] {:>7.1}K",
            self.shell,
            self.inner_radius_m / 1000.0,
            self.outer_radius_m / 1000.0,
            self.mean_k,
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlateInfo {
    pub id: u16,
    pub kind: PlateKind,
    pub members: usize,
    pub boundary_voxels: usize,
    /// Plates sharing a classified boundary with this one, ascending.
    pub neighbors: Vec<u16>,
    pub area_m2: f64,
    pub average_age_years: f64,
    pub angular_velocity_rad_per_yr: f64,
    pub pole_lat_deg: f64,
    pub pole_lon_deg: f64,
    /// Magnitude of the summed driving and resisting forces.
    pub net_force: f64,
}

impl fmt::Display for PlateInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "plate {:>3} {:<11} voxels={:<5} area={:.3e}km2 age={:.2}Myr omega={:.2e}rad/yr \
             pole=({:.1}, {:.1}) force={:.3e}",
            self.id,
            self.kind,
            self.members,
            self.area_m2 / 1.0e6,
            self.average_age_years / 1.0e6,
            self.angular_velocity_rad_per_yr,
            self.pole_lat_deg,
            self.pole_lon_deg,
            self.net_force,
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BoundaryInfo {
    pub plates: (u16, u16),
    pub kind: BoundaryKind,
    pub voxels: usize,
    pub relative_speed_m_per_yr: f64,
}

impl fmt::Display for BoundaryInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>3} | {:<3} {:<10} voxels={:<4} rel={:.1}mm/yr",
            self.plates.0,
            self.plates.1,
            self.kind,
            self.voxels,
            self.relative_speed_m_per_yr * 1000.0,
        )
    }
}
