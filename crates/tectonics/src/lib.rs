//! Plate tectonics on the crust shell: identification, rigid-plate kinematics,
//! boundary classification, driving forces and boundary processes.
//!
//! # Invariants
//! - Plate ids are non-zero; crust voxels with id 0 belong to no plate.
//! - Boundaries are rebuilt wholesale on every classification, ordered by plate pair.
//! - Forces are recomputed from zero on every call.
//! - Seeding depends only on the planet and `TectonicsParams::seed`.

pub mod boundary;
pub mod forces;
pub mod identify;
pub mod kinematics;
pub mod params;
pub mod processes;

pub use boundary::{classify, classify_boundaries};
pub use forces::{apply_torque_feedback, compute_forces};
pub use identify::{identify_plates, rebuild_plates, seed_plates};
pub use kinematics::{advance_plates, apply_plate_motion, surface_velocity};
pub use params::TectonicsParams;
pub use processes::apply_boundary_processes;

/// True when the identification interval has elapsed (or plates were never identified).
pub fn identification_due(planet: &geosphere_kernel::Planet, params: &TectonicsParams) -> bool {
    match planet.last_identification() {
        None => true,
        Some(last) => planet.sim_time() - last >= params.identify_interval_years,
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use geosphere_common::{VoxelCoord, unit_from_lat_lon};
    use geosphere_kernel::{MaterialKind, Planet, PlanetConfig, Plate};

    use crate::identify::rebuild_plates;

    /// Latitude used to split a ridge into young and old halves.
    pub const RIDGE_AGE_SPLIT_LAT: f64 = 0.0;

    /// Oceanic planet with two wedge plates meeting at longitude 0: plate 1
    /// spans `[330, 360)` and spins with `-omega`, plate 2 spans `[0, 30)` and
    /// spins with `omega`, both about the spin axis. Everything else is
    /// unassigned. Positive `omega` opens a ridge along longitude 0.
    pub fn two_plate_planet(omega: f64) -> Planet {
        let mut p = Planet::new(&PlanetConfig {
            shells: 5,
            surface_bands: 12,
            ..PlanetConfig::default()
        })
        .unwrap();
        p.set_plates(vec![
            Plate::new(1, unit_from_lat_lon(0.0, 345.0), 90.0, 0.0, -omega),
            Plate::new(2, unit_from_lat_lon(0.0, 15.0), 90.0, 0.0, omega),
        ]);
        let crust = p.crust_shell();
        let bands = p.shells()[crust].bands();
        for lat in 0..bands {
            for lon in 0..p.shells()[crust].lon_count(lat) {
                let c = VoxelCoord::new(crust, lat, lon);
                let lon_deg = p.lat_lon(c).unwrap().1;
                let v = p.voxel_at_mut(c).unwrap();
                v.set_material(MaterialKind::Basalt);
                v.age = 1.0e6;
                v.plate_id = if lon_deg >= 330.0 {
                    1
                } else if lon_deg < 30.0 {
                    2
                } else {
                    0
                };
            }
        }
        rebuild_plates(&mut p);
        p
    }
}
