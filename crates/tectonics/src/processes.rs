use std::ops::Range;

use geosphere_common::VoxelCoord;
use geosphere_kernel::{Boundary, BoundaryKind, MaterialKind, Planet, PlateKind};

use crate::params::TectonicsParams;

/// What happens to one boundary voxel this cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Process {
    Ridge,
    Collision,
    Subduct,
    Arc,
    Shear,
}

/// Apply boundary processes to boundary voxels in crust latitude bands `bands`.
///
/// Divergent voxels become fresh, hot, partially molten basalt at ridge depth.
/// Continental collisions uplift. At an oceanic convergent boundary the
/// subducting side sinks while the overriding side rises and gains melt.
/// Transform voxels load shear stress.
pub fn apply_boundary_processes(
    planet: &mut Planet,
    dt: f64,
    params: &TectonicsParams,
    bands: Range<usize>,
) {
    if !(dt.is_finite() && dt > 0.0) {
        return;
    }
    let mut work: Vec<(VoxelCoord, Process)> = Vec::new();
    for boundary in planet.boundaries() {
        let subducting = subducting_plate(planet, boundary);
        for &c in &boundary.voxels {
            if !bands.contains(&c.lat) {
                continue;
            }
            let Some(v) = planet.voxel_at(c) else {
                continue;
            };
            let process = match boundary.kind {
                BoundaryKind::Divergent => Process::Ridge,
                BoundaryKind::Transform => Process::Shear,
                BoundaryKind::Convergent => match subducting {
                    None => Process::Collision,
                    Some(id) if id == v.plate_id => Process::Subduct,
                    Some(_) => Process::Arc,
                },
            };
            work.push((c, process));
        }
    }

    for (c, process) in work {
        let Some(v) = planet.voxel_at_mut(c) else {
            continue;
        };
        if !v.is_finite() {
            continue;
        }
        match process {
            Process::Ridge => {
                v.set_material(MaterialKind::Basalt);
                v.age = 0.0;
                v.temperature = v.temperature.max(params.ridge_temperature_k);
                v.melt_fraction = v.melt_fraction.max(params.ridge_melt_fraction);
                v.elevation = params.ridge_elevation_m;
            }
            Process::Collision => {
                v.elevation += params.uplift_m_per_yr * dt;
                v.velocity.radial = params.uplift_m_per_yr;
            }
            Process::Subduct => {
                v.elevation -= params.subduction_m_per_yr * dt;
                v.velocity.radial = -params.subduction_m_per_yr;
            }
            Process::Arc => {
                v.elevation += params.uplift_m_per_yr * dt;
                v.melt_fraction = (v.melt_fraction + params.arc_melt_per_year * dt).min(1.0);
            }
            Process::Shear => {
                v.stress += params.transform_shear_pa_per_yr * dt;
            }
        }
    }
}

/// Plate that dives beneath the other at a convergent boundary: the oceanic
/// one against a continent, the older one between two oceanic plates.
/// `None` for two continents.
fn subducting_plate(planet: &Planet, boundary: &Boundary) -> Option<u16> {
    let (a, b) = (planet.plate(boundary.plates.0)?, planet.plate(boundary.plates.1)?);
    match (a.kind, b.kind) {
        (PlateKind::Continental, PlateKind::Continental) => None,
        (PlateKind::Oceanic, PlateKind::Continental) => Some(a.id),
        (PlateKind::Continental, PlateKind::Oceanic) => Some(b.id),
        (PlateKind::Oceanic, PlateKind::Oceanic) => {
            if b.average_age > a.average_age {
                Some(b.id)
            } else {
                Some(a.id)
            }
        }
    }
}
