use std::ops::Range;

use geosphere_common::VoxelCoord;

use super::clamp_range;
use crate::config::PhysicsParams;
use crate::planet::Planet;

/// Brittle/ductile state, stress accumulation and fracture in `shells`.
///
/// Stress grows with the lateral shear of the velocity field. Below the
/// brittle-ductile transition temperature it accumulates until it exceeds the
/// yield strength, at which point the voxel fractures and sheds half its
/// stress. Ductile voxels relax toward zero with the Maxwell time. Fluids and
/// air carry no stress.
pub fn update_mechanics(
    planet: &mut Planet,
    dt: f64,
    params: &PhysicsParams,
    shells: Range<usize>,
) {
    if !(dt.is_finite() && dt > 0.0) {
        return;
    }
    let shells = clamp_range(shells, planet.shell_count());
    let relax = if params.maxwell_time_years > 0.0 {
        (-dt / params.maxwell_time_years).exp()
    } else {
        0.0
    };
    let mut rates: Vec<f64> = Vec::new();

    for s in shells {
        rates.clear();
        for (lat, lon, _) in planet.shells[s].iter() {
            rates.push(strain_rate(planet, VoxelCoord::new(s, lat, lon)));
        }

        let mut next = rates.iter().copied();
        for band in planet.shells[s].voxels.iter_mut() {
            for v in band.iter_mut() {
                let rate = next.next().unwrap_or(0.0);
                if !v.material().is_solid() {
                    v.stress = 0.0;
                    v.brittle = false;
                    v.fractured = false;
                    continue;
                }
                if !(v.is_finite() && rate.is_finite()) {
                    continue;
                }
                v.brittle = v.temperature < params.brittle_ductile_k;
                v.stress += params.shear_modulus_pa * rate * dt;
                if v.brittle {
                    if v.stress > params.yield_strength_pa {
                        v.fractured = true;
                        v.stress *= 0.5;
                    }
                } else {
                    v.stress *= relax;
                    v.fractured = false;
                }
            }
        }
    }
}

/// Magnitude of the lateral velocity gradient (1/yr) toward the east and north neighbors.
fn strain_rate(planet: &Planet, c: VoxelCoord) -> f64 {
    let Some(v) = planet.voxel_at(c) else {
        return 0.0;
    };
    let shell = &planet.shells[c.shell];
    let [east, _, north, _] = planet.lateral_neighbors(c);

    let mut rate = 0.0;
    if let Some(e) = east.filter(|&e| e != c).and_then(|e| planet.voxel_at(e)) {
        rate += (e.velocity.east - v.velocity.east).abs() / shell.cell_width(c.lat);
        rate += (e.velocity.north - v.velocity.north).abs() / shell.cell_width(c.lat);
    }
    if let Some(n) = north.and_then(|n| planet.voxel_at(n)) {
        rate += (n.velocity.north - v.velocity.north).abs() / shell.band_height();
        rate += (n.velocity.east - v.velocity.east).abs() / shell.band_height();
    }
    rate
}
