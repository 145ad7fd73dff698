use std::ops::Range;

use super::clamp_range;
use crate::config::PhysicsParams;
use crate::planet::Planet;

/// Erode the crust over a range of its latitude bands.
///
/// Uplift of crustal voxels is damped by `erosion_rate_per_year` and land
/// elevation is worn down toward sea level.
pub fn erode_surface(planet: &mut Planet, dt: f64, params: &PhysicsParams, bands: Range<usize>) {
    if !(dt.is_finite() && dt > 0.0) {
        return;
    }
    let crust = planet.crust_shell();
    let shell = &mut planet.shells[crust];
    let bands = clamp_range(bands, shell.bands());
    let damping = (1.0 - params.erosion_rate_per_year * dt).max(0.0);
    let wear = (params.elevation_erosion_per_year * dt).clamp(0.0, 1.0);

    for band in &mut shell.voxels[bands] {
        for v in band.iter_mut() {
            if !v.material().is_crustal() || !v.is_finite() {
                continue;
            }
            if v.velocity.radial > 0.0 {
                v.velocity.radial *= damping;
            }
            if v.elevation > 0.0 {
                v.elevation -= v.elevation * wear;
            }
        }
    }
}

/// Age every solid voxel in `shells` by `dt` years.
pub fn increment_age(planet: &mut Planet, dt: f64, shells: Range<usize>) {
    if !(dt.is_finite() && dt > 0.0) {
        return;
    }
    let shells = clamp_range(shells, planet.shell_count());
    for shell in &mut planet.shells[shells] {
        for band in shell.voxels.iter_mut() {
            for v in band.iter_mut() {
                if v.material().is_solid() && v.age.is_finite() {
                    v.age += dt;
                }
            }
        }
    }
}
