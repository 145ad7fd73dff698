use std::ops::Range;

use geosphere_common::VoxelCoord;

use super::{clamp_range, wrap_offset};
use crate::planet::Planet;

/// First-order upwind radial advection of temperature plus sub-cell drift.
///
/// A voxel moving outward takes heat from the shell below it and one moving
/// inward from the shell above, in proportion to its Courant number. Air is
/// never an upwind source. Sub-cell offsets move with the full local velocity
/// and wrap into `[-0.5, 0.5)`.
pub fn advect(planet: &mut Planet, dt: f64, shells: Range<usize>) {
    if !(dt.is_finite() && dt > 0.0) {
        return;
    }
    let shells = clamp_range(shells, planet.shell_count());
    let mut updated: Vec<Option<f64>> = Vec::new();

    for s in shells {
        let shell = &planet.shells[s];
        let thickness = shell.thickness();
        updated.clear();
        for (lat, lon, v) in shell.iter() {
            if v.is_air() || !v.is_finite() {
                updated.push(None);
                continue;
            }
            let courant = (v.velocity.radial * dt / thickness).clamp(-1.0, 1.0);
            let [inner, outer] = planet.radial_neighbors(VoxelCoord::new(s, lat, lon));
            let upwind = if courant > 0.0 {
                inner
            } else if courant < 0.0 {
                outer
            } else {
                None
            };
            let source = upwind
                .and_then(|c| planet.voxel_at(c))
                .filter(|u| !u.is_air() && u.temperature.is_finite());
            updated.push(
                source.map(|u| v.temperature + courant.abs() * (u.temperature - v.temperature)),
            );
        }

        let shell = &mut planet.shells[s];
        let band_height = shell.band_height();
        let widths: Vec<f64> = (0..shell.bands()).map(|lat| shell.cell_width(lat)).collect();
        let mut next = updated.iter().copied();
        for (lat, band) in shell.voxels.iter_mut().enumerate() {
            for v in band.iter_mut() {
                let t = next.next().flatten();
                if v.is_air() || !v.is_finite() {
                    continue;
                }
                if let Some(t) = t {
                    v.temperature = t;
                }
                let moved = [
                    v.velocity.radial * dt / thickness,
                    v.velocity.north * dt / band_height,
                    v.velocity.east * dt / widths[lat],
                ];
                for (offset, delta) in v.offset.iter_mut().zip(moved) {
                    *offset = wrap_offset(*offset as f64 + delta);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlanetConfig;

    fn planet() -> Planet {
        Planet::new(&PlanetConfig {
            shells: 5,
            surface_bands: 8,
            ..PlanetConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn rising_material_carries_heat_from_below() {
        let mut p = planet();
        let c = VoxelCoord::new(2, 3, 0);
        let below = p.radial_neighbors(c)[0].unwrap();
        let hot = p.voxel_at(below).unwrap().temperature;
        let thickness = p.shell(2).unwrap().thickness();
        let before = {
            let v = p.voxel_at_mut(c).unwrap();
            v.velocity.radial = 0.5 * thickness;
            v.temperature
        };
        assert!(hot > before);
        advect(&mut p, 1.0, 2..3);
        let after = p.voxel_at(c).unwrap().temperature;
        assert!((after - (before + 0.5 * (hot - before))).abs() < 1e-9);
    }

    #[test]
    fn still_voxels_are_unchanged() {
        let mut p = planet();
        let before = p.state_hash();
        let all = 0..p.shell_count();
        advect(&mut p, 10.0, all);
        assert_eq!(p.state_hash(), before);
    }

    #[test]
    fn offsets_stay_wrapped() {
        let mut p = planet();
        let crust = p.crust_shell();
        for band in p.shells[crust].voxels.iter_mut() {
            for v in band.iter_mut() {
                v.velocity.east = 3.0e5;
                v.velocity.north = -2.0e5;
            }
        }
        advect(&mut p, 7.0, crust..crust + 1);
        for (_, _, v) in p.shells()[crust].iter() {
            for o in v.offset {
                assert!((-0.5..0.5).contains(&o));
            }
        }
    }
}
