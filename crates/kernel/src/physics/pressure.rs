use std::ops::Range;

use geosphere_common::VoxelCoord;
use geosphere_common::units::{ATMOSPHERIC_PRESSURE_PA, GRAVITY_M_S2};

use super::clamp_range;
use crate::planet::Planet;

/// Hydrostatic pressure, swept top-down over `shells`.
///
/// The outermost shell sits at atmospheric pressure; every other voxel takes
/// the pressure of the voxel directly above plus that voxel's weight per unit
/// area (`ρ·g·h`). The range is walked outermost first, so a caller splitting
/// the sweep must hand out ranges from the top of the planet downward.
pub fn accumulate_pressure(planet: &mut Planet, shells: Range<usize>) {
    let shells = clamp_range(shells, planet.shell_count());
    let top = planet.atmosphere_shell();
    let mut updated: Vec<Option<f64>> = Vec::new();

    for s in shells.rev() {
        if s == top {
            for band in planet.shells[s].voxels.iter_mut() {
                for v in band.iter_mut() {
                    v.pressure = ATMOSPHERIC_PRESSURE_PA;
                }
            }
            continue;
        }

        let above_thickness = planet.shells[s + 1].thickness();
        updated.clear();
        for (lat, lon, _) in planet.shells[s].iter() {
            let above = planet
                .map_to_shell(VoxelCoord::new(s, lat, lon), s + 1)
                .and_then(|c| planet.voxel_at(c));
            updated.push(match above {
                Some(a) if a.pressure.is_finite() => {
                    Some(a.pressure + a.density() * GRAVITY_M_S2 * above_thickness)
                }
                _ => None,
            });
        }

        let mut next = updated.iter().copied();
        for band in planet.shells[s].voxels.iter_mut() {
            for v in band.iter_mut() {
                if let Some(Some(p)) = next.next() {
                    v.pressure = p;
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
            shells: 7,
            surface_bands: 10,
            ..PlanetConfig::default()
        })
        .unwrap()
    }

    fn assert_monotone(p: &Planet) {
        for s in 0..p.crust_shell() + 1 {
            for (lat, lon, v) in p.shells()[s].iter() {
                let above = p
                    .map_to_shell(VoxelCoord::new(s, lat, lon), s + 1)
                    .and_then(|c| p.voxel_at(c))
                    .unwrap();
                assert!(v.pressure >= above.pressure, "shell {s} lat {lat} lon {lon}");
            }
        }
    }

    #[test]
    fn pressure_is_monotone_inward() {
        let mut p = planet();
        for shell in p.shells.iter_mut() {
            for band in shell.voxels.iter_mut() {
                for v in band.iter_mut() {
                    v.pressure = 0.0;
                }
            }
        }
        let all = 0..p.shell_count();
        accumulate_pressure(&mut p, all);
        assert_monotone(&p);
    }

    #[test]
    fn chunked_top_down_sweep_matches_full_sweep() {
        let mut full = planet();
        let mut chunked = full.clone();
        let n = full.shell_count();
        accumulate_pressure(&mut full, 0..n);
        let mut end = n;
        while end > 0 {
            let start = end.saturating_sub(2);
            accumulate_pressure(&mut chunked, start..end);
            end = start;
        }
        assert_eq!(full.state_hash(), chunked.state_hash());
        assert_monotone(&chunked);
    }

    #[test]
    fn surface_is_atmospheric_and_center_is_high() {
        let p = planet();
        let top = p.atmosphere_shell();
        for (_, _, v) in p.shells()[top].iter() {
            assert_eq!(v.pressure, ATMOSPHERIC_PRESSURE_PA);
        }
        for (_, _, v) in p.shells()[0].iter() {
            assert!(v.pressure > 1.0e10);
        }
    }

    #[test]
    fn non_finite_above_is_skipped() {
        let mut p = planet();
        let crust = p.crust_shell();
        for band in p.shells[crust].voxels.iter_mut() {
            for v in band.iter_mut() {
                v.pressure = f64::NAN;
            }
        }
        let before: Vec<f64> = p.shells[crust - 1].iter().map(|(_, _, v)| v.pressure).collect();
        accumulate_pressure(&mut p, crust - 1..crust);
        let after: Vec<f64> = p.shells[crust - 1].iter().map(|(_, _, v)| v.pressure).collect();
        assert_eq!(before, after);
    }
}
