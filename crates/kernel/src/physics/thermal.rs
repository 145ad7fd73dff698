use std::ops::Range;

use geosphere_common::VoxelCoord;
use geosphere_common::units::SECONDS_PER_YEAR;

use super::clamp_range;
use crate::config::PhysicsParams;
use crate::planet::Planet;

/// Upper bound on the exchange factor per neighbor; six neighbors at 1/6
/// can at most equalize a voxel with its surroundings in one step.
const MAX_EXCHANGE: f64 = 1.0 / 6.0;

/// Latitude-dependent radiative-balance temperature of the outer boundary (K).
pub fn boundary_temperature(params: &PhysicsParams, lat_deg: f64) -> f64 {
    let s = lat_deg.to_radians().sin();
    params.boundary_equator_k - params.boundary_pole_drop_k * s * s
}

/// Finite-difference heat exchange over `shells`.
///
/// Non-air voxels exchange heat with up to six neighbors weighted by their own
/// diffusivity. Air voxels are never diffused but do act as a heat sink for
/// the solid surface. Innermost shells receive radiogenic heat and the
/// outermost shell relaxes toward [`boundary_temperature`].
pub fn diffuse_temperature(
    planet: &mut Planet,
    dt: f64,
    params: &PhysicsParams,
    shells: Range<usize>,
) {
    if !(dt.is_finite() && dt > 0.0) {
        return;
    }
    let shells = clamp_range(shells, planet.shell_count());
    let dt_s = dt * SECONDS_PER_YEAR;
    let outermost = planet.atmosphere_shell();
    let relax = (params.boundary_relaxation_per_year * dt).clamp(0.0, 1.0);
    let mut updated: Vec<f64> = Vec::new();

    for s in shells {
        updated.clear();
        for (lat, lon, _) in planet.shells[s].iter() {
            updated.push(next_temperature(planet, VoxelCoord::new(s, lat, lon), dt_s));
        }

        let heat = if s < params.radiogenic_shells {
            params.radiogenic_k_per_year * dt
        } else {
            0.0
        };
        let shell = &mut planet.shells[s];
        let lat_centers: Vec<f64> = (0..shell.bands())
            .map(|lat| shell.lat_center_deg(lat))
            .collect();
        let mut next = updated.iter().copied();
        for (lat, band) in shell.voxels.iter_mut().enumerate() {
            let target = boundary_temperature(params, lat_centers[lat]);
            for v in band.iter_mut() {
                let t = next.next().unwrap_or(v.temperature);
                if !v.is_air() && t.is_finite() {
                    v.temperature = t + heat;
                }
                if s == outermost && v.temperature.is_finite() {
                    v.temperature += (target - v.temperature) * relax;
                }
            }
        }
    }
}

fn next_temperature(planet: &Planet, c: VoxelCoord, dt_s: f64) -> f64 {
    let Some(v) = planet.voxel_at(c) else {
        return f64::NAN;
    };
    if v.is_air() || !v.temperature.is_finite() {
        return v.temperature;
    }
    let kappa = v.material().props().diffusivity();
    let shell = &planet.shells[c.shell];

    let mut links: [(Option<VoxelCoord>, f64); 6] = [(None, 0.0); 6];
    for (slot, n) in links.iter_mut().zip(planet.lateral_neighbors(c)) {
        *slot = match n {
            Some(n) if n.lat == c.lat => (Some(n), shell.cell_width(c.lat)),
            Some(n) => (Some(n), shell.band_height()),
            None => (None, 0.0),
        };
    }
    for (slot, n) in links[4..].iter_mut().zip(planet.radial_neighbors(c)) {
        if let Some(n) = n {
            let other = planet.shells[n.shell].thickness();
            *slot = (Some(n), 0.5 * (shell.thickness() + other));
        }
    }

    let mut delta = 0.0;
    for (n, dist) in links {
        let Some(nv) = n.and_then(|n| planet.voxel_at(n)) else {
            continue;
        };
        if !nv.temperature.is_finite() || dist <= 0.0 || n == Some(c) {
            continue;
        }
        let factor = (kappa * dt_s / (dist * dist)).min(MAX_EXCHANGE);
        delta += factor * (nv.temperature - v.temperature);
    }
    v.temperature + delta
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlanetConfig;
    use crate::material::MaterialKind;

    fn planet() -> Planet {
        Planet::new(&PlanetConfig {
            shells: 5,
            surface_bands: 8,
            ..PlanetConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn uniform_field_is_stationary_without_sources() {
        let mut p = planet();
        for shell in p.shells.iter_mut() {
            for band in shell.voxels.iter_mut() {
                for v in band.iter_mut() {
                    v.temperature = 1000.0;
                }
            }
        }
        let params = PhysicsParams {
            radiogenic_shells: 0,
            ..PhysicsParams::default()
        };
        let top = p.atmosphere_shell();
        diffuse_temperature(&mut p, 1.0e6, &params, 0..top);
        for shell in &p.shells[..top] {
            for (_, _, v) in shell.iter() {
                assert!((v.temperature - 1000.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn hot_spot_spreads_to_neighbors() {
        let mut p = planet();
        let c = VoxelCoord::new(1, 2, 3);
        let before_neighbor = p
            .voxel_at(p.lateral_neighbors(c)[0].unwrap())
            .unwrap()
            .temperature;
        p.voxel_at_mut(c).unwrap().temperature += 5000.0;
        let params = PhysicsParams::default();
        let all = 0..p.shell_count();
        diffuse_temperature(&mut p, 1.0e9, &params, all);
        let after_neighbor = p
            .voxel_at(p.lateral_neighbors(c)[0].unwrap())
            .unwrap()
            .temperature;
        assert!(after_neighbor > before_neighbor);
    }

    #[test]
    fn air_is_not_diffused() {
        let mut p = planet();
        let top = p.atmosphere_shell();
        let params = PhysicsParams {
            boundary_relaxation_per_year: 0.0,
            ..PhysicsParams::default()
        };
        let air: Vec<_> = p.shells[top]
            .iter()
            .filter(|(_, _, v)| v.material() == MaterialKind::Air)
            .map(|(lat, lon, v)| (lat, lon, v.temperature))
            .collect();
        let all = 0..p.shell_count();
        diffuse_temperature(&mut p, 1.0e6, &params, all);
        for (lat, lon, t) in air {
            assert_eq!(p.shells[top].get(lat, lon).unwrap().temperature, t);
        }
    }

    #[test]
    fn outer_shell_relaxes_to_boundary() {
        let mut p = planet();
        let top = p.atmosphere_shell();
        let params = PhysicsParams {
            boundary_relaxation_per_year: 1.0,
            ..PhysicsParams::default()
        };
        diffuse_temperature(&mut p, 10.0, &params, top..top + 1);
        let shell = &p.shells[top];
        for (lat, _, v) in shell.iter() {
            let expected = boundary_temperature(&params, shell.lat_center_deg(lat));
            assert!((v.temperature - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn radiogenic_heat_in_inner_shells() {
        let mut p = planet();
        let before = p.average_temperature_by_shell()[0];
        let params = PhysicsParams {
            radiogenic_k_per_year: 1.0,
            ..PhysicsParams::default()
        };
        diffuse_temperature(&mut p, 10.0, &params, 0..1);
        assert!(p.average_temperature_by_shell()[0] > before);
    }

    #[test]
    fn boundary_temperature_is_coldest_at_poles() {
        let params = PhysicsParams::default();
        assert!(boundary_temperature(&params, 0.0) > boundary_temperature(&params, 80.0));
        assert_eq!(
            boundary_temperature(&params, 90.0),
            boundary_temperature(&params, -90.0)
        );
    }
}
