use std::ops::Range;

use super::clamp_range;
use crate::config::PhysicsParams;
use crate::material::MaterialKind;
use crate::planet::Planet;

/// Buoyancy-driven radial velocity in mantle rock and melt.
///
/// Each eligible voxel's radial velocity relaxes toward a target proportional
/// to its temperature anomaly against the mean of the eligible voxels in its
/// shell: hot material rises, cold material sinks.
pub fn convect(planet: &mut Planet, dt: f64, params: &PhysicsParams, shells: Range<usize>) {
    if !(dt.is_finite() && dt > 0.0) {
        return;
    }
    let shells = clamp_range(shells, planet.shell_count());
    let rate = (params.convection_relaxation_per_year * dt).clamp(0.0, 1.0);

    for s in shells {
        let shell = &mut planet.shells[s];
        let (sum, n) = shell
            .iter()
            .filter(|(_, _, v)| convects(v.material()) && v.temperature.is_finite())
            .fold((0.0, 0usize), |(sum, n), (_, _, v)| (sum + v.temperature, n + 1));
        if n == 0 {
            continue;
        }
        let mean = sum / n as f64;
        for band in shell.voxels.iter_mut() {
            for v in band.iter_mut() {
                if !convects(v.material()) || !v.is_finite() {
                    continue;
                }
                let target = params.convection_m_per_yr_per_k * (v.temperature - mean);
                v.velocity.radial += (target - v.velocity.radial) * rate;
            }
        }
    }
}

fn convects(kind: MaterialKind) -> bool {
    matches!(kind, MaterialKind::Peridotite | MaterialKind::Magma)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlanetConfig;
    use geosphere_common::VoxelCoord;

    fn planet() -> Planet {
        Planet::new(&PlanetConfig {
            shells: 5,
            surface_bands: 8,
            ..PlanetConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn hot_rises_cold_sinks() {
        let mut p = planet();
        let hot = VoxelCoord::new(1, 2, 0);
        let cold = VoxelCoord::new(1, 2, 1);
        p.voxel_at_mut(hot).unwrap().temperature += 500.0;
        p.voxel_at_mut(cold).unwrap().temperature -= 500.0;
        let params = PhysicsParams::default();
        convect(&mut p, 100.0, &params, 1..2);
        assert!(p.voxel_at(hot).unwrap().velocity.radial > 0.0);
        assert!(p.voxel_at(cold).unwrap().velocity.radial < 0.0);
    }

    #[test]
    fn crust_does_not_convect() {
        let mut p = planet();
        let crust = p.crust_shell();
        for band in p.shells[crust].voxels.iter_mut() {
            for (lon, v) in band.iter_mut().enumerate() {
                v.temperature += lon as f64 * 100.0;
            }
        }
        let params = PhysicsParams::default();
        convect(&mut p, 100.0, &params, crust..crust + 1);
        for (_, _, v) in p.shells()[crust].iter() {
            assert_eq!(v.velocity.radial, 0.0);
        }
    }

    #[test]
    fn full_relaxation_reaches_target() {
        let mut p = planet();
        let c = VoxelCoord::new(0, 0, 0);
        p.voxel_at_mut(c).unwrap().temperature += 100.0;
        let params = PhysicsParams {
            convection_relaxation_per_year: 1.0,
            ..PhysicsParams::default()
        };
        convect(&mut p, 1.0, &params, 0..1);
        let shell = &p.shells()[0];
        let mean = shell.iter().map(|(_, _, v)| v.temperature).sum::<f64>()
            / shell.voxel_count() as f64;
        let v = p.voxel_at(c).unwrap();
        let expected = params.convection_m_per_yr_per_k * (v.temperature - mean);
        assert!((v.velocity.radial - expected).abs() < 1e-12);
    }
}
