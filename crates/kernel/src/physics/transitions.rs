use std::ops::Range;

use geosphere_common::units::WATER_FREEZING_K;

use super::clamp_range;
use crate::config::PhysicsParams;
use crate::material::MaterialKind;
use crate::planet::Planet;
use crate::voxel::Voxel;

/// Number of voxels that changed phase during one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransitionCounts {
    pub melted: usize,
    pub solidified: usize,
    pub frozen: usize,
    pub thawed: usize,
}

impl TransitionCounts {
    pub fn total(&self) -> usize {
        self.melted + self.solidified + self.frozen + self.thawed
    }
}

impl std::ops::AddAssign for TransitionCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.melted += rhs.melted;
        self.solidified += rhs.solidified;
        self.frozen += rhs.frozen;
        self.thawed += rhs.thawed;
    }
}

/// Melt, solidify, freeze and thaw voxels in `shells`.
///
/// Rock melts fully once it is half a melt band above its pressure-adjusted
/// melting point and partially inside the band. Magma crystallizes into the
/// rock its silica fraction selects once it is half a band below that rock's
/// melting point.
pub fn apply_phase_transitions(
    planet: &mut Planet,
    params: &PhysicsParams,
    shells: Range<usize>,
) -> TransitionCounts {
    let shells = clamp_range(shells, planet.shell_count());
    let mut counts = TransitionCounts::default();
    for s in shells {
        for band in planet.shells[s].voxels.iter_mut() {
            for v in band.iter_mut() {
                transition(v, params, &mut counts);
            }
        }
    }
    if counts.total() > 0 {
        tracing::debug!(
            melted = counts.melted,
            solidified = counts.solidified,
            frozen = counts.frozen,
            thawed = counts.thawed,
            "phase transitions"
        );
    }
    counts
}

fn transition(v: &mut Voxel, params: &PhysicsParams, counts: &mut TransitionCounts) {
    if !(v.temperature.is_finite() && v.pressure.is_finite()) {
        return;
    }
    let half_band = 0.5 * params.melt_band_k.max(0.0);
    let kind = v.material();
    match kind {
        MaterialKind::Water if v.temperature < WATER_FREEZING_K => {
            v.set_material(MaterialKind::Ice);
            counts.frozen += 1;
        }
        MaterialKind::Ice if v.temperature > WATER_FREEZING_K => {
            v.set_material(MaterialKind::Water);
            counts.thawed += 1;
        }
        MaterialKind::Magma => {
            let rock = MaterialKind::rock_from_silica(v.silica);
            let Some(tm) = rock.melting_point(v.pressure, params.clapeyron_k_per_pa) else {
                return;
            };
            if v.temperature < tm - half_band {
                v.set_material(rock);
                v.melt_fraction = 0.0;
                v.age = 0.0;
                counts.solidified += 1;
            } else {
                v.melt_fraction = melt_fraction(v.temperature, tm, half_band);
            }
        }
        _ if kind.is_rock() => {
            let Some(tm) = kind.melting_point(v.pressure, params.clapeyron_k_per_pa) else {
                return;
            };
            if v.temperature > tm + half_band {
                v.set_material(MaterialKind::Magma);
                v.melt_fraction = 1.0;
                counts.melted += 1;
            } else {
                v.melt_fraction = melt_fraction(v.temperature, tm, half_band);
            }
        }
        _ => {}
    }
}

fn melt_fraction(t: f64, tm: f64, half_band: f64) -> f64 {
    if half_band <= 0.0 {
        return if t > tm { 1.0 } else { 0.0 };
    }
    ((t - (tm - half_band)) / (2.0 * half_band)).clamp(0.0, 1.0)
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
    fn basalt_melts_and_solidifies_back() {
        let params = PhysicsParams::default();
        let mut counts = TransitionCounts::default();
        let mut v = Voxel::new(MaterialKind::Basalt);
        v.pressure = 1.0e5;
        v.age = 5.0e7;

        v.temperature = 1500.0;
        transition(&mut v, &params, &mut counts);
        assert_eq!(v.material(), MaterialKind::Magma);
        assert_eq!(v.density(), MaterialKind::Magma.props().density);
        assert_eq!(v.melt_fraction, 1.0);

        v.temperature = 1300.0;
        transition(&mut v, &params, &mut counts);
        assert_eq!(v.material(), MaterialKind::Basalt);
        assert_eq!(v.density(), MaterialKind::Basalt.props().density);
        assert_eq!(v.melt_fraction, 0.0);
        assert_eq!(v.age, 0.0);
        assert_eq!(counts.melted, 1);
        assert_eq!(counts.solidified, 1);
    }

    #[test]
    fn granite_melt_returns_granite() {
        let params = PhysicsParams::default();
        let mut counts = TransitionCounts::default();
        let mut v = Voxel::new(MaterialKind::Granite);
        v.pressure = 1.0e5;
        v.temperature = 2000.0;
        transition(&mut v, &params, &mut counts);
        assert_eq!(v.material(), MaterialKind::Magma);
        v.temperature = 1000.0;
        transition(&mut v, &params, &mut counts);
        assert_eq!(v.material(), MaterialKind::Granite);
    }

    #[test]
    fn partial_melt_inside_band() {
        let params = PhysicsParams::default();
        let mut counts = TransitionCounts::default();
        let mut v = Voxel::new(MaterialKind::Basalt);
        v.pressure = 0.0;
        v.temperature = 1400.0;
        transition(&mut v, &params, &mut counts);
        assert_eq!(v.material(), MaterialKind::Basalt);
        assert!((v.melt_fraction - 0.5).abs() < 1e-12);
        assert_eq!(counts.total(), 0);
    }

    #[test]
    fn pressure_raises_melting_point() {
        let params = PhysicsParams::default();
        let mut counts = TransitionCounts::default();
        let mut v = Voxel::new(MaterialKind::Peridotite);
        v.temperature = 1800.0;
        v.pressure = 1.0e10;
        transition(&mut v, &params, &mut counts);
        assert_eq!(v.material(), MaterialKind::Peridotite);
        v.pressure = 1.0e5;
        transition(&mut v, &params, &mut counts);
        assert_eq!(v.material(), MaterialKind::Magma);
    }

    #[test]
    fn water_freezes_and_ice_thaws() {
        let params = PhysicsParams::default();
        let mut counts = TransitionCounts::default();
        let mut v = Voxel::new(MaterialKind::Water);
        v.temperature = 260.0;
        transition(&mut v, &params, &mut counts);
        assert_eq!(v.material(), MaterialKind::Ice);
        v.temperature = 280.0;
        transition(&mut v, &params, &mut counts);
        assert_eq!(v.material(), MaterialKind::Water);
        assert_eq!((counts.frozen, counts.thawed), (1, 1));
    }

    #[test]
    fn non_finite_voxels_are_skipped() {
        let params = PhysicsParams::default();
        let mut counts = TransitionCounts::default();
        let mut v = Voxel::new(MaterialKind::Basalt);
        v.temperature = f64::NAN;
        transition(&mut v, &params, &mut counts);
        assert_eq!(v.material(), MaterialKind::Basalt);
    }

    #[test]
    fn fresh_planet_is_mostly_stable() {
        let mut p = planet();
        let crust = p.crust_shell();
        let params = PhysicsParams::default();
        let counts = apply_phase_transitions(&mut p, &params, crust..crust + 1);
        assert_eq!(counts.melted, 0);
        for (_, _, v) in p.shells()[crust].iter() {
            assert_eq!(v.density(), v.material().props().density);
        }
    }
}
