use geosphere_kernel::Planet;

use crate::backend::{AcceleratedStage, Accelerator, Backend};
use crate::config::SimConfig;
use crate::phase::Phase;
use crate::stages::{enter_phase, run_phase};

/// Advance the planet by one full cycle of `dt` years in a single call.
///
/// Stages run in the same order as the amortized scheduler's phases, each over
/// the whole grid. Temperature, convection and advection go to the backend's
/// accelerator when it has one; a failing accelerator is dropped and the stage
/// reruns on the CPU. Non-finite or non-positive `dt` does nothing.
pub fn update<A: Accelerator>(
    planet: &mut Planet,
    dt: f64,
    backend: &mut Backend<A>,
    config: &SimConfig,
) {
    if !(dt.is_finite() && dt > 0.0) {
        return;
    }
    let _span = tracing::info_span!("update", dt, backend = backend.name()).entered();

    for phase in Phase::CYCLE {
        enter_phase(phase, planet, dt, &config.tectonics);
        let accelerated = match phase {
            Phase::Temperature => Some(AcceleratedStage::Temperature),
            Phase::Convection => Some(AcceleratedStage::Convection),
            Phase::Advection => Some(AcceleratedStage::Advection),
            _ => None,
        };
        if let Some(stage) = accelerated {
            if backend.try_run(stage, planet, dt, &config.physics) {
                continue;
            }
        }
        let extent = phase.extent(planet);
        run_phase(
            phase,
            planet,
            dt,
            0..extent,
            &config.physics,
            &config.tectonics,
        );
    }
    planet.complete_cycle(dt);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::ScriptedAccelerator;
    use geosphere_kernel::PlanetConfig;

    fn sim() -> SimConfig {
        SimConfig {
            planet: PlanetConfig {
                shells: 5,
                surface_bands: 8,
                ..PlanetConfig::default()
            },
            ..SimConfig::default()
        }
    }

    #[test]
    fn update_advances_one_cycle() {
        let sim = sim();
        let mut planet = sim.build_planet().unwrap();
        update(&mut planet, 500.0, &mut Backend::cpu(), &sim);
        assert_eq!(planet.sim_time(), 500.0);
        assert_eq!(planet.cycles(), 1);
        assert!(!planet.boundaries().is_empty());
    }

    #[test]
    fn invalid_dt_is_ignored() {
        let sim = sim();
        let mut planet = sim.build_planet().unwrap();
        let hash = planet.state_hash();
        update(&mut planet, f64::INFINITY, &mut Backend::cpu(), &sim);
        update(&mut planet, -1.0, &mut Backend::cpu(), &sim);
        assert_eq!(planet.state_hash(), hash);
    }

    #[test]
    fn accelerator_takes_three_stages() {
        let sim = sim();
        let mut planet = sim.build_planet().unwrap();
        let accelerator = ScriptedAccelerator::default();
        let calls = accelerator.calls.clone();
        let mut backend = Backend::with_accelerator(accelerator);
        update(&mut planet, 100.0, &mut backend, &sim);
        update(&mut planet, 100.0, &mut backend, &sim);
        assert_eq!(calls.get(), 6);
        assert!(backend.is_accelerated());
    }

    #[test]
    fn failed_accelerator_reruns_stage_on_cpu_and_stays_off() {
        let sim = sim();
        let mut on_cpu = sim.build_planet().unwrap();
        let mut fallen_back = on_cpu.clone();

        let accelerator = ScriptedAccelerator {
            fail_on: Some(AcceleratedStage::Temperature),
            ..ScriptedAccelerator::default()
        };
        let calls = accelerator.calls.clone();
        let mut backend = Backend::with_accelerator(accelerator);

        update(&mut fallen_back, 100.0, &mut backend, &sim);
        update(&mut on_cpu, 100.0, &mut Backend::cpu(), &sim);
        assert_eq!(fallen_back.state_hash(), on_cpu.state_hash());
        assert!(!backend.is_accelerated());
        assert!(backend.fallback_reason().is_some());

        update(&mut fallen_back, 100.0, &mut backend, &sim);
        assert_eq!(calls.get(), 1);
    }
}
