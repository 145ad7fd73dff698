use std::ops::Range;

use geosphere_kernel::physics::{self, TransitionCounts};
use geosphere_kernel::{PhysicsParams, Planet};
use geosphere_tectonics::{self as tectonics, TectonicsParams};

use crate::phase::Phase;

/// Work done once when a phase starts, before its first chunk.
pub(crate) fn enter_phase(
    phase: Phase,
    planet: &mut Planet,
    dt: f64,
    params: &TectonicsParams,
) {
    match phase {
        Phase::PlateMotion => {
            if tectonics::identification_due(planet, params) {
                tectonics::identify_plates(planet);
            }
            tectonics::advance_plates(planet, dt);
        }
        Phase::BoundaryProcesses => {
            tectonics::classify_boundaries(planet, params);
            tectonics::compute_forces(planet, params);
            tectonics::apply_torque_feedback(planet, dt, params);
        }
        _ => {}
    }
}

/// Run the CPU kernel of `phase` over `range`: shells, or crust bands for
/// surface phases. Pressure ranges count from the outermost shell.
pub(crate) fn run_phase(
    phase: Phase,
    planet: &mut Planet,
    dt: f64,
    range: Range<usize>,
    physics_params: &PhysicsParams,
    tectonics_params: &TectonicsParams,
) -> TransitionCounts {
    match phase {
        Phase::Temperature => physics::diffuse_temperature(planet, dt, physics_params, range),
        Phase::Pressure => {
            let n = planet.shell_count();
            let top_down = n.saturating_sub(range.end)..n.saturating_sub(range.start);
            physics::accumulate_pressure(planet, top_down);
        }
        Phase::PhaseTransitions => {
            return physics::apply_phase_transitions(planet, physics_params, range);
        }
        Phase::Mechanics => physics::update_mechanics(planet, dt, physics_params, range),
        Phase::Convection => physics::convect(planet, dt, physics_params, range),
        Phase::PlateMotion => tectonics::apply_plate_motion(planet, range),
        Phase::BoundaryProcesses => {
            tectonics::apply_boundary_processes(planet, dt, tectonics_params, range)
        }
        Phase::Advection => physics::advect(planet, dt, range),
        Phase::SurfaceProcesses => physics::erode_surface(planet, dt, physics_params, range),
        Phase::AgeUpdate => physics::increment_age(planet, dt, range),
        Phase::Complete => {}
    }
    TransitionCounts::default()
}
