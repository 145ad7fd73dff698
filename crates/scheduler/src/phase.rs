use geosphere_kernel::Planet;

/// Stage of an amortized physics cycle, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Temperature,
    Pressure,
    PhaseTransitions,
    Mechanics,
    Convection,
    PlateMotion,
    BoundaryProcesses,
    Advection,
    SurfaceProcesses,
    AgeUpdate,
    /// Idle between cycles.
    Complete,
}

impl Phase {
    /// Every working phase of one cycle, in order.
    pub const CYCLE: [Phase; 10] = [
        Phase::Temperature,
        Phase::Pressure,
        Phase::PhaseTransitions,
        Phase::Mechanics,
        Phase::Convection,
        Phase::PlateMotion,
        Phase::BoundaryProcesses,
        Phase::Advection,
        Phase::SurfaceProcesses,
        Phase::AgeUpdate,
    ];

    pub fn next(self) -> Phase {
        match self {
            Phase::Temperature => Phase::Pressure,
            Phase::Pressure => Phase::PhaseTransitions,
            Phase::PhaseTransitions => Phase::Mechanics,
            Phase::Mechanics => Phase::Convection,
            Phase::Convection => Phase::PlateMotion,
            Phase::PlateMotion => Phase::BoundaryProcesses,
            Phase::BoundaryProcesses => Phase::Advection,
            Phase::Advection => Phase::SurfaceProcesses,
            Phase::SurfaceProcesses => Phase::AgeUpdate,
            Phase::AgeUpdate => Phase::Complete,
            Phase::Complete => Phase::Complete,
        }
    }

    /// Surface phases walk latitude bands of the crust shell instead of shells.
    pub fn is_surface(self) -> bool {
        matches!(
            self,
            Phase::PlateMotion | Phase::BoundaryProcesses | Phase::SurfaceProcesses
        )
    }

    /// Number of units (shells or crust bands) the phase walks over.
    pub fn extent(self, planet: &Planet) -> usize {
        match self {
            Phase::Complete => 0,
            p if p.is_surface() => planet
                .shell(planet.crust_shell())
                .map(|s| s.bands())
                .unwrap_or(0),
            _ => planet.shell_count(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Phase::Temperature => "temperature",
            Phase::Pressure => "pressure",
            Phase::PhaseTransitions => "phase_transitions",
            Phase::Mechanics => "mechanics",
            Phase::Convection => "convection",
            Phase::PlateMotion => "plate_motion",
            Phase::BoundaryProcesses => "boundary_processes",
            Phase::Advection => "advection",
            Phase::SurfaceProcesses => "surface_processes",
            Phase::AgeUpdate => "age_update",
            Phase::Complete => "complete",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_order_follows_next() {
        let mut p = Phase::CYCLE[0];
        for expected in &Phase::CYCLE[1..] {
            p = p.next();
            assert_eq!(p, *expected);
        }
        assert_eq!(p.next(), Phase::Complete);
        assert_eq!(Phase::Complete.next(), Phase::Complete);
    }

    #[test]
    fn surface_phases() {
        let surface: Vec<_> = Phase::CYCLE.iter().filter(|p| p.is_surface()).collect();
        assert_eq!(
            surface,
            [
                &Phase::PlateMotion,
                &Phase::BoundaryProcesses,
                &Phase::SurfaceProcesses
            ]
        );
    }
}
