use std::time::Instant;

use geosphere_kernel::physics::TransitionCounts;
use geosphere_kernel::{PhysicsParams, Planet};
use geosphere_tectonics::TectonicsParams;

use crate::config::{SchedulerConfig, SchedulerError, SimConfig};
use crate::phase::Phase;
use crate::stages::{enter_phase, run_phase};
use crate::timer::{CallTimer, SchedulerStats};

const TIMER_CAPACITY: usize = 120;

/// Spreads one physics cycle over many short calls.
///
/// Simulated time accumulates across calls until it reaches
/// `target_step_years`; the accumulated amount becomes the cycle's time step
/// and the phases then advance one chunk per call. Shell phases take
/// `shells_per_call` shells per call, surface phases a fraction of the crust's
/// latitude bands.
#[derive(Debug)]
pub struct AmortizedScheduler {
    config: SchedulerConfig,
    physics: PhysicsParams,
    tectonics: TectonicsParams,
    phase: Phase,
    cursor: usize,
    accumulator: f64,
    cycle_dt: f64,
    transitions: TransitionCounts,
    timer: CallTimer,
    stats: SchedulerStats,
}

impl AmortizedScheduler {
    pub fn new(
        config: SchedulerConfig,
        physics: PhysicsParams,
        tectonics: TectonicsParams,
    ) -> Result<Self, SchedulerError> {
        config.validate()?;
        Ok(Self {
            config,
            physics,
            tectonics,
            phase: Phase::Complete,
            cursor: 0,
            accumulator: 0.0,
            cycle_dt: 0.0,
            transitions: TransitionCounts::default(),
            timer: CallTimer::new(TIMER_CAPACITY),
            stats: SchedulerStats::default(),
        })
    }

    pub fn from_sim(sim: &SimConfig) -> Result<Self, SchedulerError> {
        Self::new(
            sim.scheduler.clone(),
            sim.physics.clone(),
            sim.tectonics.clone(),
        )
    }

    /// Add `dt` simulated years and do one chunk of work if a cycle is due or
    /// in progress. Returns `true` when this call completed a cycle.
    /// Negative or non-finite `dt` adds nothing.
    pub fn tick(&mut self, planet: &mut Planet, dt: f64) -> bool {
        let _span = tracing::info_span!("scheduler_tick", phase = %self.phase).entered();
        let start = Instant::now();

        if dt.is_finite() && dt > 0.0 {
            self.accumulator += dt;
        }
        let completed = if self.phase == Phase::Complete
            && self.accumulator < self.config.target_step_years
        {
            false
        } else {
            if self.phase == Phase::Complete {
                self.begin_cycle();
            }
            self.step(planet)
        };

        self.timer.record(start.elapsed());
        self.stats.calls += 1;
        self.stats.average_call = self.timer.average();
        self.stats.max_call = self.timer.max();
        completed
    }

    fn begin_cycle(&mut self) {
        self.cycle_dt = self.accumulator;
        self.accumulator = 0.0;
        self.phase = Phase::Temperature;
        self.cursor = 0;
        self.transitions = TransitionCounts::default();
        self.stats.calls_this_cycle = 0;
        tracing::debug!(dt = self.cycle_dt, "cycle started");
    }

    fn step(&mut self, planet: &mut Planet) -> bool {
        let phase = self.phase;
        let extent = phase.extent(planet);
        let chunk = if phase.is_surface() {
            self.config.bands_per_call(extent)
        } else {
            self.config.shells_per_call
        };
        let start = self.cursor.min(extent);
        let end = (start + chunk).min(extent);

        if start == 0 {
            enter_phase(phase, planet, self.cycle_dt, &self.tectonics);
        }
        self.transitions += run_phase(
            phase,
            planet,
            self.cycle_dt,
            start..end,
            &self.physics,
            &self.tectonics,
        );
        self.stats.calls_this_cycle += 1;
        self.cursor = end;
        if self.cursor < extent {
            return false;
        }

        self.phase = phase.next();
        self.cursor = 0;
        if self.phase != Phase::Complete {
            return false;
        }
        planet.complete_cycle(self.cycle_dt);
        self.stats.cycles_completed += 1;
        self.stats.last_cycle_calls = self.stats.calls_this_cycle;
        self.stats.last_cycle_transitions = self.transitions;
        tracing::debug!(
            time = planet.sim_time(),
            calls = self.stats.last_cycle_calls,
            transitions = self.transitions.total(),
            "cycle complete"
        );
        true
    }

    /// Abandon the cycle in progress and any accumulated time. Used after the
    /// caller has discarded a partially updated planet.
    pub fn reset(&mut self) {
        self.phase = Phase::Complete;
        self.cursor = 0;
        self.accumulator = 0.0;
        self.transitions = TransitionCounts::default();
        self.stats.calls_this_cycle = 0;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Position within the current phase, in shells or bands.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Simulated years waiting to start the next cycle.
    pub fn accumulated(&self) -> f64 {
        self.accumulator
    }

    /// Time step of the cycle in progress, or of the last one.
    pub fn cycle_dt(&self) -> f64 {
        self.cycle_dt
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Complete
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn stats(&self) -> &SchedulerStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Backend;
    use crate::update::update;
    use geosphere_kernel::PlanetConfig;

    fn sim() -> SimConfig {
        SimConfig {
            planet: PlanetConfig {
                shells: 5,
                surface_bands: 8,
                ..PlanetConfig::default()
            },
            scheduler: SchedulerConfig {
                target_step_years: 100.0,
                shells_per_call: 1,
                surface_fraction: 0.5,
            },
            ..SimConfig::default()
        }
    }

    fn expected_calls(planet: &Planet, config: &SchedulerConfig) -> usize {
        Phase::CYCLE
            .iter()
            .map(|p| {
                let extent = p.extent(planet);
                let chunk = if p.is_surface() {
                    config.bands_per_call(extent)
                } else {
                    config.shells_per_call
                };
                extent.div_ceil(chunk)
            })
            .sum()
    }

    #[test]
    fn rejects_invalid_config() {
        let config = SchedulerConfig {
            shells_per_call: 0,
            ..SchedulerConfig::default()
        };
        let err =
            AmortizedScheduler::new(config, PhysicsParams::default(), TectonicsParams::default());
        assert_eq!(err.unwrap_err(), SchedulerError::ZeroShellsPerCall);
    }

    #[test]
    fn stays_idle_below_target() {
        let sim = sim();
        let mut planet = sim.build_planet().unwrap();
        let hash = planet.state_hash();
        let mut s = AmortizedScheduler::from_sim(&sim).unwrap();
        assert!(!s.tick(&mut planet, 40.0));
        assert!(!s.tick(&mut planet, f64::NAN));
        assert!(!s.tick(&mut planet, -500.0));
        assert!(!s.tick(&mut planet, 40.0));
        assert!(s.is_idle());
        assert_eq!(s.accumulated(), 80.0);
        assert_eq!(planet.state_hash(), hash);
    }

    #[test]
    fn one_completion_per_sweep() {
        let sim = sim();
        let mut planet = sim.build_planet().unwrap();
        let mut s = AmortizedScheduler::from_sim(&sim).unwrap();
        let per_cycle = expected_calls(&planet, &sim.scheduler);

        for cycle in 1..=3u64 {
            let mut calls = 0;
            let mut completions = 0;
            let mut dt = 150.0;
            loop {
                let done = s.tick(&mut planet, dt);
                dt = 0.0;
                calls += 1;
                assert!(s.cursor() <= s.phase().extent(&planet));
                if done {
                    completions += 1;
                    break;
                }
                assert!(calls <= per_cycle, "cycle did not complete");
            }
            assert_eq!(completions, 1);
            assert_eq!(calls, per_cycle);
            assert_eq!(planet.cycles(), cycle);
            assert!(s.is_idle());
        }
        assert_eq!(planet.sim_time(), 450.0);
        assert_eq!(s.stats().cycles_completed, 3);
        assert_eq!(s.stats().last_cycle_calls, per_cycle);
    }

    #[test]
    fn time_arriving_mid_cycle_waits_for_next_cycle() {
        let sim = sim();
        let mut planet = sim.build_planet().unwrap();
        let mut s = AmortizedScheduler::from_sim(&sim).unwrap();
        assert!(!s.tick(&mut planet, 120.0));
        assert_eq!(s.cycle_dt(), 120.0);
        let mut done = false;
        while !done {
            done = s.tick(&mut planet, 10.0);
        }
        assert_eq!(planet.sim_time(), 120.0);
        assert!(s.accumulated() > 0.0);
    }

    #[test]
    fn amortized_cycle_matches_synchronous_update() {
        let sim = sim();
        let mut amortized = sim.build_planet().unwrap();
        let mut direct = amortized.clone();
        let mut s = AmortizedScheduler::from_sim(&sim).unwrap();
        let mut dt = 250.0;
        while !s.tick(&mut amortized, dt) {
            dt = 0.0;
        }
        update(&mut direct, 250.0, &mut Backend::cpu(), &sim);
        assert_eq!(amortized.state_hash(), direct.state_hash());
        assert_eq!(amortized.plates(), direct.plates());
    }

    #[test]
    fn reset_abandons_cycle_in_progress() {
        let sim = sim();
        let mut planet = sim.build_planet().unwrap();
        let mut s = AmortizedScheduler::from_sim(&sim).unwrap();
        assert!(!s.tick(&mut planet, 150.0));
        assert!(!s.is_idle());
        s.reset();
        assert!(s.is_idle());
        assert_eq!(s.cursor(), 0);
        assert_eq!(s.accumulated(), 0.0);
        assert!(!s.tick(&mut planet, 50.0));
        assert!(s.is_idle());
    }

    #[test]
    fn cycle_marks_mesh_dirty() {
        let sim = sim();
        let mut planet = sim.build_planet().unwrap();
        planet.clear_mesh_dirty();
        let mut s = AmortizedScheduler::from_sim(&sim).unwrap();
        let mut dt = 100.0;
        while !s.tick(&mut planet, dt) {
            dt = 0.0;
            assert!(!planet.is_mesh_dirty());
        }
        assert!(planet.is_mesh_dirty());
    }
}
