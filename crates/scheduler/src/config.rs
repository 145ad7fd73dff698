use geosphere_kernel::{PhysicsParams, Planet, PlanetConfig, PlanetError};
use geosphere_tectonics::{TectonicsParams, seed_plates};
use serde::{Deserialize, Serialize};

/// Errors from scheduler configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchedulerError {
    #[error("target step must be positive and finite, got {0}")]
    InvalidStep(f64),
    #[error("shells per call must be at least 1")]
    ZeroShellsPerCall,
    #[error("surface fraction must be in (0, 1], got {0}")]
    InvalidSurfaceFraction(f64),
}

/// How a physics cycle is cut into scheduler calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Simulated years accumulated before a cycle starts.
    pub target_step_years: f64,
    /// Shells processed per call in shell phases.
    pub shells_per_call: usize,
    /// Fraction of the crust's latitude bands processed per call in surface phases.
    pub surface_fraction: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            target_step_years: 1000.0,
            shells_per_call: 1,
            surface_fraction: 0.25,
        }
    }
}

impl SchedulerConfig {
    pub fn validate(&self) -> Result<(), SchedulerError> {
        if !(self.target_step_years.is_finite() && self.target_step_years > 0.0) {
            return Err(SchedulerError::InvalidStep(self.target_step_years));
        }
        if self.shells_per_call == 0 {
            return Err(SchedulerError::ZeroShellsPerCall);
        }
        if !(self.surface_fraction > 0.0 && self.surface_fraction <= 1.0) {
            return Err(SchedulerError::InvalidSurfaceFraction(self.surface_fraction));
        }
        Ok(())
    }

    /// Crust bands handled per surface-phase call.
    pub fn bands_per_call(&self, bands: usize) -> usize {
        ((bands as f64 * self.surface_fraction).ceil() as usize).max(1)
    }
}

/// Everything needed to build and advance a simulation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub planet: PlanetConfig,
    pub physics: PhysicsParams,
    pub tectonics: TectonicsParams,
    pub scheduler: SchedulerConfig,
}

impl SimConfig {
    /// Construct the planet and seed its plates.
    pub fn build_planet(&self) -> Result<Planet, PlanetError> {
        let mut planet = Planet::new(&self.planet)?;
        seed_plates(&mut planet, &self.tectonics);
        Ok(planet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(SchedulerConfig::default().validate(), Ok(()));
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let bad_step = SchedulerConfig {
            target_step_years: 0.0,
            ..SchedulerConfig::default()
        };
        assert_eq!(bad_step.validate(), Err(SchedulerError::InvalidStep(0.0)));
        let no_shells = SchedulerConfig {
            shells_per_call: 0,
            ..SchedulerConfig::default()
        };
        assert_eq!(no_shells.validate(), Err(SchedulerError::ZeroShellsPerCall));
        let fraction = SchedulerConfig {
            surface_fraction: 1.5,
            ..SchedulerConfig::default()
        };
        assert!(matches!(
            fraction.validate(),
            Err(SchedulerError::InvalidSurfaceFraction(_))
        ));
    }

    #[test]
    fn bands_per_call_rounds_up() {
        let c = SchedulerConfig {
            surface_fraction: 0.3,
            ..SchedulerConfig::default()
        };
        assert_eq!(c.bands_per_call(10), 3);
        assert_eq!(c.bands_per_call(11), 4);
        assert_eq!(c.bands_per_call(1), 1);
    }

    #[test]
    fn sim_config_from_partial_json() {
        let c: SimConfig = serde_json::from_str(
            r#"{ "planet": { "shells": 6 }, "scheduler": { "shells_per_call": 2 } }"#,
        )
        .unwrap();
        assert_eq!(c.planet.shells, 6);
        assert_eq!(c.scheduler.shells_per_call, 2);
        assert_eq!(c.physics, PhysicsParams::default());
    }

    #[test]
    fn build_planet_seeds_plates() {
        let c = SimConfig {
            planet: PlanetConfig {
                shells: 5,
                surface_bands: 10,
                ..PlanetConfig::default()
            },
            ..SimConfig::default()
        };
        let p = c.build_planet().unwrap();
        assert_eq!(p.plates().len(), c.tectonics.plate_count);
    }
}
