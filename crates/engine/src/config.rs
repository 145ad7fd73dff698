use std::time::Duration;

use geosphere_scheduler::{SchedulerError, SimConfig};
use serde::{Deserialize, Serialize};

/// How the worker advances the planet on each wake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassMode {
    /// One amortized scheduler tick; the snapshot is published when a cycle
    /// completes.
    #[default]
    Amortized,
    /// One whole `update` cycle per wake, published every time.
    Synchronous,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Worker wake-ups per wall-clock second.
    pub update_rate_hz: f64,
    /// Simulated years per wall-clock second.
    pub speed: f64,
    pub mode: PassMode,
    pub sim: SimConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            update_rate_hz: 60.0,
            speed: 1.0e5,
            mode: PassMode::Amortized,
            sim: SimConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        self.wake_interval()?;
        validate_speed(self.speed)?;
        self.sim.scheduler.validate()?;
        Ok(())
    }

    /// Time between worker wake-ups. Rates whose period does not fit a
    /// `Duration` are rejected along with non-positive ones.
    pub fn wake_interval(&self) -> Result<Duration, EngineError> {
        let rate = self.update_rate_hz;
        if !(rate.is_finite() && rate > 0.0) {
            return Err(EngineError::InvalidRate(rate));
        }
        Duration::try_from_secs_f64(1.0 / rate).map_err(|_| EngineError::InvalidRate(rate))
    }
}

pub(crate) fn validate_speed(speed: f64) -> Result<(), EngineError> {
    if speed.is_finite() && speed >= 0.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidSpeed(speed))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("update rate must be a positive number of hertz, got {0}")]
    InvalidRate(f64),
    #[error("speed must be a finite, non-negative number of years per second, got {0}")]
    InvalidSpeed(f64),
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
    #[error("failed to spawn physics worker: {0}")]
    Spawn(#[source] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_rate_and_speed() {
        let config = EngineConfig {
            update_rate_hz: 0.0,
            ..EngineConfig::default()
        };
        assert!(matches!(config.validate(), Err(EngineError::InvalidRate(_))));

        let config = EngineConfig {
            speed: f64::NAN,
            ..EngineConfig::default()
        };
        assert!(matches!(config.validate(), Err(EngineError::InvalidSpeed(_))));
    }

    #[test]
    fn rejects_rate_whose_period_overflows() {
        let config = EngineConfig {
            update_rate_hz: 1.0e-20,
            ..EngineConfig::default()
        };
        assert!(matches!(config.validate(), Err(EngineError::InvalidRate(_))));
        assert!(matches!(config.wake_interval(), Err(EngineError::InvalidRate(_))));
    }

    #[test]
    fn wake_interval_is_the_rate_period() {
        let config = EngineConfig {
            update_rate_hz: 50.0,
            ..EngineConfig::default()
        };
        assert_eq!(config.wake_interval().unwrap(), Duration::from_millis(20));
    }

    #[test]
    fn scheduler_errors_pass_through() {
        let mut config = EngineConfig::default();
        config.sim.scheduler.shells_per_call = 0;
        assert!(matches!(
            config.validate(),
            Err(EngineError::Scheduler(SchedulerError::ZeroShellsPerCall))
        ));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "speed": 250.0, "mode": "synchronous" }"#).unwrap();
        assert_eq!(config.speed, 250.0);
        assert_eq!(config.mode, PassMode::Synchronous);
        assert_eq!(config.update_rate_hz, 60.0);
    }
}
