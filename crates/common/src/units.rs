//! Physical constants. Simulated time is measured in years throughout.

pub const SECONDS_PER_YEAR: f64 = 365.25 * 24.0 * 3600.0;

/// Mean surface pressure (Pa).
pub const ATMOSPHERIC_PRESSURE_PA: f64 = 101_325.0;

/// Surface gravity (m/s²), used for every shell.
pub const GRAVITY_M_S2: f64 = 9.81;

/// Freezing point of water (K).
pub const WATER_FREEZING_K: f64 = 273.15;

/// Earth's sidereal rotation rate (rad/s).
pub const EARTH_ROTATION_RAD_S: f64 = 7.292_115e-5;

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;
