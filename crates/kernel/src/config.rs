use geosphere_common::units::{EARTH_RADIUS_M, EARTH_ROTATION_RAD_S};
use serde::{Deserialize, Serialize};

/// Planet topology and initial state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanetConfig {
    pub radius_m: f64,
    /// Total shell count including the atmosphere.
    pub shells: usize,
    /// Latitude bands at the surface; interior shells are coarser.
    pub surface_bands: usize,
    pub atmosphere_thickness_m: f64,
    pub surface_temperature_k: f64,
    pub core_temperature_k: f64,
    pub rotation_rate_rad_s: f64,
    /// Threshold on the synthesized continent field; higher means less land.
    pub continent_threshold: f64,
    /// Seed for the synthesized surface pattern.
    pub seed: u64,
}

impl Default for PlanetConfig {
    fn default() -> Self {
        Self {
            radius_m: EARTH_RADIUS_M,
            shells: 10,
            surface_bands: 36,
            atmosphere_thickness_m: 50_000.0,
            surface_temperature_k: 288.0,
            core_temperature_k: 5000.0,
            rotation_rate_rad_s: EARTH_ROTATION_RAD_S,
            continent_threshold: 0.35,
            seed: 42,
        }
    }
}

/// Coefficients for the physics kernels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsParams {
    /// Heating in the innermost shells (K/yr).
    pub radiogenic_k_per_year: f64,
    pub radiogenic_shells: usize,
    /// Outer boundary temperature at the equator (K).
    pub boundary_equator_k: f64,
    /// Equator-to-pole drop of the outer boundary temperature (K).
    pub boundary_pole_drop_k: f64,
    /// Fraction per year by which the outermost shell relaxes to the boundary temperature.
    pub boundary_relaxation_per_year: f64,
    /// Width of the melting transition band (K).
    pub melt_band_k: f64,
    /// Melting point increase with pressure (K/Pa).
    pub clapeyron_k_per_pa: f64,
    pub brittle_ductile_k: f64,
    pub shear_modulus_pa: f64,
    pub yield_strength_pa: f64,
    pub maxwell_time_years: f64,
    /// Radial speed per kelvin of thermal anomaly (m/yr/K).
    pub convection_m_per_yr_per_k: f64,
    pub convection_relaxation_per_year: f64,
    /// Fractional damping of upward crustal velocity per year.
    pub erosion_rate_per_year: f64,
    /// Fractional lowering of land elevation per year.
    pub elevation_erosion_per_year: f64,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            radiogenic_k_per_year: 1.0e-6,
            radiogenic_shells: 2,
            boundary_equator_k: 300.0,
            boundary_pole_drop_k: 60.0,
            boundary_relaxation_per_year: 1.0e-3,
            melt_band_k: 100.0,
            clapeyron_k_per_pa: 1.0e-7,
            brittle_ductile_k: 900.0,
            shear_modulus_pa: 3.0e10,
            yield_strength_pa: 1.0e8,
            maxwell_time_years: 1.0e4,
            convection_m_per_yr_per_k: 1.0e-4,
            convection_relaxation_per_year: 1.0e-3,
            erosion_rate_per_year: 1.0e-6,
            elevation_erosion_per_year: 1.0e-7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let c = PlanetConfig::default();
        assert!(c.shells >= crate::planet::MIN_SHELLS);
        assert!(c.core_temperature_k > c.surface_temperature_k);
        let p = PhysicsParams::default();
        assert!(p.melt_band_k > 0.0);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let c: PlanetConfig = serde_json::from_str(r#"{ "shells": 6 }"#).unwrap();
        assert_eq!(c.shells, 6);
        assert_eq!(c.surface_bands, PlanetConfig::default().surface_bands);
    }
}
