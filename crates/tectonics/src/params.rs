use serde::{Deserialize, Serialize};

/// Coefficients for plate seeding, classification, forces and boundary processes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TectonicsParams {
    pub plate_count: usize,
    /// Seed for plate centers and Euler poles.
    pub seed: u64,
    /// Range of initial angular speeds (rad/yr).
    pub omega_min_rad_per_year: f64,
    pub omega_max_rad_per_year: f64,
    /// Simulated years between plate re-identifications.
    pub identify_interval_years: f64,
    /// Boundaries with slower mean relative motion are transform (m/yr).
    pub min_relative_speed_m_per_yr: f64,

    pub ridge_push_coeff: f64,
    /// Seafloor at least this old contributes no ridge push (yr).
    pub ridge_push_max_age_years: f64,
    pub slab_pull_coeff: f64,
    /// Only slabs older than this pull (yr).
    pub slab_pull_min_age_years: f64,
    pub slab_pull_age_ref_years: f64,
    /// Weight of the plate's own direction of motion in the slab pull direction.
    pub slab_pull_epsilon: f64,
    pub basal_drag_coeff: f64,
    pub collision_coeff: f64,
    pub transform_resistance_coeff: f64,

    /// Let the net force torque update each plate's rotation.
    pub torque_feedback: bool,
    /// rad/yr of rotation change per unit torque per year.
    pub torque_gain: f64,
    /// Fractional rotation damping per year.
    pub torque_damping_per_year: f64,
    pub max_omega_rad_per_year: f64,

    /// Temperature of fresh ridge basalt (K).
    pub ridge_temperature_k: f64,
    pub ridge_melt_fraction: f64,
    pub ridge_elevation_m: f64,
    /// Uplift rate at continental collisions and volcanic arcs (m/yr).
    pub uplift_m_per_yr: f64,
    /// Sinking rate of a subducting slab (m/yr).
    pub subduction_m_per_yr: f64,
    /// Melt fraction gained per year above a subducting slab.
    pub arc_melt_per_year: f64,
    /// Shear stress loading at transform boundaries (Pa/yr).
    pub transform_shear_pa_per_yr: f64,
}

impl Default for TectonicsParams {
    fn default() -> Self {
        Self {
            plate_count: 8,
            seed: 0x706c_6174_6573,
            omega_min_rad_per_year: 2.0e-9,
            omega_max_rad_per_year: 1.2e-8,
            identify_interval_years: 1.0e6,
            min_relative_speed_m_per_yr: 1.0e-3,
            ridge_push_coeff: 1.0,
            ridge_push_max_age_years: 1.0e8,
            slab_pull_coeff: 2.0,
            slab_pull_min_age_years: 1.0e7,
            slab_pull_age_ref_years: 1.0e8,
            slab_pull_epsilon: 0.1,
            basal_drag_coeff: 1.0e-12,
            collision_coeff: 1.0,
            transform_resistance_coeff: 0.2,
            torque_feedback: false,
            torque_gain: 1.0e-24,
            torque_damping_per_year: 1.0e-7,
            max_omega_rad_per_year: 5.0e-8,
            ridge_temperature_k: 1200.0,
            ridge_melt_fraction: 0.2,
            ridge_elevation_m: -2500.0,
            uplift_m_per_yr: 1.0e-3,
            subduction_m_per_yr: 5.0e-2,
            arc_melt_per_year: 1.0e-5,
            transform_shear_pa_per_yr: 1.0e2,
        }
    }
}
