use std::collections::BTreeMap;

use geosphere_kernel::{BoundaryKind, MaterialKind, Planet, PlateKind};
use glam::DVec3;

use crate::params::TectonicsParams;

#[derive(Default, Clone, Copy)]
struct Forces {
    ridge_push: DVec3,
    slab_pull: DVec3,
    basal_drag: DVec3,
    collision: DVec3,
}

/// Recompute the four driving and resisting forces of every plate from zero.
///
/// - Ridge push: young oceanic crust at divergent boundaries pushes its plate
///   away from the ridge, fading linearly to nothing at `ridge_push_max_age_years`.
/// - Slab pull: old basalt of an oceanic plate at a convergent boundary pulls
///   downward and slightly along the plate's own motion.
/// - Basal drag: opposes the area-weighted mean surface velocity.
/// - Collision: continental convergence and transform friction resist the
///   plate's motion relative to its neighbor.
pub fn compute_forces(planet: &mut Planet, params: &TectonicsParams) {
    let radius = planet.radius();
    let mut forces: BTreeMap<u16, Forces> = planet
        .plates()
        .iter()
        .map(|p| (p.id, Forces::default()))
        .collect();

    for boundary in planet.boundaries() {
        let mut counts: BTreeMap<u16, usize> = BTreeMap::new();
        for &c in &boundary.voxels {
            let Some(v) = planet.voxel_at(c) else {
                continue;
            };
            let id = v.plate_id;
            let (Some(plate), Some(up)) = (planet.plate(id), planet.unit_vector(c)) else {
                continue;
            };
            if !v.is_finite() {
                continue;
            }
            *counts.entry(id).or_default() += 1;
            let Some(f) = forces.get_mut(&id) else {
                continue;
            };
            match boundary.kind {
                BoundaryKind::Divergent => {
                    let max_age = params.ridge_push_max_age_years;
                    if v.material() == MaterialKind::Basalt && v.age < max_age && max_age > 0.0 {
                        let dir = boundary.relative_velocity_for(id).normalize_or_zero();
                        f.ridge_push += dir * params.ridge_push_coeff * (1.0 - v.age / max_age);
                    }
                }
                BoundaryKind::Convergent => {
                    if plate.kind == PlateKind::Oceanic
                        && v.material() == MaterialKind::Basalt
                        && v.age > params.slab_pull_min_age_years
                        && params.slab_pull_age_ref_years > 0.0
                    {
                        let motion = plate.velocity_at(up * radius).normalize_or_zero();
                        let dir = (-up + motion * params.slab_pull_epsilon).normalize_or_zero();
                        f.slab_pull +=
                            dir * params.slab_pull_coeff * v.age / params.slab_pull_age_ref_years;
                    }
                }
                BoundaryKind::Transform => {}
            }
        }

        let resistance = match boundary.kind {
            BoundaryKind::Convergent if continental_pair(planet, boundary.plates) => {
                params.collision_coeff
            }
            BoundaryKind::Transform => params.transform_resistance_coeff,
            _ => continue,
        };
        for (id, count) in counts {
            let dir = boundary.relative_velocity_for(id).normalize_or_zero();
            if let Some(f) = forces.get_mut(&id) {
                f.collision -= dir * resistance * count as f64;
            }
        }
    }

    for plate in planet.plates() {
        let (mut weighted, mut area) = (DVec3::ZERO, 0.0);
        for &c in &plate.members {
            let (Some(up), a) = (planet.unit_vector(c), planet.voxel_area(c)) else {
                continue;
            };
            weighted += plate.velocity_at(up * radius) * a;
            area += a;
        }
        if area > 0.0 {
            if let Some(f) = forces.get_mut(&plate.id) {
                f.basal_drag = -(weighted / area) * params.basal_drag_coeff * plate.area_m2;
            }
        }
    }

    for plate in planet.plates_mut() {
        plate.reset_forces();
        let Some(f) = forces.get(&plate.id) else {
            continue;
        };
        plate.ridge_push = f.ridge_push;
        plate.slab_pull = f.slab_pull;
        plate.basal_drag = f.basal_drag;
        plate.collision = f.collision;
    }
}

fn continental_pair(planet: &Planet, (a, b): (u16, u16)) -> bool {
    let continental = |id| planet.plate(id).is_some_and(|p| p.kind == PlateKind::Continental);
    continental(a) && continental(b)
}

/// Nudge each plate's rotation vector by the torque of its net force.
///
/// The torque `R·center × F` is applied with `torque_gain` and damped by
/// `torque_damping_per_year`; the resulting angular speed is clamped to
/// `max_omega_rad_per_year`.
pub fn apply_torque_feedback(planet: &mut Planet, dt: f64, params: &TectonicsParams) {
    if !params.torque_feedback || !(dt.is_finite() && dt > 0.0) {
        return;
    }
    let radius = planet.radius();
    let damping = (1.0 - params.torque_damping_per_year * dt).clamp(0.0, 1.0);
    for plate in planet.plates_mut() {
        let torque = (plate.center * radius).cross(plate.net_force());
        let mut omega = (plate.rotation_vector() + torque * params.torque_gain * dt) * damping;
        let max = params.max_omega_rad_per_year.max(0.0);
        if omega.length() > max {
            omega = omega.normalize_or_zero() * max;
        }
        if omega.is_finite() {
            plate.set_rotation_vector(omega);
        }
    }
}
