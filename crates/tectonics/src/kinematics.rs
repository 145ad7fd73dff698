use std::ops::Range;

use geosphere_common::{LocalFrame, VoxelCoord};
use geosphere_kernel::{Planet, Plate};
use glam::{DQuat, DVec3};

/// Rigid-body surface velocity `ω·axis × r` of a plate at `r` (m), in m/yr.
pub fn surface_velocity(plate: &Plate, r: DVec3) -> DVec3 {
    plate.velocity_at(r)
}

/// Write each plate's surface velocity into the north/east velocity of its
/// crust voxels in latitude bands `bands`. Unassigned voxels keep their velocity.
pub fn apply_plate_motion(planet: &mut Planet, bands: Range<usize>) {
    let crust = planet.crust_shell();
    let radius = planet.radius();
    let shell = &planet.shells()[crust];
    let bands = bands.start.min(shell.bands())..bands.end.min(shell.bands());

    let mut updates: Vec<(VoxelCoord, f64, f64)> = Vec::new();
    for lat in bands {
        for lon in 0..shell.lon_count(lat) {
            let c = VoxelCoord::new(crust, lat, lon);
            let Some(v) = planet.voxel_at(c) else {
                continue;
            };
            let Some(plate) = (v.plate_id != 0).then(|| planet.plate(v.plate_id)).flatten() else {
                continue;
            };
            let Some(up) = planet.unit_vector(c) else {
                continue;
            };
            let velocity = surface_velocity(plate, up * radius);
            let (_, north, east) = LocalFrame::at(up).decompose(velocity);
            if north.is_finite() && east.is_finite() {
                updates.push((c, north, east));
            }
        }
    }

    for (c, north, east) in updates {
        if let Some(v) = planet.voxel_at_mut(c) {
            v.velocity.north = north;
            v.velocity.east = east;
        }
    }
}

/// Rotate every plate center about its Euler pole by `ω·dt`.
pub fn advance_plates(planet: &mut Planet, dt: f64) {
    if !(dt.is_finite() && dt > 0.0) {
        return;
    }
    for plate in planet.plates_mut() {
        let axis = plate.pole_axis();
        if axis.length_squared() < 0.5 || plate.angular_velocity == 0.0 {
            continue;
        }
        let rotation = DQuat::from_axis_angle(axis.normalize(), plate.angular_velocity * dt);
        let moved = (rotation * plate.center).normalize_or_zero();
        if moved != DVec3::ZERO {
            plate.center = moved;
        }
    }
}
