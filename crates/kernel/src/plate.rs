use geosphere_common::{VoxelCoord, unit_from_lat_lon};
use glam::DVec3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlateKind {
    Oceanic,
    Continental,
}

impl std::fmt::Display for PlateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            PlateKind::Oceanic => "oceanic",
            PlateKind::Continental => "continental",
        })
    }
}

/// Aggregate over the crustal voxels sharing one plate id.
#[derive(Debug, Clone, PartialEq)]
pub struct Plate {
    pub id: u16,
    pub kind: PlateKind,
    pub members: Vec<VoxelCoord>,
    /// Members with at least one lateral neighbor on another plate.
    pub boundary: Vec<VoxelCoord>,
    /// Unit vector of the plate's reference point, rotated with the plate.
    pub center: DVec3,
    pub pole_lat_deg: f64,
    pub pole_lon_deg: f64,
    /// rad/yr, signed.
    pub angular_velocity: f64,
    pub area_m2: f64,
    pub average_age: f64,
    pub average_thickness_m: f64,
    pub ridge_push: DVec3,
    pub slab_pull: DVec3,
    pub basal_drag: DVec3,
    pub collision: DVec3,
}

impl Plate {
    pub fn new(id: u16, center: DVec3, pole_lat_deg: f64, pole_lon_deg: f64, omega: f64) -> Self {
        Self {
            id,
            kind: PlateKind::Oceanic,
            members: Vec::new(),
            boundary: Vec::new(),
            center: center.normalize_or_zero(),
            pole_lat_deg,
            pole_lon_deg,
            angular_velocity: omega,
            area_m2: 0.0,
            average_age: 0.0,
            average_thickness_m: 0.0,
            ridge_push: DVec3::ZERO,
            slab_pull: DVec3::ZERO,
            basal_drag: DVec3::ZERO,
            collision: DVec3::ZERO,
        }
    }

    pub fn pole_axis(&self) -> DVec3 {
        unit_from_lat_lon(self.pole_lat_deg, self.pole_lon_deg)
    }

    /// Angular velocity vector ω (rad/yr).
    pub fn rotation_vector(&self) -> DVec3 {
        self.pole_axis() * self.angular_velocity
    }

    /// Rigid-body velocity `ω × r` at Cartesian position `r` (m), in m/yr.
    pub fn velocity_at(&self, r: DVec3) -> DVec3 {
        self.rotation_vector().cross(r)
    }

    /// Replace the Euler pole and angular velocity from a rotation vector.
    pub fn set_rotation_vector(&mut self, omega: DVec3) {
        let magnitude = omega.length();
        if magnitude <= f64::EPSILON {
            self.angular_velocity = 0.0;
            return;
        }
        let (lat, lon) = geosphere_common::lat_lon_from_unit(omega);
        self.pole_lat_deg = lat;
        self.pole_lon_deg = lon;
        self.angular_velocity = magnitude;
    }

    pub fn reset_forces(&mut self) {
        self.ridge_push = DVec3::ZERO;
        self.slab_pull = DVec3::ZERO;
        self.basal_drag = DVec3::ZERO;
        self.collision = DVec3::ZERO;
    }

    pub fn net_force(&self) -> DVec3 {
        self.ridge_push + self.slab_pull + self.basal_drag + self.collision
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoundaryKind {
    Divergent,
    Convergent,
    Transform,
}

impl std::fmt::Display for BoundaryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            BoundaryKind::Divergent => "divergent",
            BoundaryKind::Convergent => "convergent",
            BoundaryKind::Transform => "transform",
        })
    }
}

/// Interface between two plates, rebuilt on every classification.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    /// Plate ids with `a < b`.
    pub plates: (u16, u16),
    pub kind: BoundaryKind,
    /// Mean of `v_b - v_a` over the boundary voxels (m/yr).
    pub relative_velocity: DVec3,
    pub voxels: Vec<VoxelCoord>,
}

impl Boundary {
    /// The plate across this boundary from `plate`, if `plate` is one side.
    pub fn other(&self, plate: u16) -> Option<u16> {
        if self.plates.0 == plate {
            Some(self.plates.1)
        } else if self.plates.1 == plate {
            Some(self.plates.0)
        } else {
            None
        }
    }

    /// Velocity of `plate` relative to its neighbor across this boundary.
    pub fn relative_velocity_for(&self, plate: u16) -> DVec3 {
        if plate == self.plates.1 {
            self.relative_velocity
        } else {
            -self.relative_velocity
        }
    }
}
