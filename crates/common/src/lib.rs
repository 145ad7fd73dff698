//! Shared types for the geosphere engine: voxel coordinates, spherical
//! geometry helpers and physical constants.
//!
//! # Invariants
//! - Latitudes are degrees in `[-90, 90]`, longitudes degrees in `[0, 360)`.
//! - Cartesian vectors use a right-handed frame with +Z through the north pole.

pub mod geo;
pub mod types;
pub mod units;

pub use geo::{LocalFrame, lat_lon_from_unit, unit_from_lat_lon};
pub use types::VoxelCoord;
