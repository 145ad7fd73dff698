//! Planet kernel: the shelled voxel grid, material table, plate records and the
//! stage-local physics kernels that advance them.
//!
//! # Invariants
//! - Shell topology is fixed at construction; shells are ordered innermost to outermost.
//! - `voxels[lat].len() == lon_counts[lat]` for every band of every shell.
//! - A voxel's material and density only change together through `Voxel::set_material`.
//! - Every physics kernel works on any contiguous subrange without visiting the rest of the grid.

pub mod config;
pub mod material;
pub mod physics;
pub mod planet;
pub mod plate;
pub mod shell;
pub mod voxel;

pub use config::{PhysicsParams, PlanetConfig};
pub use material::{MaterialKind, MaterialProps};
pub use planet::{MIN_BANDS, MIN_SHELLS, Planet, PlanetError, VOLCANIC_MELT_FRACTION};
pub use plate::{Boundary, BoundaryKind, Plate, PlateKind};
pub use shell::Shell;
pub use voxel::{LocalVelocity, Voxel};
