//! Developer tooling: read-only inspection of a planet snapshot.
//!
//! # Invariants
//! - Inspection never mutates the planet; every report is a plain value that
//!   serializes to JSON and prints as one or more text lines.

mod inspector;

pub use inspector::{
    BoundaryInfo, PlanetInspector, PlanetSummary, PlateInfo, ShellTemperature, VoxelInfo,
};
