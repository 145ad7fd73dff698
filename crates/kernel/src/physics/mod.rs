//! Stage-local physics kernels.
//!
//! Every kernel operates in place on a contiguous range of shells, or of
//! latitude bands of the crust shell for surface kernels, so a physics cycle
//! can be split across many short calls. Ranges are clamped to the grid.
//! Voxels with non-finite state are skipped rather than failing the call.

mod advection;
mod convection;
mod mechanics;
mod pressure;
mod surface;
mod thermal;
mod transitions;

use std::ops::Range;

pub use advection::advect;
pub use convection::convect;
pub use mechanics::update_mechanics;
pub use pressure::accumulate_pressure;
pub use surface::{erode_surface, increment_age};
pub use thermal::{boundary_temperature, diffuse_temperature};
pub use transitions::{TransitionCounts, apply_phase_transitions};

pub(crate) fn clamp_range(range: Range<usize>, len: usize) -> Range<usize> {
    range.start.min(len)..range.end.min(len)
}

/// Wrap a sub-cell offset into `[-0.5, 0.5)`.
pub(crate) fn wrap_offset(x: f64) -> f32 {
    let w = ((x + 0.5).rem_euclid(1.0) - 0.5) as f32;
    // Narrowing can round values just below the upper edge up onto it.
    if w >= 0.5 { -0.5 } else { w }
}
