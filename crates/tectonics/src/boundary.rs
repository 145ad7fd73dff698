use std::collections::BTreeMap;

use geosphere_common::{LocalFrame, VoxelCoord};
use geosphere_kernel::{Boundary, BoundaryKind, Planet};
use glam::DVec3;

use crate::params::TectonicsParams;

#[derive(Default)]
struct PairAccumulator {
    voxels: Vec<VoxelCoord>,
    relative: DVec3,
    axis: DVec3,
}

/// Rebuild the planet's boundary list from the plates' boundary voxels.
///
/// Every boundary voxel registers the unordered pair formed with each
/// differently-owned lateral neighbor. Per pair the mean relative velocity
/// `v_b - v_a` is split along the mean separation axis (the tangential
/// direction from plate `a`'s center toward plate `b`'s): motion mostly along
/// the boundary, or too slow, is transform; opening along the axis is
/// divergent; closing is convergent. Pairs come out sorted, so the result is
/// deterministic. Returns the number of boundaries.
pub fn classify_boundaries(planet: &mut Planet, params: &TectonicsParams) -> usize {
    let radius = planet.radius();
    let mut pairs: BTreeMap<(u16, u16), PairAccumulator> = BTreeMap::new();

    for plate in planet.plates() {
        for &c in &plate.boundary {
            let Some(up) = planet.unit_vector(c) else {
                continue;
            };
            for n in planet.lateral_neighbors(c).into_iter().flatten() {
                let Some(other) = planet.voxel_at(n).map(|v| v.plate_id) else {
                    continue;
                };
                if other == 0 || other == plate.id {
                    continue;
                }
                let key = (plate.id.min(other), plate.id.max(other));
                let (Some(a), Some(b)) = (planet.plate(key.0), planet.plate(key.1)) else {
                    continue;
                };
                let pair = pairs.entry(key).or_default();
                if pair.voxels.last() == Some(&c) {
                    continue;
                }
                let r = up * radius;
                let relative = b.velocity_at(r) - a.velocity_at(r);
                let axis = LocalFrame::at(up)
                    .tangential(b.center - a.center)
                    .normalize_or_zero();
                if !(relative.is_finite() && axis.is_finite()) {
                    continue;
                }
                pair.voxels.push(c);
                pair.relative += relative;
                pair.axis += axis;
            }
        }
    }

    let boundaries: Vec<Boundary> = pairs
        .into_iter()
        .filter(|(_, acc)| !acc.voxels.is_empty())
        .map(|(plates, acc)| {
            let n = acc.voxels.len() as f64;
            let relative = acc.relative / n;
            let axis = acc.axis.normalize_or_zero();
            Boundary {
                plates,
                kind: classify(relative, axis, params.min_relative_speed_m_per_yr),
                relative_velocity: relative,
                voxels: acc.voxels,
            }
        })
        .collect();

    let count = boundaries.len();
    tracing::debug!(
        boundaries = count,
        divergent = boundaries.iter().filter(|b| b.kind == BoundaryKind::Divergent).count(),
        convergent = boundaries.iter().filter(|b| b.kind == BoundaryKind::Convergent).count(),
        "boundaries classified"
    );
    planet.set_boundaries(boundaries);
    count
}

/// Classify a mean relative velocity against a separation axis.
///
/// Ties between the lateral and separating components go to transform.
pub fn classify(relative: DVec3, axis: DVec3, min_speed: f64) -> BoundaryKind {
    if relative.length() < min_speed || axis == DVec3::ZERO {
        return BoundaryKind::Transform;
    }
    let separating = relative.dot(axis);
    let lateral = (relative - axis * separating).length();
    if lateral >= separating.abs() {
        BoundaryKind::Transform
    } else if separating > 0.0 {
        BoundaryKind::Divergent
    } else {
        BoundaryKind::Convergent
    }
}
