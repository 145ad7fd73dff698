use std::collections::BTreeMap;

use geosphere_common::VoxelCoord;
use geosphere_kernel::{MaterialKind, Planet, Plate, PlateKind};
use glam::DVec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::params::TectonicsParams;

/// Crust thickness assumed for continental voxels (m).
const CONTINENTAL_THICKNESS_M: f64 = 35_000.0;
/// Crust thickness assumed for oceanic voxels (m).
const OCEANIC_THICKNESS_M: f64 = 7_000.0;

/// Seed plates on a fresh planet and run the first identification.
///
/// Centers are spread over the crustal voxels by farthest-point sampling,
/// starting from a random voxel. Each plate gets a uniformly random Euler pole
/// and an angular speed in `[omega_min, omega_max]`. Returns the plate count.
pub fn seed_plates(planet: &mut Planet, params: &TectonicsParams) -> usize {
    let mut rng = StdRng::seed_from_u64(params.seed);
    let crust = planet.crust_shell();
    let candidates: Vec<DVec3> = planet.shells()[crust]
        .iter()
        .filter(|(_, _, v)| v.material().is_crustal())
        .filter_map(|(lat, lon, _)| planet.unit_vector(VoxelCoord::new(crust, lat, lon)))
        .collect();
    let count = params.plate_count.min(candidates.len()).min(u16::MAX as usize);
    if count == 0 {
        planet.set_plates(Vec::new());
        identify_plates(planet);
        return 0;
    }

    let centers = farthest_points(&candidates, count, &mut rng);
    let (lo, hi) = ordered(params.omega_min_rad_per_year, params.omega_max_rad_per_year);
    let plates = centers
        .into_iter()
        .enumerate()
        .map(|(i, center)| {
            let pole_lat = (2.0 * rng.random::<f64>() - 1.0).asin().to_degrees();
            let pole_lon = rng.random::<f64>() * 360.0;
            let omega = lo + (hi - lo) * rng.random::<f64>();
            Plate::new(i as u16 + 1, center, pole_lat, pole_lon, omega)
        })
        .collect();
    planet.set_plates(plates);
    identify_plates(planet);
    tracing::info!(plates = count, "plates seeded");
    count
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b { (a, b) } else { (b, a) }
}

fn farthest_points(candidates: &[DVec3], count: usize, rng: &mut StdRng) -> Vec<DVec3> {
    let first = rng.random_range(0..candidates.len());
    let mut centers = vec![candidates[first]];
    let mut best: Vec<f64> = candidates.iter().map(|p| p.dot(candidates[first])).collect();
    while centers.len() < count {
        let mut pick = 0;
        for (i, &c) in best.iter().enumerate() {
            if c < best[pick] {
                pick = i;
            }
        }
        let center = candidates[pick];
        centers.push(center);
        for (b, p) in best.iter_mut().zip(candidates) {
            *b = b.max(p.dot(center));
        }
    }
    centers
}

/// Reassign crust voxels to the nearest plate center and rebuild plate aggregates.
///
/// Only crustal materials join a plate; every other crust voxel is set to 0.
/// Ties go to the lowest plate id.
pub fn identify_plates(planet: &mut Planet) {
    let crust = planet.crust_shell();
    let mut centers: Vec<(u16, DVec3)> = planet.plates().iter().map(|p| (p.id, p.center)).collect();
    centers.sort_by_key(|&(id, _)| id);

    let ids: Vec<u16> = planet.shells()[crust]
        .iter()
        .map(|(lat, lon, v)| {
            if !v.material().is_crustal() {
                return 0;
            }
            let Some(u) = planet.unit_vector(VoxelCoord::new(crust, lat, lon)) else {
                return 0;
            };
            nearest(&centers, u)
        })
        .collect();

    let mut next = ids.iter().copied();
    let bands = planet.shells()[crust].bands();
    for lat in 0..bands {
        let n = planet.shells()[crust].lon_count(lat);
        for lon in 0..n {
            let c = VoxelCoord::new(crust, lat, lon);
            if let (Some(id), Some(v)) = (next.next(), planet.voxel_at_mut(c)) {
                v.plate_id = id;
            }
        }
    }

    rebuild_plates(planet);
    let time = planet.sim_time();
    planet.set_last_identification(time);
    tracing::debug!(plates = planet.plates().len(), time, "plates identified");
}

fn nearest(centers: &[(u16, DVec3)], u: DVec3) -> u16 {
    let mut best: Option<(u16, f64)> = None;
    for &(id, c) in centers {
        let d = c.dot(u);
        if best.is_none_or(|(_, b)| d > b) {
            best = Some((id, d));
        }
    }
    best.map(|(id, _)| id).unwrap_or(0)
}

#[derive(Default)]
struct Aggregate {
    members: Vec<VoxelCoord>,
    boundary: Vec<VoxelCoord>,
    area: f64,
    age: f64,
    thickness: f64,
    granite: usize,
}

/// Rebuild members, boundary voxels, area, averages and kind of every plate
/// from the plate ids currently stored on the crust shell.
pub fn rebuild_plates(planet: &mut Planet) {
    let crust = planet.crust_shell();
    let mut aggregates: BTreeMap<u16, Aggregate> = planet
        .plates()
        .iter()
        .map(|p| (p.id, Aggregate::default()))
        .collect();

    for (lat, lon, v) in planet.shells()[crust].iter() {
        let Some(agg) = aggregates.get_mut(&v.plate_id) else {
            continue;
        };
        let c = VoxelCoord::new(crust, lat, lon);
        let area = planet.voxel_area(c);
        agg.members.push(c);
        agg.area += area;
        agg.age += v.age * area;
        agg.thickness += area
            * match v.material() {
                MaterialKind::Basalt => OCEANIC_THICKNESS_M,
                _ => CONTINENTAL_THICKNESS_M,
            };
        if v.material() == MaterialKind::Granite {
            agg.granite += 1;
        }
        let on_boundary = planet.lateral_neighbors(c).into_iter().flatten().any(|n| {
            planet
                .voxel_at(n)
                .is_some_and(|nv| nv.plate_id != 0 && nv.plate_id != v.plate_id)
        });
        if on_boundary {
            agg.boundary.push(c);
        }
    }

    for plate in planet.plates_mut() {
        let agg = aggregates.remove(&plate.id).unwrap_or_default();
        let weight = if agg.area > 0.0 { agg.area } else { 1.0 };
        plate.kind = if agg.granite * 2 > agg.members.len() {
            PlateKind::Continental
        } else {
            PlateKind::Oceanic
        };
        plate.area_m2 = agg.area;
        plate.average_age = agg.age / weight;
        plate.average_thickness_m = agg.thickness / weight;
        plate.members = agg.members;
        plate.boundary = agg.boundary;
    }
}
