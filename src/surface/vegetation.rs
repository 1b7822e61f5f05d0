//! Vegetation cloud: buffer each flagged point into a disk polygon and fold
//! the disks through a best-effort pairwise union.

use std::panic::{catch_unwind, AssertUnwindSafe};

use geo::{BooleanOps, LineString, MultiPolygon, Polygon};
use log::warn;

use super::point::SurfacePoint;

const DISK_VERTICES: usize = 24;

/// Meters per degree of latitude; longitude is corrected by cos(lat).
const METERS_PER_DEGREE: f64 = 111_320.0;

/// Union all vegetation disks into one polygon collection.
///
/// The fold is best-effort: a union step that fails keeps the accumulator
/// unchanged, and if every step fails the unjoined disk set is returned
/// instead. A single point needs no union at all.
pub fn vegetation_cloud(points: &[SurfacePoint], radius_m: f64) -> MultiPolygon<f64> {
    let disks: Vec<Polygon<f64>> = points
        .iter()
        .filter(|p| p.flags.has_vegetation)
        .map(|p| disk(p.lon, p.lat, radius_m))
        .collect();

    if disks.len() <= 1 {
        return MultiPolygon::new(disks);
    }

    let mut accumulator = MultiPolygon::new(vec![disks[0].clone()]);
    let mut failures = 0usize;

    for next in &disks[1..] {
        let addition = MultiPolygon::new(vec![next.clone()]);
        match try_union(&accumulator, &addition) {
            Ok(merged) => accumulator = merged,
            Err(()) => {
                failures += 1;
                warn!("vegetation union step failed; keeping previous accumulator");
            }
        }
    }

    if failures == disks.len() - 1 {
        // Nothing merged at all; fall back to the raw disk set.
        warn!("vegetation union failed entirely; rendering unjoined disks");
        return MultiPolygon::new(disks);
    }

    accumulator
}

/// The union itself is outside our control and may panic on degenerate
/// input; contain that to one fold step.
fn try_union(
    accumulator: &MultiPolygon<f64>,
    addition: &MultiPolygon<f64>,
) -> Result<MultiPolygon<f64>, ()> {
    catch_unwind(AssertUnwindSafe(|| accumulator.union(addition))).map_err(|_| ())
}

fn disk(lon: f64, lat: f64, radius_m: f64) -> Polygon<f64> {
    let radius_lat = radius_m / METERS_PER_DEGREE;
    let radius_lon = radius_m / (METERS_PER_DEGREE * lat.to_radians().cos().max(1e-6));

    let ring: Vec<(f64, f64)> = (0..DISK_VERTICES)
        .map(|step| {
            let angle = std::f64::consts::TAU * step as f64 / DISK_VERTICES as f64;
            (
                lon + radius_lon * angle.cos(),
                lat + radius_lat * angle.sin(),
            )
        })
        .collect();

    Polygon::new(LineString::from(ring), Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::ReadingFlags;

    fn veg_point(lon: f64, lat: f64) -> SurfacePoint {
        SurfacePoint {
            lon,
            lat,
            depth: 3.0,
            flags: ReadingFlags {
                has_vegetation: true,
                ..Default::default()
            },
        }
    }

    fn plain_point(lon: f64, lat: f64) -> SurfacePoint {
        SurfacePoint {
            lon,
            lat,
            depth: 3.0,
            flags: ReadingFlags::default(),
        }
    }

    #[test]
    fn no_vegetation_points_yield_empty_cloud() {
        let cloud = vegetation_cloud(&[plain_point(27.5, 53.9)], 12.0);
        assert!(cloud.0.is_empty());
    }

    #[test]
    fn single_point_yields_one_disk_without_union() {
        let cloud = vegetation_cloud(&[veg_point(27.5, 53.9)], 12.0);
        assert_eq!(cloud.0.len(), 1);
        assert_eq!(cloud.0[0].exterior().0.len(), DISK_VERTICES + 1);
    }

    #[test]
    fn distant_points_stay_separate() {
        // ~100 m apart at this latitude, far beyond a 12 m buffer diameter.
        let cloud = vegetation_cloud(
            &[veg_point(27.5000, 53.9000), veg_point(27.5015, 53.9000)],
            12.0,
        );
        assert_eq!(cloud.0.len(), 2);
    }

    #[test]
    fn overlapping_points_merge_into_one_polygon() {
        // ~7 m apart, well inside a 12 m buffer diameter.
        let cloud = vegetation_cloud(
            &[veg_point(27.50000, 53.90000), veg_point(27.50010, 53.90000)],
            12.0,
        );
        assert_eq!(cloud.0.len(), 1);
    }
}
