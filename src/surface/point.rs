use std::collections::HashSet;

use crate::db::models::{Reading, ReadingFlags};

use super::config::SurfaceConfig;

/// One reading admitted into the surface pipeline, in (lon, lat) axis order.
#[derive(Debug, Clone, Copy)]
pub struct SurfacePoint {
    pub lon: f64,
    pub lat: f64,
    /// Depth with the project's water level offset already applied.
    pub depth: f64,
    pub flags: ReadingFlags,
}

/// Accuracy-filter and coordinate-deduplicate the render input.
///
/// Keeps readings with a position whose accuracy is within bounds
/// (inclusive), applies the water level offset, and drops exact coordinate
/// duplicates — first occurrence wins; duplicate coordinates would make the
/// triangulation degenerate.
pub fn qualifying_points(readings: &[Reading], config: &SurfaceConfig) -> Vec<SurfacePoint> {
    let mut seen: HashSet<(u64, u64)> = HashSet::new();
    let mut points = Vec::new();

    for reading in readings {
        let Some(position) = reading.position else {
            continue;
        };
        if position.accuracy_m > config.max_accuracy_m {
            continue;
        }
        if !seen.insert(position.coordinate_key()) {
            continue;
        }
        points.push(SurfacePoint {
            lon: position.longitude,
            lat: position.latitude,
            depth: reading.depth + config.water_level_offset_m,
            flags: reading.flags,
        });
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{Position, SyncState};
    use chrono::DateTime;

    fn reading(lat: f64, lon: f64, accuracy: f64, depth: f64) -> Reading {
        Reading {
            id: None,
            remote_id: None,
            depth,
            position: Some(Position {
                latitude: lat,
                longitude: lon,
                accuracy_m: accuracy,
            }),
            flags: ReadingFlags::default(),
            captured_at: DateTime::from_timestamp_millis(1_700_000_000_000).unwrap(),
            sync_state: SyncState::Pending,
        }
    }

    #[test]
    fn accuracy_boundary_is_inclusive() {
        let readings = vec![
            reading(53.9, 27.50, 50.0, 3.0),
            reading(53.9, 27.51, 51.0, 4.0),
        ];
        let points = qualifying_points(&readings, &SurfaceConfig::default());
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].depth, 3.0);
    }

    #[test]
    fn positionless_readings_are_excluded() {
        let mut r = reading(53.9, 27.5, 10.0, 3.0);
        r.position = None;
        let points = qualifying_points(&[r], &SurfaceConfig::default());
        assert!(points.is_empty());
    }

    #[test]
    fn exact_duplicates_keep_first_occurrence() {
        let readings = vec![
            reading(53.9, 27.5, 10.0, 3.0),
            reading(53.9, 27.5, 8.0, 9.0),
        ];
        let points = qualifying_points(&readings, &SurfaceConfig::default());
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].depth, 3.0);
    }

    #[test]
    fn water_level_offset_shifts_depths() {
        let config = SurfaceConfig {
            water_level_offset_m: -0.5,
            ..Default::default()
        };
        let points = qualifying_points(&[reading(53.9, 27.5, 10.0, 3.0)], &config);
        assert_eq!(points[0].depth, 2.5);
    }
}
