use log::warn;

use super::point::SurfacePoint;

/// Hard ceiling on interpolation nodes; a point set that would exceed it
/// gets a coarser cell size instead of an unbounded allocation.
const MAX_GRID_NODES: usize = 512 * 512;

/// A regular scalar grid of interpolated depths, row-major from the
/// south-west corner.
#[derive(Debug, Clone)]
pub struct DepthGrid {
    pub min_lon: f64,
    pub min_lat: f64,
    pub cell_size: f64,
    pub cols: usize,
    pub rows: usize,
    pub values: Vec<f64>,
}

impl DepthGrid {
    pub fn value(&self, col: usize, row: usize) -> f64 {
        self.values[row * self.cols + col]
    }

    pub fn node_lon(&self, col: usize) -> f64 {
        self.min_lon + col as f64 * self.cell_size
    }

    pub fn node_lat(&self, row: usize) -> f64 {
        self.min_lat + row as f64 * self.cell_size
    }
}

/// Inverse-distance-weighted interpolation of the point set onto a regular
/// grid covering its bounding region. Distances are angular, matching the
/// cell size unit; a node coinciding with a sample takes that sample's depth
/// exactly.
pub fn idw_grid(points: &[SurfacePoint], cell_size: f64, power: f64) -> DepthGrid {
    debug_assert!(!points.is_empty());

    let min_lon = points.iter().map(|p| p.lon).fold(f64::INFINITY, f64::min);
    let max_lon = points.iter().map(|p| p.lon).fold(f64::NEG_INFINITY, f64::max);
    let min_lat = points.iter().map(|p| p.lat).fold(f64::INFINITY, f64::min);
    let max_lat = points.iter().map(|p| p.lat).fold(f64::NEG_INFINITY, f64::max);

    let mut cell = cell_size;
    let span_lon = max_lon - min_lon;
    let span_lat = max_lat - min_lat;

    let node_count = |cell: f64| {
        let cols = (span_lon / cell).ceil() as usize + 1;
        let rows = (span_lat / cell).ceil() as usize + 1;
        (cols, rows)
    };

    let (mut cols, mut rows) = node_count(cell);
    if cols * rows > MAX_GRID_NODES {
        let scale = ((cols * rows) as f64 / MAX_GRID_NODES as f64).sqrt();
        cell *= scale;
        (cols, rows) = node_count(cell);
        warn!(
            "interpolation grid clamped to {cols}x{rows} nodes (cell size {cell:.7}°)"
        );
    }

    let mut values = Vec::with_capacity(cols * rows);
    for row in 0..rows {
        let lat = min_lat + row as f64 * cell;
        for col in 0..cols {
            let lon = min_lon + col as f64 * cell;
            values.push(idw_at(points, lon, lat, power));
        }
    }

    DepthGrid {
        min_lon,
        min_lat,
        cell_size: cell,
        cols,
        rows,
        values,
    }
}

fn idw_at(points: &[SurfacePoint], lon: f64, lat: f64, power: f64) -> f64 {
    let mut weight_sum = 0.0;
    let mut weighted_depth = 0.0;

    for point in points {
        let dx = lon - point.lon;
        let dy = lat - point.lat;
        let dist_sq = dx * dx + dy * dy;
        if dist_sq < 1e-24 {
            return point.depth;
        }
        let weight = 1.0 / dist_sq.powf(power / 2.0);
        weight_sum += weight;
        weighted_depth += weight * point.depth;
    }

    weighted_depth / weight_sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::ReadingFlags;

    fn point(lon: f64, lat: f64, depth: f64) -> SurfacePoint {
        SurfacePoint {
            lon,
            lat,
            depth,
            flags: ReadingFlags::default(),
        }
    }

    #[test]
    fn grid_covers_bounding_box() {
        let points = vec![
            point(27.5000, 53.9000, 2.0),
            point(27.5002, 53.9000, 4.0),
            point(27.5001, 53.9002, 6.0),
        ];
        let grid = idw_grid(&points, 0.00005, 2.0);

        assert_eq!(grid.min_lon, 27.5000);
        assert_eq!(grid.min_lat, 53.9000);
        assert!(grid.cols >= 5);
        assert!(grid.rows >= 5);
        assert_eq!(grid.values.len(), grid.cols * grid.rows);
    }

    #[test]
    fn node_on_sample_takes_sample_depth() {
        let points = vec![
            point(27.5000, 53.9000, 2.0),
            point(27.5002, 53.9000, 4.0),
        ];
        let grid = idw_grid(&points, 0.0001, 2.0);
        assert_eq!(grid.value(0, 0), 2.0);
    }

    #[test]
    fn interpolated_values_stay_within_sample_range() {
        let points = vec![
            point(27.5000, 53.9000, 2.0),
            point(27.5002, 53.9000, 4.0),
            point(27.5001, 53.9002, 6.0),
        ];
        let grid = idw_grid(&points, 0.00005, 2.0);
        for value in &grid.values {
            assert!(
                (2.0..=6.0).contains(value),
                "IDW must not extrapolate beyond sample depths, got {value}"
            );
        }
    }

    #[test]
    fn oversized_extent_clamps_node_count() {
        let points = vec![
            point(27.0, 53.0, 2.0),
            point(28.0, 54.0, 4.0),
            point(27.5, 53.5, 6.0),
        ];
        let grid = idw_grid(&points, 0.00005, 2.0);
        assert!(grid.cols * grid.rows <= MAX_GRID_NODES + grid.cols + grid.rows + 1);
    }
}
