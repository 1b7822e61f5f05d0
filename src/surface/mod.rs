//! Depth surface renderer: point filtering, triangulation, interpolation,
//! contour extraction, and overlay classification.
//!
//! Read-only over the reading set. Every call recomputes the full surface;
//! there is no incremental update and no cancellation path.

mod color;
mod config;
mod contour;
mod grid;
mod layers;
mod point;
mod triangulate;
mod vegetation;

pub use color::{build_legend, depth_color, to_css, LegendEntry};
pub use config::{SurfaceConfig, MIN_SURFACE_POINTS};
pub use contour::{contour_levels, ContourLine};
pub use layers::{
    CatchMarker, DepthMarker, DepthSurface, ShorelineMarker, SurfaceOutcome, TriangleFeature,
    VegetationPolygon,
};

use geo::MultiPolygon;
use log::info;

use crate::db::models::{FishCatch, Reading};

use grid::idw_grid;
use point::qualifying_points;
use triangulate::triangulate;
use vegetation::vegetation_cloud;

/// Render the depth surface for a project's reading set.
///
/// `readings` is the union of remote Synced and local Pending readings;
/// `catches` feeds the independent catch marker layer.
pub fn render_depth_surface(
    readings: &[Reading],
    catches: &[FishCatch],
    config: &SurfaceConfig,
) -> SurfaceOutcome {
    let points = qualifying_points(readings, config);
    if points.len() < MIN_SURFACE_POINTS {
        info!(
            "render: {} qualifying points, need {}",
            points.len(),
            MIN_SURFACE_POINTS
        );
        return SurfaceOutcome::InsufficientData {
            qualifying: points.len(),
        };
    }

    let max_depth = points.iter().map(|p| p.depth).fold(0.0f64, f64::max);

    let coords: Vec<(f64, f64)> = points.iter().map(|p| (p.lon, p.lat)).collect();
    let triangles: Vec<TriangleFeature> = triangulate(&coords)
        .into_iter()
        .map(|tri| {
            let mean_depth =
                (points[tri.a].depth + points[tri.b].depth + points[tri.c].depth) / 3.0;
            TriangleFeature {
                vertices: [
                    [points[tri.a].lon, points[tri.a].lat],
                    [points[tri.b].lon, points[tri.b].lat],
                    [points[tri.c].lon, points[tri.c].lat],
                ],
                mean_depth,
                color: depth_color(mean_depth, max_depth),
            }
        })
        .collect();

    let grid = idw_grid(&points, config.cell_size_deg, config.idw_power);
    let levels = contour_levels(max_depth);
    let contours = contour::extract_isolines(&grid, &levels);

    let vegetation = polygons_from(vegetation_cloud(&points, config.vegetation_radius_m));

    let markers: Vec<DepthMarker> = points
        .iter()
        .map(|p| DepthMarker {
            longitude: p.lon,
            latitude: p.lat,
            depth: p.depth,
            color: depth_color(p.depth, max_depth),
            has_vegetation: p.flags.has_vegetation,
        })
        .collect();

    let shoreline: Vec<ShorelineMarker> = points
        .iter()
        .filter(|p| p.flags.is_shoreline)
        .map(|p| ShorelineMarker {
            longitude: p.lon,
            latitude: p.lat,
        })
        .collect();

    let catch_markers: Vec<CatchMarker> = catches
        .iter()
        .filter_map(|c| {
            c.position.map(|pos| CatchMarker {
                longitude: pos.longitude,
                latitude: pos.latitude,
                species: c.species.clone(),
                weight_kg: c.weight_kg,
            })
        })
        .collect();

    let center = [
        points.iter().map(|p| p.lon).sum::<f64>() / points.len() as f64,
        points.iter().map(|p| p.lat).sum::<f64>() / points.len() as f64,
    ];

    info!(
        "render: {} points, {} triangles, {} contour lines, {} vegetation polygons",
        points.len(),
        triangles.len(),
        contours.len(),
        vegetation.len()
    );

    SurfaceOutcome::Layers(Box::new(DepthSurface {
        triangles,
        contours,
        markers,
        vegetation,
        shoreline,
        catches: catch_markers,
        legend: build_legend(max_depth),
        max_depth,
        center,
    }))
}

fn polygons_from(cloud: MultiPolygon<f64>) -> Vec<VegetationPolygon> {
    cloud
        .into_iter()
        .map(|polygon| {
            let (exterior, interiors) = polygon.into_inner();
            VegetationPolygon {
                exterior: exterior.into_iter().map(|c| [c.x, c.y]).collect(),
                interiors: interiors
                    .into_iter()
                    .map(|ring| ring.into_iter().map(|c| [c.x, c.y]).collect())
                    .collect(),
            }
        })
        .collect()
}
