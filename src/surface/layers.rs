//! Output layer types handed to the consuming map view. Each layer is
//! independently toggleable; the renderer just produces them all.

use serde::Serialize;

use super::color::LegendEntry;
use super::contour::ContourLine;

/// One triangle of the fill layer, colored by the mean depth of its
/// vertices.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriangleFeature {
    /// Corner coordinates, (lon, lat).
    pub vertices: [[f64; 2]; 3],
    pub mean_depth: f64,
    pub color: [u8; 3],
}

/// A depth sample marker.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepthMarker {
    pub longitude: f64,
    pub latitude: f64,
    pub depth: f64,
    pub color: [u8; 3],
    pub has_vegetation: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShorelineMarker {
    pub longitude: f64,
    pub latitude: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatchMarker {
    pub longitude: f64,
    pub latitude: f64,
    pub species: String,
    pub weight_kg: Option<f64>,
}

/// A vegetation polygon in plain coordinate lists, outer ring first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VegetationPolygon {
    pub exterior: Vec<[f64; 2]>,
    pub interiors: Vec<Vec<[f64; 2]>>,
}

/// The rendered depth surface: overlay layers plus legend. Derived from the
/// reading set on every render, never persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepthSurface {
    pub triangles: Vec<TriangleFeature>,
    pub contours: Vec<ContourLine>,
    pub markers: Vec<DepthMarker>,
    pub vegetation: Vec<VegetationPolygon>,
    pub shoreline: Vec<ShorelineMarker>,
    pub catches: Vec<CatchMarker>,
    pub legend: Vec<LegendEntry>,
    /// Deepest qualifying reading, after water level adjustment.
    pub max_depth: f64,
    /// Centroid of the point set, (lon, lat); where the view should center.
    pub center: [f64; 2],
}

/// Terminal outcome of a render call. Too few qualifying points is a state
/// the caller displays, not an error it handles.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase", tag = "outcome")]
pub enum SurfaceOutcome {
    Layers(Box<DepthSurface>),
    InsufficientData { qualifying: usize },
}

impl SurfaceOutcome {
    pub fn layers(&self) -> Option<&DepthSurface> {
        match self {
            SurfaceOutcome::Layers(surface) => Some(surface),
            SurfaceOutcome::InsufficientData { .. } => None,
        }
    }
}
