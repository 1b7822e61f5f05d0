//! Delaunay triangulation over the reading point set (Bowyer–Watson).
//!
//! Inputs are a few thousand points at most, so the O(n²) incremental
//! insertion is plenty. Degenerate configurations (collinear points,
//! coincident circumcenters) shed triangles rather than failing: a thin or
//! empty triangulation still renders.

use std::collections::HashMap;

/// A triangle of the network, as indices into the input point slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle {
    pub a: usize,
    pub b: usize,
    pub c: usize,
}

struct Candidate {
    vertices: [usize; 3],
    center: (f64, f64),
    radius_sq: f64,
}

/// Relative slack on the in-circumcircle test; the coordinate spans here are
/// tiny fractions of a degree and exact predicates are not warranted.
const CIRCUMCIRCLE_SLACK: f64 = 1e-10;

pub fn triangulate(points: &[(f64, f64)]) -> Vec<Triangle> {
    if points.len() < 3 {
        return Vec::new();
    }

    // Work in a local frame around the centroid; lake-sized spans leave too
    // few significant digits when squared at raw geographic coordinates.
    let cx = points.iter().map(|p| p.0).sum::<f64>() / points.len() as f64;
    let cy = points.iter().map(|p| p.1).sum::<f64>() / points.len() as f64;
    let mut verts: Vec<(f64, f64)> = points.iter().map(|p| (p.0 - cx, p.1 - cy)).collect();

    let span = verts
        .iter()
        .map(|v| v.0.abs().max(v.1.abs()))
        .fold(0.0f64, f64::max)
        .max(f64::EPSILON);

    // Super-triangle comfortably containing every point.
    let s = span * 64.0;
    let base = verts.len();
    verts.push((-s, -s));
    verts.push((s, -s));
    verts.push((0.0, s));

    let mut triangles: Vec<Candidate> = Vec::new();
    if let Some(super_tri) = make_candidate(&verts, [base, base + 1, base + 2]) {
        triangles.push(super_tri);
    } else {
        return Vec::new();
    }

    for p in 0..base {
        let point = verts[p];

        let mut bad = Vec::new();
        for (i, tri) in triangles.iter().enumerate() {
            let dx = point.0 - tri.center.0;
            let dy = point.1 - tri.center.1;
            if dx * dx + dy * dy <= tri.radius_sq * (1.0 + CIRCUMCIRCLE_SLACK) {
                bad.push(i);
            }
        }

        // Edges of the cavity: edges of bad triangles not shared by two of
        // them.
        let mut edge_counts: HashMap<(usize, usize), usize> = HashMap::new();
        for &i in &bad {
            let [a, b, c] = triangles[i].vertices;
            for edge in [(a, b), (b, c), (c, a)] {
                let key = (edge.0.min(edge.1), edge.0.max(edge.1));
                *edge_counts.entry(key).or_insert(0) += 1;
            }
        }

        for &i in bad.iter().rev() {
            triangles.swap_remove(i);
        }

        for ((u, v), count) in edge_counts {
            if count != 1 {
                continue;
            }
            if let Some(candidate) = make_candidate(&verts, [u, v, p]) {
                triangles.push(candidate);
            }
        }
    }

    triangles
        .into_iter()
        .filter(|tri| tri.vertices.iter().all(|&v| v < base))
        .map(|tri| Triangle {
            a: tri.vertices[0],
            b: tri.vertices[1],
            c: tri.vertices[2],
        })
        .collect()
}

fn make_candidate(verts: &[(f64, f64)], vertices: [usize; 3]) -> Option<Candidate> {
    let (center, radius_sq) =
        circumcircle(verts[vertices[0]], verts[vertices[1]], verts[vertices[2]])?;
    Some(Candidate {
        vertices,
        center,
        radius_sq,
    })
}

fn circumcircle(
    a: (f64, f64),
    b: (f64, f64),
    c: (f64, f64),
) -> Option<((f64, f64), f64)> {
    let d = 2.0 * (a.0 * (b.1 - c.1) + b.0 * (c.1 - a.1) + c.0 * (a.1 - b.1));
    if d.abs() < f64::MIN_POSITIVE * 1e3 || !d.is_finite() {
        // Collinear (or worse); no circumcircle.
        return None;
    }

    let a2 = a.0 * a.0 + a.1 * a.1;
    let b2 = b.0 * b.0 + b.1 * b.1;
    let c2 = c.0 * c.0 + c.1 * c.1;

    let ux = (a2 * (b.1 - c.1) + b2 * (c.1 - a.1) + c2 * (a.1 - b.1)) / d;
    let uy = (a2 * (c.0 - b.0) + b2 * (a.0 - c.0) + c2 * (b.0 - a.0)) / d;

    let dx = a.0 - ux;
    let dy = a.1 - uy;
    let radius_sq = dx * dx + dy * dy;
    if !radius_sq.is_finite() {
        return None;
    }

    Some(((ux, uy), radius_sq))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fewer_than_three_points_yield_nothing() {
        assert!(triangulate(&[]).is_empty());
        assert!(triangulate(&[(27.5, 53.9), (27.51, 53.9)]).is_empty());
    }

    #[test]
    fn three_points_yield_one_triangle() {
        let tris = triangulate(&[(27.50, 53.90), (27.51, 53.90), (27.505, 53.91)]);
        assert_eq!(tris.len(), 1);
        let mut vertices = vec![tris[0].a, tris[0].b, tris[0].c];
        vertices.sort_unstable();
        assert_eq!(vertices, vec![0, 1, 2]);
    }

    #[test]
    fn square_yields_two_triangles() {
        let tris = triangulate(&[
            (27.500, 53.900),
            (27.501, 53.900),
            (27.501, 53.901),
            (27.500, 53.901),
        ]);
        assert_eq!(tris.len(), 2);
    }

    #[test]
    fn collinear_points_degrade_to_empty() {
        let tris = triangulate(&[(27.50, 53.90), (27.51, 53.90), (27.52, 53.90)]);
        assert!(tris.is_empty());
    }

    #[test]
    fn interior_point_is_connected() {
        // 4 corners plus a center point: every input vertex appears in the
        // triangulation and the triangle count matches a valid Delaunay
        // subdivision (4 triangles around the center).
        let tris = triangulate(&[
            (27.500, 53.900),
            (27.502, 53.900),
            (27.502, 53.902),
            (27.500, 53.902),
            (27.501, 53.901),
        ]);
        assert_eq!(tris.len(), 4);
        let mut used: Vec<usize> = tris
            .iter()
            .flat_map(|t| [t.a, t.b, t.c])
            .collect();
        used.sort_unstable();
        used.dedup();
        assert_eq!(used, vec![0, 1, 2, 3, 4]);
    }
}
