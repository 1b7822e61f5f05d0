//! Isoline (contour) extraction from the interpolated grid using marching
//! squares, with segment chaining into labeled polylines.

use std::collections::HashMap;

use serde::Serialize;

use super::grid::DepthGrid;

/// A polyline of constant depth, in (lon, lat) coordinates. Closed rings
/// repeat their first point at the end.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContourLine {
    /// The isoline's depth label, meters.
    pub depth: f64,
    pub points: Vec<[f64; 2]>,
    pub closed: bool,
}

/// Contour levels for a surface: every integer meter from 1 up to
/// ceil(max_depth) inclusive. Depth 0 is the shoreline, not a contour.
pub fn contour_levels(max_depth: f64) -> Vec<f64> {
    if !max_depth.is_finite() || max_depth <= 0.0 {
        return Vec::new();
    }
    let top = max_depth.ceil() as i64;
    (1..=top).map(|level| level as f64).collect()
}

/// Run marching squares at each level and chain the resulting segments.
/// Levels that the grid never crosses simply contribute no lines.
pub fn extract_isolines(grid: &DepthGrid, levels: &[f64]) -> Vec<ContourLine> {
    let mut isolines = Vec::new();
    for &level in levels {
        let segments = cell_segments(grid, level);
        isolines.extend(chain_segments(level, segments));
    }
    isolines
}

type Endpoint = (f64, f64);

fn cell_segments(grid: &DepthGrid, level: f64) -> Vec<(Endpoint, Endpoint)> {
    let mut segments = Vec::new();
    if grid.cols < 2 || grid.rows < 2 {
        return segments;
    }

    for row in 0..grid.rows - 1 {
        for col in 0..grid.cols - 1 {
            let bl = grid.value(col, row);
            let br = grid.value(col + 1, row);
            let tr = grid.value(col + 1, row + 1);
            let tl = grid.value(col, row + 1);

            let mut case = 0u8;
            if bl >= level {
                case |= 1;
            }
            if br >= level {
                case |= 2;
            }
            if tr >= level {
                case |= 4;
            }
            if tl >= level {
                case |= 8;
            }

            let x0 = grid.node_lon(col);
            let x1 = grid.node_lon(col + 1);
            let y0 = grid.node_lat(row);
            let y1 = grid.node_lat(row + 1);

            let bottom = || (interp(x0, x1, bl, br, level), y0);
            let top = || (interp(x0, x1, tl, tr, level), y1);
            let left = || (x0, interp(y0, y1, bl, tl, level));
            let right = || (x1, interp(y0, y1, br, tr, level));

            match case {
                0 | 15 => {}
                1 | 14 => segments.push((left(), bottom())),
                2 | 13 => segments.push((bottom(), right())),
                3 | 12 => segments.push((left(), right())),
                4 | 11 => segments.push((right(), top())),
                6 | 9 => segments.push((bottom(), top())),
                7 | 8 => segments.push((left(), top())),
                5 | 10 => {
                    // Saddle: disambiguate with the cell center.
                    let center = (bl + br + tr + tl) / 4.0;
                    let center_high = center >= level;
                    if (case == 5) == center_high {
                        segments.push((left(), top()));
                        segments.push((bottom(), right()));
                    } else {
                        segments.push((left(), bottom()));
                        segments.push((right(), top()));
                    }
                }
                _ => unreachable!(),
            }
        }
    }

    segments
}

fn interp(a: f64, b: f64, va: f64, vb: f64, level: f64) -> f64 {
    if (vb - va).abs() < f64::EPSILON {
        return (a + b) / 2.0;
    }
    let t = ((level - va) / (vb - va)).clamp(0.0, 1.0);
    a + t * (b - a)
}

fn quantize(p: Endpoint) -> (i64, i64) {
    ((p.0 * 1e10).round() as i64, (p.1 * 1e10).round() as i64)
}

/// Stitch cell segments into polylines by walking shared endpoints.
fn chain_segments(level: f64, segments: Vec<(Endpoint, Endpoint)>) -> Vec<ContourLine> {
    let mut by_endpoint: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
    for (index, (a, b)) in segments.iter().enumerate() {
        by_endpoint.entry(quantize(*a)).or_default().push(index);
        by_endpoint.entry(quantize(*b)).or_default().push(index);
    }

    let mut used = vec![false; segments.len()];
    let mut lines = Vec::new();

    for start in 0..segments.len() {
        if used[start] {
            continue;
        }
        used[start] = true;

        let (a, b) = segments[start];
        let mut chain = vec![a, b];

        extend_chain(&mut chain, &segments, &by_endpoint, &mut used);
        chain.reverse();
        extend_chain(&mut chain, &segments, &by_endpoint, &mut used);

        let closed = chain.len() > 2 && quantize(chain[0]) == quantize(*chain.last().unwrap());
        lines.push(ContourLine {
            depth: level,
            points: chain.into_iter().map(|(lon, lat)| [lon, lat]).collect(),
            closed,
        });
    }

    lines
}

fn extend_chain(
    chain: &mut Vec<Endpoint>,
    segments: &[(Endpoint, Endpoint)],
    by_endpoint: &HashMap<(i64, i64), Vec<usize>>,
    used: &mut [bool],
) {
    loop {
        let tail = quantize(*chain.last().unwrap());
        let Some(candidates) = by_endpoint.get(&tail) else {
            return;
        };

        let mut advanced = false;
        for &index in candidates {
            if used[index] {
                continue;
            }
            let (a, b) = segments[index];
            let next = if quantize(a) == tail {
                b
            } else if quantize(b) == tail {
                a
            } else {
                continue;
            };
            used[index] = true;
            chain.push(next);
            advanced = true;
            break;
        }

        if !advanced {
            return;
        }
    }
}
