use serde::Serialize;

/// Depth color ramp, shallow to deep: light blue through midnight blue.
const DEPTH_RAMP: [[u8; 3]; 7] = [
    [173, 216, 230], // light blue, 0 m
    [135, 206, 250], // sky blue
    [100, 149, 237], // cornflower
    [65, 105, 225],  // royal blue
    [0, 0, 205],     // medium blue
    [0, 0, 139],     // dark blue
    [25, 25, 112],   // midnight blue, max depth
];

/// Map a depth onto the ramp, scaled to the surface's observed maximum.
/// Piecewise-linear between the seven stops; out-of-range inputs clamp to
/// the ends.
pub fn depth_color(depth: f64, max_depth: f64) -> [u8; 3] {
    if max_depth <= 0.0 || !depth.is_finite() {
        return DEPTH_RAMP[0];
    }

    let ratio = (depth / max_depth).clamp(0.0, 1.0);
    let scaled = ratio * (DEPTH_RAMP.len() - 1) as f64;
    let index = (scaled.floor() as usize).min(DEPTH_RAMP.len() - 2);
    let t = scaled - index as f64;

    let low = DEPTH_RAMP[index];
    let high = DEPTH_RAMP[index + 1];
    let mut color = [0u8; 3];
    for channel in 0..3 {
        color[channel] =
            (low[channel] as f64 + t * (high[channel] as f64 - low[channel] as f64)).round() as u8;
    }
    color
}

pub fn to_css(color: [u8; 3]) -> String {
    format!("rgb({},{},{})", color[0], color[1], color[2])
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendEntry {
    pub depth_m: f64,
    pub color: [u8; 3],
}

/// Legend at the representative depths, plus the observed maximum.
pub fn build_legend(max_depth: f64) -> Vec<LegendEntry> {
    let mut depths = vec![0.0, 5.0, 10.0, 15.0, 20.0];
    depths.push(max_depth.ceil());

    depths
        .into_iter()
        .map(|depth_m| LegendEntry {
            depth_m,
            color: depth_color(depth_m, max_depth),
        })
        .collect()
}
