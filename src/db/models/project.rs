use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named collection of readings on the remote store. One project is
/// current per client session; the crate takes the project id as an argument
/// rather than owning that choice.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i64,
    pub name: String,
    /// Meters added uniformly to displayed depths to compensate for seasonal
    /// lake-level changes. Negative when the lake has dropped since capture.
    pub water_level_offset: f64,
    pub created_at: DateTime<Utc>,
}
