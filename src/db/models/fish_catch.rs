use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::reading::Position;

/// A logged catch. Independent of depth readings; rendered as its own
/// marker layer and never part of the depth surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FishCatch {
    pub id: String,
    pub species: String,
    pub weight_kg: Option<f64>,
    pub length_cm: Option<f64>,
    pub note: Option<String>,
    #[serde(rename = "coords")]
    pub position: Option<Position>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub caught_at: DateTime<Utc>,
}

impl FishCatch {
    pub fn new(species: impl Into<String>, position: Option<Position>, caught_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            species: species.into(),
            weight_kg: None,
            length_cm: None,
            note: None,
            position,
            caught_at,
        }
    }
}
