//! Depth reading data model.
//!
//! One keypad entry: a depth in meters, the GPS position it was taken at
//! (when one was available), and its place in the local/remote lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A GPS position attached to a reading at capture time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    /// Reported horizontal accuracy in meters. 0 means the source did not
    /// report one.
    #[serde(rename = "accuracy")]
    pub accuracy_m: f64,
}

impl Position {
    /// Exact-coordinate identity used for duplicate detection. Accuracy is
    /// deliberately excluded: two fixes at the same coordinates are the same
    /// spot regardless of how confident the receiver was.
    pub fn coordinate_key(&self) -> (u64, u64) {
        (self.latitude.to_bits(), self.longitude.to_bits())
    }
}

/// Marker flags, independently togglable after capture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingFlags {
    #[serde(default)]
    pub is_shoreline: bool,
    #[serde(default)]
    pub has_vegetation: bool,
    #[serde(default)]
    pub has_catch_marker: bool,
}

/// Lifecycle state of a reading from the client's perspective.
///
/// Pending readings exist only in the local store. A reading becomes Synced
/// exactly once, when the remote store acknowledges it, and never goes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncState {
    Pending,
    Synced,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    /// Local store rowid; None until inserted locally (e.g. rows listed from
    /// the remote store).
    pub id: Option<i64>,
    /// Remote store identity; present iff `sync_state` is Synced.
    pub remote_id: Option<i64>,
    /// Depth in meters, non-negative.
    pub depth: f64,
    #[serde(rename = "coords")]
    pub position: Option<Position>,
    #[serde(flatten)]
    pub flags: ReadingFlags,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub captured_at: DateTime<Utc>,
    pub sync_state: SyncState,
}

impl Reading {
    pub fn is_pending(&self) -> bool {
        self.sync_state == SyncState::Pending
    }

    pub fn coordinate_key(&self) -> Option<(u64, u64)> {
        self.position.map(|p| p.coordinate_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_key_ignores_accuracy() {
        let a = Position {
            latitude: 53.90001,
            longitude: 27.55012,
            accuracy_m: 8.0,
        };
        let b = Position {
            latitude: 53.90001,
            longitude: 27.55012,
            accuracy_m: 31.0,
        };
        assert_eq!(a.coordinate_key(), b.coordinate_key());

        let c = Position {
            latitude: 53.90002,
            longitude: 27.55012,
            accuracy_m: 8.0,
        };
        assert_ne!(a.coordinate_key(), c.coordinate_key());
    }

    #[test]
    fn reading_serializes_wire_shape() {
        let reading = Reading {
            id: Some(4),
            remote_id: None,
            depth: 3.5,
            position: Some(Position {
                latitude: 53.9,
                longitude: 27.55,
                accuracy_m: 12.0,
            }),
            flags: ReadingFlags {
                has_vegetation: true,
                ..Default::default()
            },
            captured_at: DateTime::from_timestamp_millis(1_700_000_000_000).unwrap(),
            sync_state: SyncState::Pending,
        };

        let value = serde_json::to_value(&reading).unwrap();
        assert_eq!(value["coords"]["accuracy"], 12.0);
        assert_eq!(value["hasVegetation"], true);
        assert_eq!(value["capturedAt"], 1_700_000_000_000i64);
        assert_eq!(value["syncState"], "pending");
    }
}
