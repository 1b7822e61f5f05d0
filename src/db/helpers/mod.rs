use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};

use crate::db::models::{Position, SyncState};

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}

/// Reassemble an optional position from its three nullable columns. A row
/// either has both coordinates or neither; accuracy may be missing on rows
/// imported from sources that never reported one.
pub fn position_from_columns(
    latitude: Option<f64>,
    longitude: Option<f64>,
    accuracy: Option<f64>,
) -> Result<Option<Position>> {
    match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Ok(Some(Position {
            latitude,
            longitude,
            accuracy_m: accuracy.unwrap_or(0.0),
        })),
        (None, None) => Ok(None),
        _ => Err(anyhow!("reading row has a dangling coordinate column")),
    }
}

pub fn sync_state_from_flag(synced: bool) -> SyncState {
    if synced {
        SyncState::Synced
    } else {
        SyncState::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_requires_both_coordinates() {
        assert!(position_from_columns(Some(53.9), None, None).is_err());
        assert!(position_from_columns(None, Some(27.5), None).is_err());
        assert!(position_from_columns(None, None, Some(5.0)).unwrap().is_none());

        let pos = position_from_columns(Some(53.9), Some(27.5), None)
            .unwrap()
            .unwrap();
        assert_eq!(pos.accuracy_m, 0.0);
    }
}
