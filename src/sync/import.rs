//! Import payload normalization.
//!
//! Export files cross schema generations: the oldest carry a flat
//! latitude/longitude pair and a `hasFish` boolean, newer ones a nested
//! `coords` object and `hasVegetation`. The shape is resolved exactly once
//! here, producing canonical [`Reading`] values; nothing downstream branches
//! on payload shape again.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::db::models::{Position, Reading, ReadingFlags, SyncState};
use crate::error::SyncError;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCoords {
    latitude: Option<f64>,
    longitude: Option<f64>,
    accuracy: Option<f64>,
}

/// Superset of every shape this system has ever exported.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReading {
    depth: Option<f64>,
    coords: Option<RawCoords>,
    // Flat coordinates predate the nested coords object.
    latitude: Option<f64>,
    longitude: Option<f64>,
    accuracy: Option<f64>,
    /// Legacy flag, reinterpreted as vegetation (deliberate semantic rename
    /// across schema generations).
    #[serde(alias = "has_fish")]
    has_fish: Option<bool>,
    #[serde(alias = "has_vegetation")]
    has_vegetation: Option<bool>,
    #[serde(alias = "is_shoreline")]
    is_shoreline: Option<bool>,
    #[serde(alias = "has_catch_marker")]
    has_catch_marker: Option<bool>,
    #[serde(alias = "created_at")]
    created_at: Option<i64>,
    captured_at: Option<i64>,
}

/// Parse an import payload into canonical readings. Accepts a bare array or
/// a `{"readings": [...]}` wrapper. Rejects, before any store mutation:
/// unparseable JSON, payloads with no records, and records without a usable
/// depth.
pub(crate) fn parse_payload(payload: &str, now: DateTime<Utc>) -> Result<Vec<Reading>, SyncError> {
    let value: Value = serde_json::from_str(payload)
        .map_err(|err| SyncError::MalformedImport(format!("not valid JSON: {err}")))?;

    let records = match &value {
        Value::Array(records) => records.as_slice(),
        Value::Object(map) => match map.get("readings") {
            Some(Value::Array(records)) => records.as_slice(),
            Some(_) => {
                return Err(SyncError::MalformedImport(
                    "\"readings\" is not an array".into(),
                ))
            }
            None => {
                return Err(SyncError::MalformedImport(
                    "expected an array or a {\"readings\": [...]} object".into(),
                ))
            }
        },
        _ => {
            return Err(SyncError::MalformedImport(
                "expected an array or a {\"readings\": [...]} object".into(),
            ))
        }
    };

    if records.is_empty() {
        return Err(SyncError::EmptyImport);
    }

    let mut readings = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        let raw: RawReading = serde_json::from_value(record.clone())
            .map_err(|err| SyncError::MalformedImport(format!("record {index}: {err}")))?;
        readings.push(normalize(raw, now).map_err(|reason| {
            SyncError::MalformedImport(format!("record {index}: {reason}"))
        })?);
    }

    Ok(readings)
}

fn normalize(raw: RawReading, now: DateTime<Utc>) -> Result<Reading, String> {
    let depth = raw.depth.ok_or("missing depth")?;
    if !depth.is_finite() || depth < 0.0 {
        return Err(format!("depth {depth} is not a non-negative number"));
    }

    let position = normalize_position(&raw)?;

    let flags = ReadingFlags {
        is_shoreline: raw.is_shoreline.unwrap_or(false),
        // The vegetation field wins when present; otherwise the legacy
        // catch boolean carries the meaning.
        has_vegetation: raw.has_vegetation.or(raw.has_fish).unwrap_or(false),
        has_catch_marker: raw.has_catch_marker.unwrap_or(false),
    };

    let captured_at = raw
        .captured_at
        .or(raw.created_at)
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or(now);

    Ok(Reading {
        id: None,
        remote_id: None,
        depth,
        position,
        flags,
        captured_at,
        sync_state: SyncState::Synced,
    })
}

fn normalize_position(raw: &RawReading) -> Result<Option<Position>, String> {
    // Nested coords win over the flat legacy fields.
    let (latitude, longitude, accuracy) = match &raw.coords {
        Some(coords) => (coords.latitude, coords.longitude, coords.accuracy),
        None => (raw.latitude, raw.longitude, raw.accuracy),
    };

    match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => {
            if !latitude.is_finite() || !longitude.is_finite() {
                return Err("non-finite coordinates".into());
            }
            Ok(Some(Position {
                latitude,
                longitude,
                accuracy_m: accuracy.unwrap_or(0.0),
            }))
        }
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_700_000_000_000).unwrap()
    }

    #[test]
    fn rejects_non_json() {
        let err = parse_payload("not json at all", now()).unwrap_err();
        assert!(matches!(err, SyncError::MalformedImport(_)));
    }

    #[test]
    fn rejects_empty_payload() {
        let err = parse_payload("[]", now()).unwrap_err();
        assert!(matches!(err, SyncError::EmptyImport));

        let err = parse_payload(r#"{"readings": []}"#, now()).unwrap_err();
        assert!(matches!(err, SyncError::EmptyImport));
    }

    #[test]
    fn rejects_record_without_depth() {
        let err = parse_payload(r#"[{"latitude": 53.9, "longitude": 27.5}]"#, now()).unwrap_err();
        match err {
            SyncError::MalformedImport(reason) => assert!(reason.contains("record 0")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn accepts_wrapper_object() {
        let readings =
            parse_payload(r#"{"readings": [{"depth": 2.5}]}"#, now()).unwrap();
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].depth, 2.5);
        assert!(readings[0].position.is_none());
        assert_eq!(readings[0].captured_at, now());
    }

    #[test]
    fn legacy_has_fish_becomes_vegetation() {
        let readings = parse_payload(
            r#"[{"depth": 4.0, "latitude": 53.9, "longitude": 27.5, "has_fish": true}]"#,
            now(),
        )
        .unwrap();
        assert!(readings[0].flags.has_vegetation);
        assert!(!readings[0].flags.has_catch_marker);
    }

    #[test]
    fn vegetation_field_wins_over_legacy_flag() {
        let readings = parse_payload(
            r#"[{"depth": 4.0, "hasFish": true, "hasVegetation": false}]"#,
            now(),
        )
        .unwrap();
        assert!(!readings[0].flags.has_vegetation);
    }

    #[test]
    fn nested_coords_win_over_flat_fields() {
        let readings = parse_payload(
            r#"[{"depth": 1.5,
                 "coords": {"latitude": 53.91, "longitude": 27.51, "accuracy": 9.0},
                 "latitude": 0.0, "longitude": 0.0}]"#,
            now(),
        )
        .unwrap();
        let pos = readings[0].position.unwrap();
        assert_eq!(pos.latitude, 53.91);
        assert_eq!(pos.accuracy_m, 9.0);
    }

    #[test]
    fn legacy_created_at_fills_capture_time() {
        let readings = parse_payload(r#"[{"depth": 2.0, "created_at": 1600000000000}]"#, now())
            .unwrap();
        assert_eq!(
            readings[0].captured_at,
            DateTime::from_timestamp_millis(1_600_000_000_000).unwrap()
        );
    }
}
