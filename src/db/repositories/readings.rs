use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension, Row};

use crate::db::{
    connection::Database,
    helpers::{parse_datetime, position_from_columns, sync_state_from_flag},
    models::{Reading, ReadingFlags},
};

fn row_to_reading(row: &Row) -> Result<Reading> {
    let created_at: String = row.get("created_at")?;
    let latitude: Option<f64> = row.get("latitude")?;
    let longitude: Option<f64> = row.get("longitude")?;
    let accuracy: Option<f64> = row.get("accuracy")?;
    let synced: bool = row.get("synced")?;

    Ok(Reading {
        id: Some(row.get("id")?),
        remote_id: row.get("remote_id")?,
        depth: row.get("depth")?,
        position: position_from_columns(latitude, longitude, accuracy)?,
        flags: ReadingFlags {
            is_shoreline: row.get("is_shoreline")?,
            has_vegetation: row.get("has_vegetation")?,
            has_catch_marker: row.get("has_catch_marker")?,
        },
        captured_at: parse_datetime(&created_at, "created_at")?,
        sync_state: sync_state_from_flag(synced),
    })
}

const READING_COLUMNS: &str = "id, depth, latitude, longitude, accuracy, \
     has_vegetation, is_shoreline, has_catch_marker, created_at, synced, remote_id";

impl Database {
    /// Insert a reading and return its local rowid. One reading per call;
    /// the insert is atomic on its own.
    pub async fn insert_reading(&self, reading: &Reading) -> Result<i64> {
        let record = reading.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO readings (depth, latitude, longitude, accuracy,
                     has_vegetation, is_shoreline, has_catch_marker, created_at, synced, remote_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    record.depth,
                    record.position.map(|p| p.latitude),
                    record.position.map(|p| p.longitude),
                    record.position.map(|p| p.accuracy_m),
                    record.flags.has_vegetation,
                    record.flags.is_shoreline,
                    record.flags.has_catch_marker,
                    record.captured_at.to_rfc3339(),
                    !record.is_pending(),
                    record.remote_id,
                ],
            )
            .context("failed to insert reading")?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    pub async fn get_reading(&self, id: i64) -> Result<Option<Reading>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {READING_COLUMNS} FROM readings WHERE id = ?1"
            ))?;
            let row = stmt
                .query_row(params![id], |row| {
                    Ok(row_to_reading(row))
                })
                .optional()?;
            row.transpose()
        })
        .await
    }

    /// All local readings, newest first (the data screen's ordering).
    pub async fn list_readings(&self) -> Result<Vec<Reading>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {READING_COLUMNS} FROM readings ORDER BY created_at DESC"
            ))?;
            collect_readings(&mut stmt, params![])
        })
        .await
    }

    /// Pending readings in capture order, the shape a sync batch wants.
    pub async fn list_pending(&self) -> Result<Vec<Reading>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {READING_COLUMNS} FROM readings WHERE synced = 0 ORDER BY created_at ASC"
            ))?;
            collect_readings(&mut stmt, params![])
        })
        .await
    }

    pub async fn pending_count(&self) -> Result<u64> {
        self.execute(|conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM readings WHERE synced = 0", [], |row| {
                    row.get(0)
                })?;
            Ok(count as u64)
        })
        .await
    }

    /// The most recently captured reading, if any.
    pub async fn latest_reading(&self) -> Result<Option<Reading>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {READING_COLUMNS} FROM readings ORDER BY created_at DESC, id DESC LIMIT 1"
            ))?;
            let row = stmt
                .query_row(params![], |row| Ok(row_to_reading(row)))
                .optional()?;
            row.transpose()
        })
        .await
    }

    /// Flip a batch of readings to Synced, recording the remote id each one
    /// was acknowledged under. All or nothing: one transaction.
    pub async fn mark_synced(&self, acknowledged: Vec<(i64, i64)>) -> Result<()> {
        self.execute(move |conn| {
            let tx = conn.transaction().context("failed to open mark_synced transaction")?;
            for (local_id, remote_id) in &acknowledged {
                tx.execute(
                    "UPDATE readings SET synced = 1, remote_id = ?1 WHERE id = ?2",
                    params![remote_id, local_id],
                )
                .with_context(|| format!("failed to mark reading {local_id} synced"))?;
            }
            tx.commit().context("failed to commit mark_synced")?;
            Ok(())
        })
        .await
    }

    pub async fn update_reading_flags(&self, id: i64, flags: ReadingFlags) -> Result<()> {
        self.execute(move |conn| {
            let changed = conn
                .execute(
                    "UPDATE readings
                     SET has_vegetation = ?1, is_shoreline = ?2, has_catch_marker = ?3
                     WHERE id = ?4",
                    params![
                        flags.has_vegetation,
                        flags.is_shoreline,
                        flags.has_catch_marker,
                        id
                    ],
                )
                .context("failed to update reading flags")?;
            if changed == 0 {
                anyhow::bail!("no local reading with id {id}");
            }
            Ok(())
        })
        .await
    }

    pub async fn delete_reading(&self, id: i64) -> Result<()> {
        self.execute(move |conn| {
            conn.execute("DELETE FROM readings WHERE id = ?1", params![id])
                .context("failed to delete reading")?;
            Ok(())
        })
        .await
    }

    /// Drop every local reading. The reference app's "clear all" action.
    pub async fn clear_readings(&self) -> Result<()> {
        self.execute(|conn| {
            conn.execute("DELETE FROM readings", [])
                .context("failed to clear readings")?;
            Ok(())
        })
        .await
    }
}

fn collect_readings(
    stmt: &mut rusqlite::Statement<'_>,
    params: impl rusqlite::Params,
) -> Result<Vec<Reading>> {
    let mut rows = stmt.query(params)?;
    let mut readings = Vec::new();
    while let Some(row) = rows.next()? {
        readings.push(row_to_reading(row)?);
    }
    Ok(readings)
}
