//! SQLite-backed implementation of the remote store contract.
//!
//! Mirrors the reference server's relational store: project-scoped readings,
//! transactional batch insert. In deployment the same contract sits behind a
//! network boundary; here it also serves as the in-process store for tests
//! and single-machine setups.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};

use crate::db::{
    connection::Database,
    helpers::{parse_datetime, position_from_columns},
    models::{Project, Reading, ReadingFlags, SyncState},
};
use crate::error::RemoteError;

use super::remote::RemoteStore;

const CURRENT_REMOTE_SCHEMA_VERSION: i32 = 2;

fn run_remote_migrations(conn: &mut Connection) -> Result<()> {
    let mut version: i32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .context("failed to read user_version pragma")?;

    if version > CURRENT_REMOTE_SCHEMA_VERSION {
        bail!(
            "remote database version ({}) is newer than supported schema ({})",
            version,
            CURRENT_REMOTE_SCHEMA_VERSION
        );
    }

    if version == CURRENT_REMOTE_SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn
        .transaction()
        .context("failed to open migration transaction")?;

    while version < CURRENT_REMOTE_SCHEMA_VERSION {
        let next_version = version + 1;
        apply_remote_migration(&tx, next_version)
            .with_context(|| format!("remote migration to version {next_version} failed"))?;
        version = next_version;
    }

    tx.pragma_update(None, "user_version", CURRENT_REMOTE_SCHEMA_VERSION)
        .context("failed to update user_version pragma")?;
    tx.commit().context("failed to commit migrations")?;

    Ok(())
}

fn apply_remote_migration(tx: &Transaction<'_>, version: i32) -> Result<()> {
    match version {
        1 => {
            tx.execute_batch(include_str!("schemas/remote_v1.sql"))
                .context("failed to execute remote_v1.sql")?;
            Ok(())
        }
        2 => {
            tx.execute_batch(include_str!("schemas/remote_v2.sql"))
                .context("failed to execute remote_v2.sql")?;
            Ok(())
        }
        _ => bail!("unknown remote migration target version: {version}"),
    }
}

fn row_to_remote_reading(row: &Row) -> Result<Reading> {
    let created_at: String = row.get("created_at")?;
    let latitude: Option<f64> = row.get("latitude")?;
    let longitude: Option<f64> = row.get("longitude")?;
    let accuracy: Option<f64> = row.get("accuracy")?;

    Ok(Reading {
        id: None,
        remote_id: Some(row.get("id")?),
        depth: row.get("depth")?,
        position: position_from_columns(latitude, longitude, accuracy)?,
        flags: ReadingFlags {
            is_shoreline: row.get("is_shoreline")?,
            has_vegetation: row.get("has_vegetation")?,
            has_catch_marker: row.get("has_catch_marker")?,
        },
        captured_at: parse_datetime(&created_at, "created_at")?,
        sync_state: SyncState::Synced,
    })
}

fn row_to_project(row: &Row) -> Result<Project> {
    let created_at: String = row.get("created_at")?;
    Ok(Project {
        id: row.get("id")?,
        name: row.get("name")?,
        water_level_offset: row.get("water_level_offset")?,
        created_at: parse_datetime(&created_at, "created_at")?,
    })
}

fn remote_err(err: anyhow::Error) -> RemoteError {
    RemoteError::Internal(format!("{err:#}"))
}

#[derive(Clone)]
pub struct SqliteRemoteStore {
    db: Database,
}

impl SqliteRemoteStore {
    pub fn new(db_path: PathBuf) -> Result<Self> {
        let db = Database::open(db_path, run_remote_migrations, "lakelog-remote-db")?;
        Ok(Self { db })
    }

    pub async fn create_project(&self, name: &str) -> Result<Project> {
        let name = name.trim().to_string();
        if name.is_empty() {
            bail!("project name required");
        }
        let created_at = Utc::now();
        self.db
            .execute(move |conn| {
                conn.execute(
                    "INSERT INTO projects (name, created_at) VALUES (?1, ?2)",
                    params![name, created_at.to_rfc3339()],
                )
                .context("failed to insert project")?;
                let id = conn.last_insert_rowid();
                Ok(Project {
                    id,
                    name,
                    water_level_offset: 0.0,
                    created_at,
                })
            })
            .await
    }

    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        self.db
            .execute(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, name, water_level_offset, created_at
                     FROM projects ORDER BY name",
                )?;
                let mut rows = stmt.query([])?;
                let mut projects = Vec::new();
                while let Some(row) = rows.next()? {
                    projects.push(row_to_project(row)?);
                }
                Ok(projects)
            })
            .await
    }

    pub async fn set_water_level_offset(&self, project_id: i64, offset_m: f64) -> Result<()> {
        self.db
            .execute(move |conn| {
                let changed = conn.execute(
                    "UPDATE projects SET water_level_offset = ?1 WHERE id = ?2",
                    params![offset_m, project_id],
                )?;
                if changed == 0 {
                    bail!("no project with id {project_id}");
                }
                Ok(())
            })
            .await
    }

    /// Delete a project and every reading in it, one transaction.
    pub async fn delete_project(&self, project_id: i64) -> Result<()> {
        self.db
            .execute(move |conn| {
                let tx = conn.transaction()?;
                tx.execute(
                    "DELETE FROM readings WHERE project_id = ?1",
                    params![project_id],
                )?;
                tx.execute("DELETE FROM projects WHERE id = ?1", params![project_id])?;
                tx.commit().context("failed to delete project")?;
                Ok(())
            })
            .await
    }
}

impl RemoteStore for SqliteRemoteStore {
    async fn insert_batch(
        &self,
        project_id: i64,
        readings: &[Reading],
    ) -> Result<Vec<i64>, RemoteError> {
        let batch: Vec<Reading> = readings.to_vec();
        self.db
            .execute(move |conn| {
                let tx = conn.transaction().context("failed to open batch transaction")?;

                let exists: Option<i64> = tx
                    .query_row(
                        "SELECT id FROM projects WHERE id = ?1",
                        params![project_id],
                        |row| row.get(0),
                    )
                    .optional()?;
                if exists.is_none() {
                    bail!("no project with id {project_id}");
                }

                let mut ids = Vec::with_capacity(batch.len());
                for reading in &batch {
                    tx.execute(
                        "INSERT INTO readings (project_id, depth, latitude, longitude, accuracy,
                             has_vegetation, is_shoreline, has_catch_marker, created_at)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                        params![
                            project_id,
                            reading.depth,
                            reading.position.map(|p| p.latitude),
                            reading.position.map(|p| p.longitude),
                            reading.position.map(|p| p.accuracy_m),
                            reading.flags.has_vegetation,
                            reading.flags.is_shoreline,
                            reading.flags.has_catch_marker,
                            reading.captured_at.to_rfc3339(),
                        ],
                    )
                    .context("failed to insert reading into batch")?;
                    ids.push(tx.last_insert_rowid());
                }

                tx.commit().context("failed to commit batch")?;
                Ok(ids)
            })
            .await
            .map_err(remote_err)
    }

    async fn list_readings(&self, project_id: i64) -> Result<Vec<Reading>, RemoteError> {
        self.db
            .execute(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, depth, latitude, longitude, accuracy,
                            has_vegetation, is_shoreline, has_catch_marker, created_at
                     FROM readings WHERE project_id = ?1 ORDER BY created_at ASC",
                )?;
                let mut rows = stmt.query(params![project_id])?;
                let mut readings = Vec::new();
                while let Some(row) = rows.next()? {
                    readings.push(row_to_remote_reading(row)?);
                }
                Ok(readings)
            })
            .await
            .map_err(remote_err)
    }

    async fn get_project(&self, project_id: i64) -> Result<Option<Project>, RemoteError> {
        self.db
            .execute(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, name, water_level_offset, created_at
                     FROM projects WHERE id = ?1",
                )?;
                let row = stmt
                    .query_row(params![project_id], |row| Ok(row_to_project(row)))
                    .optional()?;
                row.transpose()
            })
            .await
            .map_err(remote_err)
    }

    async fn update_flags(
        &self,
        reading_id: i64,
        flags: ReadingFlags,
    ) -> Result<(), RemoteError> {
        self.db
            .execute(move |conn| {
                let changed = conn.execute(
                    "UPDATE readings
                     SET has_vegetation = ?1, is_shoreline = ?2, has_catch_marker = ?3
                     WHERE id = ?4",
                    params![
                        flags.has_vegetation,
                        flags.is_shoreline,
                        flags.has_catch_marker,
                        reading_id
                    ],
                )?;
                if changed == 0 {
                    bail!("no remote reading with id {reading_id}");
                }
                Ok(())
            })
            .await
            .map_err(remote_err)
    }

    async fn delete_reading(&self, reading_id: i64) -> Result<(), RemoteError> {
        self.db
            .execute(move |conn| {
                conn.execute("DELETE FROM readings WHERE id = ?1", params![reading_id])
                    .context("failed to delete remote reading")?;
                Ok(())
            })
            .await
            .map_err(remote_err)
    }
}
