use std::collections::HashMap;
use std::future::Future;

use chrono::Utc;
use log::{info, warn};
use serde::Serialize;
use serde_json::Value;
use tokio::time::{timeout, Duration};
use uuid::Uuid;

use crate::db::{
    models::{Project, Reading, ReadingFlags, SyncState},
    Database,
};
use crate::error::{RemoteError, SyncError};

use super::import::parse_payload;
use super::remote::RemoteStore;

#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Applied to every remote call; expiry is a recoverable failure.
    pub network_timeout_secs: u64,

    /// Apply the same coordinate deduplication to sync that import uses.
    /// A pending reading whose exact coordinates already exist in the target
    /// project is adopted (marked Synced against the matching remote row)
    /// instead of inserted again.
    pub dedupe_on_sync: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            network_timeout_secs: 10,
            dedupe_on_sync: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    /// Rows actually inserted remotely by this call.
    pub saved: usize,
    /// Pending readings adopted onto existing remote rows instead of
    /// re-inserted.
    pub adopted: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
}

/// A single flag edit, applied to whichever store owns the reading.
#[derive(Debug, Clone, Copy)]
pub enum FlagToggle {
    Shoreline(bool),
    Vegetation(bool),
    CatchMarker(bool),
}

impl FlagToggle {
    fn apply(self, flags: &mut ReadingFlags) {
        match self {
            FlagToggle::Shoreline(value) => flags.is_shoreline = value,
            FlagToggle::Vegetation(value) => flags.has_vegetation = value,
            FlagToggle::CatchMarker(value) => flags.has_catch_marker = value,
        }
    }
}

/// Reconciles the local pending queue against the remote authoritative
/// store. Never creates duplicates, never loses a reading to a retry: a
/// failed remote call leaves every local reading Pending.
pub struct SyncEngine<R: RemoteStore> {
    db: Database,
    remote: R,
    config: SyncConfig,
}

impl<R: RemoteStore> SyncEngine<R> {
    pub fn new(db: Database, remote: R) -> Self {
        Self::with_config(db, remote, SyncConfig::default())
    }

    pub fn with_config(db: Database, remote: R, config: SyncConfig) -> Self {
        Self { db, remote, config }
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Push every local Pending reading to the remote store as one
    /// transactional batch, then mark them Synced locally.
    ///
    /// Retry-safe: remote failure (including timeout) changes nothing
    /// locally, and re-running after a partial crash cannot duplicate rows
    /// because coordinates already on the remote are adopted, not
    /// re-inserted.
    pub async fn sync(&self, project_id: i64) -> Result<SyncReport, SyncError> {
        let pending = self.db.list_pending().await?;
        if pending.is_empty() {
            info!("sync: nothing pending");
            return Ok(SyncReport {
                saved: 0,
                adopted: 0,
            });
        }

        let batch_label = Uuid::new_v4();
        info!(
            "sync batch {batch_label}: {} pending readings for project {project_id}",
            pending.len()
        );

        let (to_insert, adoptions) = if self.config.dedupe_on_sync {
            let existing = self.with_timeout(self.remote.list_readings(project_id)).await?;
            partition_against_remote(pending, &existing)
        } else {
            (pending, Vec::new())
        };

        let remote_ids = if to_insert.is_empty() {
            Vec::new()
        } else {
            let ids = self
                .with_timeout(self.remote.insert_batch(project_id, &to_insert))
                .await?;
            if ids.len() != to_insert.len() {
                return Err(SyncError::Remote(RemoteError::Internal(format!(
                    "batch acknowledged {} ids for {} readings",
                    ids.len(),
                    to_insert.len()
                ))));
            }
            ids
        };

        // Remote has committed; from here a local failure is fatal but the
        // next sync adopts the committed rows instead of duplicating them.
        let mut acknowledged: Vec<(i64, i64)> = to_insert
            .iter()
            .filter_map(|r| r.id)
            .zip(remote_ids.iter().copied())
            .collect();
        acknowledged.extend(&adoptions);

        self.db.mark_synced(acknowledged).await?;

        let report = SyncReport {
            saved: to_insert.len(),
            adopted: adoptions.len(),
        };
        info!(
            "sync batch {batch_label}: saved {} adopted {}",
            report.saved, report.adopted
        );
        Ok(report)
    }

    /// Import a previously exported payload into a project, skipping records
    /// whose exact coordinates already exist there.
    pub async fn import(&self, project_id: i64, payload: &str) -> Result<ImportReport, SyncError> {
        let candidates = parse_payload(payload, Utc::now())?;

        let existing = self.with_timeout(self.remote.list_readings(project_id)).await?;
        let known: HashMap<(u64, u64), i64> = coordinate_index(&existing);

        let mut to_insert = Vec::new();
        let mut skipped = 0usize;
        for reading in candidates {
            match reading.coordinate_key() {
                Some(key) if known.contains_key(&key) => skipped += 1,
                // Readings without coordinates are never duplicates.
                _ => to_insert.push(reading),
            }
        }

        if !to_insert.is_empty() {
            self.with_timeout(self.remote.insert_batch(project_id, &to_insert))
                .await?;
        }

        let report = ImportReport {
            imported: to_insert.len(),
            skipped,
        };
        info!(
            "import into project {project_id}: imported {} skipped {}",
            report.imported, report.skipped
        );
        Ok(report)
    }

    /// Serialize every local reading in the current wire shape.
    pub async fn export_local(&self) -> Result<Value, SyncError> {
        let readings = self.db.list_readings().await?;
        serde_json::to_value(&readings)
            .map_err(|err| SyncError::Local(anyhow::anyhow!("failed to serialize export: {err}")))
    }

    /// Edit a reading's flags in whichever store owns it: Pending readings
    /// locally, Synced readings directly against the remote store.
    pub async fn update_flags(
        &self,
        reading: &Reading,
        toggle: FlagToggle,
    ) -> Result<Reading, SyncError> {
        let mut updated = reading.clone();
        toggle.apply(&mut updated.flags);

        match reading.sync_state {
            SyncState::Pending => {
                let id = reading
                    .id
                    .ok_or_else(|| SyncError::Local(anyhow::anyhow!("pending reading has no local id")))?;
                self.db.update_reading_flags(id, updated.flags).await?;
            }
            SyncState::Synced => {
                let remote_id = reading.remote_id.ok_or_else(|| {
                    SyncError::Local(anyhow::anyhow!("synced reading has no remote id"))
                })?;
                self.with_timeout(self.remote.update_flags(remote_id, updated.flags))
                    .await?;
                // Keep the local copy in step when one exists.
                if let Some(id) = reading.id {
                    self.db.update_reading_flags(id, updated.flags).await?;
                }
            }
        }

        Ok(updated)
    }

    /// The reference app's "tag last point" button: apply a flag toggle to
    /// the most recently captured reading, if any.
    pub async fn tag_latest(&self, toggle: FlagToggle) -> Result<Option<Reading>, SyncError> {
        match self.db.latest_reading().await? {
            Some(latest) => self.update_flags(&latest, toggle).await.map(Some),
            None => Ok(None),
        }
    }

    /// Remove a reading from whichever store owns it. Synced readings are
    /// deleted remotely first; a remote failure leaves the local copy too.
    pub async fn delete_reading(&self, reading: &Reading) -> Result<(), SyncError> {
        if let Some(remote_id) = reading.remote_id {
            self.with_timeout(self.remote.delete_reading(remote_id))
                .await?;
        }
        if let Some(id) = reading.id {
            self.db.delete_reading(id).await?;
        }
        Ok(())
    }

    /// The project record, for its name and water level offset.
    pub async fn fetch_project(&self, project_id: i64) -> Result<Option<Project>, SyncError> {
        self.with_timeout(self.remote.get_project(project_id)).await
    }

    /// The render input set: remote Synced readings for the project plus
    /// local Pending readings.
    pub async fn fetch_render_set(&self, project_id: i64) -> Result<Vec<Reading>, SyncError> {
        let mut readings = self.with_timeout(self.remote.list_readings(project_id)).await?;
        let pending = self.db.list_pending().await?;
        readings.extend(pending);
        Ok(readings)
    }

    async fn with_timeout<T>(
        &self,
        call: impl Future<Output = Result<T, RemoteError>>,
    ) -> Result<T, SyncError> {
        let limit = Duration::from_secs(self.config.network_timeout_secs);
        match timeout(limit, call).await {
            Ok(result) => result.map_err(SyncError::Remote),
            Err(_) => {
                warn!(
                    "remote call timed out after {}s",
                    self.config.network_timeout_secs
                );
                Err(SyncError::Remote(RemoteError::Timeout(
                    self.config.network_timeout_secs,
                )))
            }
        }
    }
}

fn coordinate_index(existing: &[Reading]) -> HashMap<(u64, u64), i64> {
    existing
        .iter()
        .filter_map(|r| match (r.coordinate_key(), r.remote_id) {
            (Some(key), Some(remote_id)) => Some((key, remote_id)),
            _ => None,
        })
        .collect()
}

/// Split pending readings into those to insert and those whose coordinates
/// already exist remotely (local id, matching remote id).
fn partition_against_remote(
    pending: Vec<Reading>,
    existing: &[Reading],
) -> (Vec<Reading>, Vec<(i64, i64)>) {
    let known = coordinate_index(existing);

    let mut to_insert = Vec::new();
    let mut adoptions = Vec::new();
    for reading in pending {
        match (reading.coordinate_key(), reading.id) {
            (Some(key), Some(local_id)) => match known.get(&key) {
                Some(remote_id) => adoptions.push((local_id, *remote_id)),
                None => to_insert.push(reading),
            },
            _ => to_insert.push(reading),
        }
    }
    (to_insert, adoptions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::Position;
    use chrono::DateTime;

    fn reading_at(id: i64, lat: f64, lon: f64) -> Reading {
        Reading {
            id: Some(id),
            remote_id: None,
            depth: 3.0,
            position: Some(Position {
                latitude: lat,
                longitude: lon,
                accuracy_m: 10.0,
            }),
            flags: ReadingFlags::default(),
            captured_at: DateTime::from_timestamp_millis(1_700_000_000_000).unwrap(),
            sync_state: SyncState::Pending,
        }
    }

    #[test]
    fn partition_adopts_exact_coordinate_matches() {
        let mut remote = reading_at(0, 53.9, 27.5);
        remote.id = None;
        remote.remote_id = Some(41);
        remote.sync_state = SyncState::Synced;

        let pending = vec![reading_at(1, 53.9, 27.5), reading_at(2, 53.901, 27.5)];
        let (to_insert, adoptions) = partition_against_remote(pending, &[remote]);

        assert_eq!(to_insert.len(), 1);
        assert_eq!(to_insert[0].id, Some(2));
        assert_eq!(adoptions, vec![(1, 41)]);
    }

    #[test]
    fn partition_always_inserts_positionless_readings() {
        let mut remote = reading_at(0, 53.9, 27.5);
        remote.id = None;
        remote.remote_id = Some(41);

        let mut no_position = reading_at(1, 0.0, 0.0);
        no_position.position = None;

        let (to_insert, adoptions) = partition_against_remote(vec![no_position], &[remote]);
        assert_eq!(to_insert.len(), 1);
        assert!(adoptions.is_empty());
    }
}
