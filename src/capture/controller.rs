use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::{Duration as ChronoDuration, Utc};
use log::{info, warn};
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::time::Duration;

use crate::db::{
    models::{Position, Reading, ReadingFlags, SyncState},
    Database,
};
use crate::gps::{FixSubscription, FixTracker};

use super::config::CaptureConfig;

/// How the GPS fix ended up attached to a captured reading. Advisory only;
/// a missing fix never fails the capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FixAttachment {
    /// A fix fresh at capture time.
    Fresh,
    /// No fresh fix arrived in the wait window; the slot's most recent fix
    /// was young enough to use.
    Stale,
    /// No usable fix; the reading has no position.
    Missing,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureOutcome {
    pub reading: Reading,
    pub fix: FixAttachment,
}

/// Binds the keypad's depth entries to the local store and the shared fix
/// slot.
#[derive(Clone)]
pub struct CaptureController {
    db: Database,
    fixes: Arc<Mutex<FixSubscription>>,
    config: CaptureConfig,
}

impl CaptureController {
    pub fn new(db: Database, tracker: &FixTracker) -> Self {
        Self::with_config(db, tracker, CaptureConfig::default())
    }

    pub fn with_config(db: Database, tracker: &FixTracker, config: CaptureConfig) -> Self {
        Self {
            db,
            fixes: Arc::new(Mutex::new(tracker.subscribe())),
            config,
        }
    }

    /// Record one depth reading, attaching the best available fix.
    ///
    /// The reading is persisted locally (Pending) before this returns; GPS
    /// absence is reported in the outcome, never as an error. A local store
    /// failure is fatal to the call.
    pub async fn record_reading(
        &self,
        depth: f64,
        flags: ReadingFlags,
    ) -> Result<CaptureOutcome> {
        if !depth.is_finite() || depth < 0.0 {
            bail!("depth must be a non-negative number of meters, got {depth}");
        }
        if depth > self.config.depth_domain_max_m {
            warn!(
                "depth {depth}m exceeds the keypad domain ({}m); storing anyway",
                self.config.depth_domain_max_m
            );
        }

        let (position, attachment) = self.acquire_position().await;

        let mut reading = Reading {
            id: None,
            remote_id: None,
            depth,
            position,
            flags,
            captured_at: Utc::now(),
            sync_state: SyncState::Pending,
        };

        let id = self.db.insert_reading(&reading).await?;
        reading.id = Some(id);

        match &reading.position {
            Some(pos) => info!(
                "captured {depth}m at ({:.5}, {:.5}) ~{}m as reading {id}",
                pos.latitude, pos.longitude, pos.accuracy_m as i64
            ),
            None => info!("captured {depth}m without GPS as reading {id}"),
        }

        Ok(CaptureOutcome {
            reading,
            fix: attachment,
        })
    }

    /// Last saved position, for the status line.
    pub async fn latest_position(&self) -> Result<Option<Position>> {
        let readings = self.db.list_readings().await?;
        Ok(readings.into_iter().find_map(|r| r.position))
    }

    async fn acquire_position(&self) -> (Option<Position>, FixAttachment) {
        let wait = Duration::from_secs(self.config.fix_wait_secs);
        let fresh_age = ChronoDuration::seconds(self.config.fresh_max_age_secs);
        let stale_age = ChronoDuration::seconds(self.config.stale_max_age_secs);

        let mut subscription = self.fixes.lock().await;

        if let Some(fix) = subscription.fresh_fix(wait, fresh_age).await {
            return (Some(fix.position()), FixAttachment::Fresh);
        }

        match subscription.latest() {
            Some(fix) if fix.is_younger_than(Utc::now(), stale_age) => {
                (Some(fix.position()), FixAttachment::Stale)
            }
            _ => (None, FixAttachment::Missing),
        }
    }
}
