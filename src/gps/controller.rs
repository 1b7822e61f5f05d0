use anyhow::{bail, Context, Result};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::feed::fix_feed;
use super::fix::GpsFix;
use super::tracker::{FixSubscription, FixTracker};

/// Owns the fix tracker and the feed worker that fills it.
pub struct GpsController {
    tracker: FixTracker,
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl GpsController {
    pub fn new() -> Self {
        Self {
            tracker: FixTracker::new(),
            handle: None,
            cancel_token: None,
        }
    }

    pub fn tracker(&self) -> &FixTracker {
        &self.tracker
    }

    pub fn subscribe(&self) -> FixSubscription {
        self.tracker.subscribe()
    }

    /// Attach a platform fix stream and start publishing into the slot.
    pub fn start(&mut self, fixes: mpsc::Receiver<GpsFix>) -> Result<()> {
        if self.handle.is_some() {
            bail!("fix feed already active");
        }

        let cancel_token = CancellationToken::new();
        let token_clone = cancel_token.clone();

        let handle = tokio::spawn(fix_feed(fixes, self.tracker.clone(), token_clone));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("fix feed task failed to join")
                .map(|_| ())
        } else {
            Ok(())
        }
    }
}

impl Default for GpsController {
    fn default() -> Self {
        Self::new()
    }
}
