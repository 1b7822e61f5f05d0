use chrono::{Duration as ChronoDuration, Utc};
use tokio::sync::watch;
use tokio::time::{timeout, Duration, Instant};

use super::fix::GpsFix;

/// The shared "last known fix" slot.
///
/// A single producer publishes fixes as they arrive; readers always see the
/// most recent one. There is no queue of historical fixes, and readers never
/// block the producer.
#[derive(Clone)]
pub struct FixTracker {
    sender: watch::Sender<Option<GpsFix>>,
}

impl FixTracker {
    pub fn new() -> Self {
        let (sender, _receiver) = watch::channel(None);
        Self { sender }
    }

    pub fn publish(&self, fix: GpsFix) {
        self.sender.send_replace(Some(fix));
    }

    pub fn latest(&self) -> Option<GpsFix> {
        *self.sender.borrow()
    }

    pub fn subscribe(&self) -> FixSubscription {
        FixSubscription {
            receiver: self.sender.subscribe(),
        }
    }
}

impl Default for FixTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// A reader's view of the fix slot, with the capture-time acquisition wait.
pub struct FixSubscription {
    receiver: watch::Receiver<Option<GpsFix>>,
}

impl FixSubscription {
    pub fn latest(&self) -> Option<GpsFix> {
        *self.receiver.borrow()
    }

    /// Wait up to `wait` for a fix younger than `max_age` to appear in the
    /// slot. Returns immediately when the current fix already qualifies;
    /// returns None when the window elapses first (the slot's stale content,
    /// if any, is still available via [`FixSubscription::latest`]).
    pub async fn fresh_fix(&mut self, wait: Duration, max_age: ChronoDuration) -> Option<GpsFix> {
        let deadline = Instant::now() + wait;

        loop {
            if let Some(fix) = self.latest() {
                if fix.is_younger_than(Utc::now(), max_age) {
                    return Some(fix);
                }
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return None;
            }

            match timeout(remaining, self.receiver.changed()).await {
                Ok(Ok(())) => continue,
                // Producer gone or window elapsed; either way no fresh fix
                // is coming in time.
                Ok(Err(_)) | Err(_) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fix_now() -> GpsFix {
        GpsFix {
            latitude: 53.9,
            longitude: 27.55,
            accuracy_m: 10.0,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn fresh_fix_returns_current_when_young() {
        let tracker = FixTracker::new();
        tracker.publish(fix_now());
        let mut sub = tracker.subscribe();

        let fix = sub
            .fresh_fix(Duration::from_millis(50), ChronoDuration::seconds(5))
            .await;
        assert!(fix.is_some());
    }

    #[tokio::test]
    async fn fresh_fix_times_out_on_empty_slot() {
        let tracker = FixTracker::new();
        let mut sub = tracker.subscribe();

        let fix = sub
            .fresh_fix(Duration::from_millis(20), ChronoDuration::seconds(5))
            .await;
        assert!(fix.is_none());
    }

    #[tokio::test]
    async fn fresh_fix_picks_up_published_fix() {
        let tracker = FixTracker::new();
        let mut sub = tracker.subscribe();

        let publisher = tracker.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            publisher.publish(fix_now());
        });

        let fix = sub
            .fresh_fix(Duration::from_millis(200), ChronoDuration::seconds(5))
            .await;
        assert!(fix.is_some());
    }

    #[tokio::test]
    async fn stale_fix_is_not_fresh_but_stays_readable() {
        let tracker = FixTracker::new();
        let mut stale = fix_now();
        stale.timestamp = Utc::now() - ChronoDuration::seconds(60);
        tracker.publish(stale);
        let mut sub = tracker.subscribe();

        let fix = sub
            .fresh_fix(Duration::from_millis(20), ChronoDuration::seconds(5))
            .await;
        assert!(fix.is_none());
        assert!(sub.latest().is_some());
    }
}
