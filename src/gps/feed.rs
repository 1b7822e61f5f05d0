use log::{info, warn};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::fix::GpsFix;
use super::tracker::FixTracker;

/// Consume the platform's push stream of fixes and publish each one into the
/// shared slot. Runs until the stream closes (position source permanently
/// unavailable, e.g. permission denied) or cancellation; both are normal
/// shutdowns, not failures.
pub async fn fix_feed(
    mut fixes: mpsc::Receiver<GpsFix>,
    tracker: FixTracker,
    cancel_token: CancellationToken,
) {
    loop {
        tokio::select! {
            received = fixes.recv() => {
                match received {
                    Some(fix) => {
                        if !fix.is_plausible() {
                            warn!(
                                "dropping implausible fix ({}, {})",
                                fix.latitude, fix.longitude
                            );
                            continue;
                        }
                        tracker.publish(fix);
                    }
                    None => {
                        info!("position source closed; fix feed ending");
                        break;
                    }
                }
            }
            _ = cancel_token.cancelled() => {
                info!("fix feed shutting down");
                break;
            }
        }
    }
}
