use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::db::models::Position;

/// One GPS fix as delivered by the platform position source.
///
/// Timestamped value object: the producer publishes new ones, consumers read
/// the latest without mutating it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GpsFix {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "accuracy")]
    pub accuracy_m: f64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl GpsFix {
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        (now - self.timestamp).max(Duration::zero())
    }

    pub fn is_younger_than(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        self.age(now) < max_age
    }

    /// Coordinates are plausible: finite and inside the WGS84 ranges.
    pub fn is_plausible(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.accuracy_m.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
            && self.accuracy_m >= 0.0
    }

    pub fn position(&self) -> Position {
        Position {
            latitude: self.latitude,
            longitude: self.longitude,
            accuracy_m: self.accuracy_m,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fix_at(ts: DateTime<Utc>) -> GpsFix {
        GpsFix {
            latitude: 53.9,
            longitude: 27.55,
            accuracy_m: 10.0,
            timestamp: ts,
        }
    }

    #[test]
    fn age_never_negative() {
        let now = Utc::now();
        let future = fix_at(now + Duration::seconds(30));
        assert_eq!(future.age(now), Duration::zero());
    }

    #[test]
    fn plausibility_rejects_out_of_range() {
        let now = Utc::now();
        let mut fix = fix_at(now);
        assert!(fix.is_plausible());
        fix.latitude = 91.0;
        assert!(!fix.is_plausible());
        fix.latitude = f64::NAN;
        assert!(!fix.is_plausible());
    }
}
