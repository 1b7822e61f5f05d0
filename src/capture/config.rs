/// Tunable thresholds for the capture operation's GPS attachment policy.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Bounded wait for a fresh fix before falling back.
    pub fix_wait_secs: u64,

    /// A fix younger than this counts as fresh.
    pub fresh_max_age_secs: i64,

    /// Fallback bound: a stale fix older than this is not attached at all.
    pub stale_max_age_secs: i64,

    /// Advisory upper bound of the keypad's depth domain; deeper readings
    /// are stored but logged.
    pub depth_domain_max_m: f64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            fix_wait_secs: 3,
            fresh_max_age_secs: 5,
            stale_max_age_secs: 120,
            depth_domain_max_m: 40.0,
        }
    }
}
