/// Initialize logging for a binary or test harness embedding this crate.
/// Reads RUST_LOG; defaults to info.
pub fn init() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .try_init();
}
