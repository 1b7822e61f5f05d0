mod controller;
mod feed;
mod fix;
mod tracker;

pub use controller::GpsController;
pub use fix::GpsFix;
pub use tracker::{FixSubscription, FixTracker};
