mod config;
mod controller;

pub use config::CaptureConfig;
pub use controller::{CaptureController, CaptureOutcome, FixAttachment};
