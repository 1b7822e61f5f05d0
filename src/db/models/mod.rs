pub mod fish_catch;
pub mod project;
pub mod reading;

pub use fish_catch::FishCatch;
pub use project::Project;
pub use reading::{Position, Reading, ReadingFlags, SyncState};
