//! Offline-first core of a lake depth logger.
//!
//! Two subsystems: the reading store & sync engine (capture with
//! best-effort GPS attachment, local persistence, duplicate-safe
//! reconciliation with a remote project store) and the depth surface
//! renderer (accuracy filtering, Delaunay triangulation, IDW
//! interpolation, contour extraction, vegetation overlays).

pub mod capture;
pub mod db;
pub mod error;
pub mod gps;
pub mod logging;
pub mod surface;
pub mod sync;

pub use capture::{CaptureConfig, CaptureController, CaptureOutcome, FixAttachment};
pub use db::{Database, FishCatch, Position, Project, Reading, ReadingFlags, SyncState};
pub use error::{RemoteError, SyncError};
pub use gps::{FixTracker, GpsController, GpsFix};
pub use surface::{render_depth_surface, DepthSurface, SurfaceConfig, SurfaceOutcome};
pub use sync::{
    FlagToggle, ImportReport, RemoteStore, SqliteRemoteStore, SyncConfig, SyncEngine, SyncReport,
};
