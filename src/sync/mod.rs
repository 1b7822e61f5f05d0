//! Reading lifecycle reconciliation between the local and remote stores.

mod engine;
mod import;
mod remote;
mod remote_sqlite;

pub use engine::{FlagToggle, ImportReport, SyncConfig, SyncEngine, SyncReport};
pub use remote::RemoteStore;
pub use remote_sqlite::SqliteRemoteStore;
