use crate::db::models::{Project, Reading, ReadingFlags};
use crate::error::RemoteError;

/// The contract the sync engine needs from the remote authoritative store.
///
/// Reached over a network boundary in deployment; the batch insert MUST be
/// transactional — either every row in the batch commits or none do. That
/// guarantee is what makes a failed sync safely retryable.
pub trait RemoteStore: Send + Sync {
    /// Insert a batch of readings into a project, all or nothing. Returns
    /// the remote ids assigned to the rows, in input order.
    fn insert_batch(
        &self,
        project_id: i64,
        readings: &[Reading],
    ) -> impl std::future::Future<Output = Result<Vec<i64>, RemoteError>> + Send;

    /// Every reading in a project, capture order.
    fn list_readings(
        &self,
        project_id: i64,
    ) -> impl std::future::Future<Output = Result<Vec<Reading>, RemoteError>> + Send;

    fn get_project(
        &self,
        project_id: i64,
    ) -> impl std::future::Future<Output = Result<Option<Project>, RemoteError>> + Send;

    fn update_flags(
        &self,
        reading_id: i64,
        flags: ReadingFlags,
    ) -> impl std::future::Future<Output = Result<(), RemoteError>> + Send;

    fn delete_reading(
        &self,
        reading_id: i64,
    ) -> impl std::future::Future<Output = Result<(), RemoteError>> + Send;
}
