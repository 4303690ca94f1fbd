use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{MediaId, MediaUpdate, MediaWithContext, ProcessingStatus};

use super::RepositoryError;

#[async_trait]
pub trait MediaRepository: Send + Sync {
    async fn get_by_id(&self, id: MediaId) -> Result<Option<MediaWithContext>, RepositoryError>;

    /// Applies a status transition and its accompanying fields, bumping
    /// `updated_at`. Returns `NotFound` when no row has this id.
    async fn update_status(&self, id: MediaId, update: MediaUpdate)
    -> Result<(), RepositoryError>;

    /// Moves the record to `processing` only if it is currently `pending` or
    /// `processing`. Returns `false` when the record is missing or terminal.
    async fn claim_for_processing(&self, id: MediaId) -> Result<bool, RepositoryError>;

    /// `processing -> failed` with the failure tag and `error`. Returns
    /// `false` without writing when the record is missing or not in
    /// `processing`, so a terminal record is never overwritten.
    async fn mark_failed(&self, id: MediaId, error: String) -> Result<bool, RepositoryError>;

    /// Puts the record back to `pending` from any state for an explicit
    /// reprocess, clearing `processing_error` and the failure tag. Returns
    /// `false` when no row has this id.
    async fn reset_for_reprocess(&self, id: MediaId) -> Result<bool, RepositoryError>;

    /// Records in `status`, oldest first, at most `limit`.
    async fn find_by_status(
        &self,
        status: ProcessingStatus,
        limit: usize,
    ) -> Result<Vec<MediaWithContext>, RepositoryError>;

    /// Records in `processing` whose `updated_at` is older than `cutoff`,
    /// oldest first, at most `limit`.
    async fn find_stale_processing(
        &self,
        cutoff: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<MediaWithContext>, RepositoryError>;

    /// Bulk `processing -> pending` for the given ids, re-checking staleness
    /// against `cutoff`. Returns the ids actually reset.
    async fn reset_stale_to_pending(
        &self,
        ids: &[MediaId],
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<MediaId>, RepositoryError>;
}
