use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::application::ports::{MediaRepository, RepositoryError};
use crate::domain::{
    FAILED_TAG, MediaId, MediaRecord, MediaUpdate, MediaWithContext, ProcessingStatus,
};

/// Process-local record store for scaffold mode and tests.
#[derive(Default)]
pub struct InMemoryMediaRepository {
    media: RwLock<HashMap<MediaId, MediaWithContext>>,
}

impl InMemoryMediaRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a record as-is, timestamps included.
    pub async fn insert(&self, media: MediaWithContext) {
        self.media.write().await.insert(media.record.id, media);
    }

    pub async fn len(&self) -> usize {
        self.media.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.media.read().await.is_empty()
    }

    async fn select<F>(&self, limit: usize, mut keep: F) -> Vec<MediaWithContext>
    where
        F: FnMut(&MediaWithContext) -> bool,
    {
        let media = self.media.read().await;
        let mut matching: Vec<MediaWithContext> =
            media.values().filter(|m| keep(m)).cloned().collect();
        matching.sort_by_key(|m| m.record.created_at);
        matching.truncate(limit);
        matching
    }
}

fn apply(record: &mut MediaRecord, update: MediaUpdate) {
    record.processing_status = update.status;
    if let Some(tags) = update.ai_tags {
        record.ai_tags = Some(tags);
    }
    if let Some(embedding) = update.ai_embedding {
        record.ai_embedding = Some(embedding);
    }
    record.processing_error = update.processing_error;
    record.updated_at = Utc::now();
}

#[async_trait]
impl MediaRepository for InMemoryMediaRepository {
    async fn get_by_id(&self, id: MediaId) -> Result<Option<MediaWithContext>, RepositoryError> {
        Ok(self.media.read().await.get(&id).cloned())
    }

    async fn update_status(
        &self,
        id: MediaId,
        update: MediaUpdate,
    ) -> Result<(), RepositoryError> {
        let mut media = self.media.write().await;
        let entry = media
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound(format!("media {}", id)))?;

        apply(&mut entry.record, update);
        Ok(())
    }

    async fn claim_for_processing(&self, id: MediaId) -> Result<bool, RepositoryError> {
        let mut media = self.media.write().await;
        match media.get_mut(&id) {
            Some(entry) if entry.record.processing_status.is_claimable() => {
                entry.record.processing_status = ProcessingStatus::Processing;
                entry.record.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn mark_failed(&self, id: MediaId, error: String) -> Result<bool, RepositoryError> {
        let mut media = self.media.write().await;
        match media.get_mut(&id) {
            Some(entry)
                if entry
                    .record
                    .processing_status
                    .can_transition_to(ProcessingStatus::Failed) =>
            {
                apply(&mut entry.record, MediaUpdate::failed(error));
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn reset_for_reprocess(&self, id: MediaId) -> Result<bool, RepositoryError> {
        let mut media = self.media.write().await;
        let Some(entry) = media.get_mut(&id) else {
            return Ok(false);
        };

        let record = &mut entry.record;
        record.processing_status = ProcessingStatus::Pending;
        record.processing_error = None;
        if let Some(tags) = record.ai_tags.as_mut() {
            tags.retain(|t| t != FAILED_TAG);
        }
        if record.ai_tags.as_ref().is_some_and(Vec::is_empty) {
            record.ai_tags = None;
        }
        record.updated_at = Utc::now();
        Ok(true)
    }

    async fn find_by_status(
        &self,
        status: ProcessingStatus,
        limit: usize,
    ) -> Result<Vec<MediaWithContext>, RepositoryError> {
        Ok(self
            .select(limit, |m| m.record.processing_status == status)
            .await)
    }

    async fn find_stale_processing(
        &self,
        cutoff: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<MediaWithContext>, RepositoryError> {
        Ok(self
            .select(limit, |m| {
                m.record.processing_status == ProcessingStatus::Processing
                    && m.record.updated_at < cutoff
            })
            .await)
    }

    async fn reset_stale_to_pending(
        &self,
        ids: &[MediaId],
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<MediaId>, RepositoryError> {
        let mut media = self.media.write().await;
        let now = Utc::now();
        let mut reset = Vec::new();
        for id in ids {
            if let Some(entry) = media.get_mut(id) {
                let record = &mut entry.record;
                if record.processing_status == ProcessingStatus::Processing
                    && record.updated_at < cutoff
                {
                    record.processing_status = ProcessingStatus::Pending;
                    record.updated_at = now;
                    reset.push(*id);
                }
            }
        }
        Ok(reset)
    }
}
