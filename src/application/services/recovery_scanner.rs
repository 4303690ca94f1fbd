use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::application::ports::{MediaRepository, RepositoryError};
use crate::domain::{MediaId, MediaWithContext, ProcessingStatus};

use super::media_processing_queue::{EnqueueRequest, MediaProcessingQueue};

pub const DEFAULT_RECOVERY_BATCH_LIMIT: usize = 50;
pub const DEFAULT_STALE_THRESHOLD: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone)]
pub struct RecoveryConfig {
    /// Cap on records read per status query.
    pub batch_limit: usize,
    /// How long a record may sit in `processing` before it counts as orphaned.
    pub stale_threshold: Duration,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            batch_limit: DEFAULT_RECOVERY_BATCH_LIMIT,
            stale_threshold: DEFAULT_STALE_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecoveryReport {
    pub recovered_count: usize,
    pub pending_count: usize,
    pub stuck_count: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum RecoveryError {
    #[error("record store: {0}")]
    Repository(#[from] RepositoryError),
    #[error("invalid stale threshold: {0}")]
    InvalidThreshold(String),
}

/// Rebuilds queue contents from persisted status after a restart.
pub struct RecoveryScanner {
    repository: Arc<dyn MediaRepository>,
    queue: MediaProcessingQueue,
    config: RecoveryConfig,
}

impl RecoveryScanner {
    pub fn new(
        repository: Arc<dyn MediaRepository>,
        queue: MediaProcessingQueue,
        config: RecoveryConfig,
    ) -> Self {
        Self {
            repository,
            queue,
            config,
        }
    }

    #[tracing::instrument(skip(self), fields(batch_limit = self.config.batch_limit))]
    pub async fn recover(&self) -> Result<RecoveryReport, RecoveryError> {
        let threshold = chrono::Duration::from_std(self.config.stale_threshold)
            .map_err(|e| RecoveryError::InvalidThreshold(e.to_string()))?;
        let cutoff = Utc::now() - threshold;

        let pending = self
            .repository
            .find_by_status(ProcessingStatus::Pending, self.config.batch_limit)
            .await?;
        let stale = self
            .repository
            .find_stale_processing(cutoff, self.config.batch_limit)
            .await?;

        // Anything the queue already owns is live work, not an orphan.
        let owned = self.queue.owned_media_ids().await;
        let pending = unowned(pending, &owned);
        let stuck = unowned(stale, &owned);

        if pending.is_empty() && stuck.is_empty() {
            tracing::debug!("Nothing to recover");
            return Ok(RecoveryReport::default());
        }

        let stuck_ids: Vec<MediaId> = stuck.iter().map(|m| m.record.id).collect();
        let reset_ids: HashSet<MediaId> = if stuck_ids.is_empty() {
            HashSet::new()
        } else {
            let reset = self
                .repository
                .reset_stale_to_pending(&stuck_ids, cutoff)
                .await?;
            if reset.len() < stuck_ids.len() {
                tracing::info!(
                    found = stuck_ids.len(),
                    reset = reset.len(),
                    "Some stale media moved on before the reset, leaving them alone"
                );
            }
            reset.into_iter().collect()
        };
        // A row whose reset matched nothing was reclaimed or finished since the
        // scan; it is not an orphan any more.
        let stuck: Vec<MediaWithContext> = stuck
            .into_iter()
            .filter(|m| reset_ids.contains(&m.record.id))
            .collect();
        if !stuck.is_empty() {
            tracing::info!(count = stuck.len(), "Reset stale media to pending");
        }

        let mut seen = HashSet::new();
        let mut recovered_count = 0;
        for media in pending.iter().chain(stuck.iter()) {
            if !seen.insert(media.record.id) {
                continue;
            }
            match self
                .queue
                .enqueue_if_absent(EnqueueRequest::from_media(media))
                .await
            {
                Ok(true) => recovered_count += 1,
                Ok(false) => {}
                Err(e) => tracing::warn!(
                    media_id = %media.record.id,
                    error = %e,
                    "Skipping unrecoverable media record"
                ),
            }
        }

        let report = RecoveryReport {
            recovered_count,
            pending_count: pending.len(),
            stuck_count: stuck.len(),
        };
        tracing::info!(
            recovered = report.recovered_count,
            pending = report.pending_count,
            stuck = report.stuck_count,
            "Media recovery complete"
        );
        Ok(report)
    }
}

fn unowned(media: Vec<MediaWithContext>, owned: &HashSet<MediaId>) -> Vec<MediaWithContext> {
    media
        .into_iter()
        .filter(|m| !owned.contains(&m.record.id))
        .collect()
}
