use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, Notify};
use tracing::Instrument;

use crate::domain::{MediaId, MediaJob, MediaWithContext, ServiceCategory};

use super::media_processor::{FailureKind, MediaProcessor, ProcessOutcome};

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_INTER_JOB_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Pause between attempts while more work is queued; keeps the analysis
    /// provider under its rate limit.
    pub inter_job_delay: Duration,
    pub max_retries: u32,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            inter_job_delay: DEFAULT_INTER_JOB_DELAY,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnqueueRequest {
    pub media_id: MediaId,
    pub media_url: String,
    pub category: ServiceCategory,
    pub context: Option<String>,
}

impl EnqueueRequest {
    pub fn new(
        media_id: MediaId,
        media_url: impl Into<String>,
        category: ServiceCategory,
        context: Option<String>,
    ) -> Self {
        Self {
            media_id,
            media_url: media_url.into(),
            category,
            context,
        }
    }

    /// Job inputs rebuilt from a stored record and its parent service.
    pub fn from_media(media: &MediaWithContext) -> Self {
        Self {
            media_id: media.record.id,
            media_url: media.record.media_url.clone(),
            category: media.service.category(),
            context: media.service.job_context(),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EnqueueError {
    #[error("media id must not be nil")]
    EmptyMediaId,
    #[error("media url must not be empty")]
    EmptyMediaUrl,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueSnapshot {
    pub queued: usize,
    pub is_processing: bool,
    pub in_flight: Option<MediaId>,
    pub drain_loops_started: u64,
    pub peak_active_loops: usize,
}

/// In-memory FIFO of media jobs with at most one drain loop.
///
/// Cloning yields another handle to the same queue.
#[derive(Clone)]
pub struct MediaProcessingQueue {
    inner: Arc<QueueInner>,
}

struct QueueInner {
    state: Mutex<QueueState>,
    processor: MediaProcessor,
    config: QueueConfig,
    idle: Notify,
    drain_loops_started: AtomicU64,
    active_loops: AtomicUsize,
    peak_active_loops: AtomicUsize,
}

#[derive(Default)]
struct QueueState {
    jobs: VecDeque<MediaJob>,
    is_processing: bool,
    in_flight: Option<MediaId>,
    next_sequence: u64,
}

impl QueueState {
    fn owns(&self, media_id: MediaId) -> bool {
        self.in_flight == Some(media_id) || self.jobs.iter().any(|j| j.media_id == media_id)
    }
}

impl MediaProcessingQueue {
    pub fn new(processor: MediaProcessor, config: QueueConfig) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                state: Mutex::new(QueueState::default()),
                processor,
                config,
                idle: Notify::new(),
                drain_loops_started: AtomicU64::new(0),
                active_loops: AtomicUsize::new(0),
                peak_active_loops: AtomicUsize::new(0),
            }),
        }
    }

    /// Appends a job and starts the drain loop if it is not running.
    /// Processing failures are handled by the loop and never surface here.
    pub async fn enqueue(&self, request: EnqueueRequest) -> Result<(), EnqueueError> {
        self.push(request, false).await.map(|_| ())
    }

    /// Like [`enqueue`](Self::enqueue) but does nothing when the media is
    /// already queued or in flight. Returns whether a job was added.
    pub async fn enqueue_if_absent(&self, request: EnqueueRequest) -> Result<bool, EnqueueError> {
        self.push(request, true).await
    }

    /// Enqueues each request in order; invalid ones are logged and skipped.
    /// Returns the number accepted.
    pub async fn enqueue_batch(&self, requests: impl IntoIterator<Item = EnqueueRequest>) -> usize {
        let mut accepted = 0;
        for request in requests {
            let media_id = request.media_id;
            match self.enqueue(request).await {
                Ok(()) => accepted += 1,
                Err(e) => tracing::warn!(media_id = %media_id, error = %e, "Rejected batch entry"),
            }
        }
        accepted
    }

    pub async fn contains_media(&self, media_id: MediaId) -> bool {
        self.inner.state.lock().await.owns(media_id)
    }

    /// Media ids currently queued or being processed.
    pub async fn owned_media_ids(&self) -> HashSet<MediaId> {
        let state = self.inner.state.lock().await;
        state
            .jobs
            .iter()
            .map(|j| j.media_id)
            .chain(state.in_flight)
            .collect()
    }

    pub async fn snapshot(&self) -> QueueSnapshot {
        let state = self.inner.state.lock().await;
        QueueSnapshot {
            queued: state.jobs.len(),
            is_processing: state.is_processing,
            in_flight: state.in_flight,
            drain_loops_started: self.inner.drain_loops_started.load(Ordering::SeqCst),
            peak_active_loops: self.inner.peak_active_loops.load(Ordering::SeqCst),
        }
    }

    /// Resolves once the queue is empty and no drain loop is running.
    pub async fn wait_until_idle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let state = self.inner.state.lock().await;
                if !state.is_processing && state.jobs.is_empty() {
                    return;
                }
            }

            notified.await;
        }
    }

    async fn push(&self, request: EnqueueRequest, only_if_absent: bool) -> Result<bool, EnqueueError> {
        if request.media_id.is_nil() {
            return Err(EnqueueError::EmptyMediaId);
        }
        if request.media_url.trim().is_empty() {
            return Err(EnqueueError::EmptyMediaUrl);
        }

        let start_loop = {
            let mut state = self.inner.state.lock().await;
            if only_if_absent && state.owns(request.media_id) {
                return Ok(false);
            }

            let sequence = state.next_sequence;
            state.next_sequence += 1;
            let job = MediaJob::new(
                request.media_id,
                request.media_url,
                request.category,
                request.context,
                sequence,
            );
            tracing::debug!(job_id = %job.id, media_id = %job.media_id, "Media job enqueued");
            state.jobs.push_back(job);

            let start_loop = !state.is_processing;
            state.is_processing = true;
            start_loop
        };

        if start_loop {
            self.inner.drain_loops_started.fetch_add(1, Ordering::SeqCst);
            let queue = self.clone();
            tokio::spawn(async move { queue.drain().await });
        }

        Ok(true)
    }

    async fn drain(self) {
        let active = self.inner.active_loops.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.peak_active_loops.fetch_max(active, Ordering::SeqCst);
        tracing::debug!("Media drain loop started");

        loop {
            let job = {
                let mut state = self.inner.state.lock().await;
                match state.jobs.pop_front() {
                    Some(job) => {
                        state.in_flight = Some(job.media_id);
                        job
                    }
                    None => {
                        // Cleared under the same lock enqueue takes, so no
                        // job can be appended without a loop to drain it.
                        state.is_processing = false;
                        self.inner.active_loops.fetch_sub(1, Ordering::SeqCst);
                        break;
                    }
                }
            };

            let retry = self.run_isolated(job).await;

            let more_queued = {
                let mut state = self.inner.state.lock().await;
                state.in_flight = None;
                if let Some(job) = retry {
                    state.jobs.push_back(job);
                }
                !state.jobs.is_empty()
            };

            if more_queued {
                tokio::time::sleep(self.inner.config.inter_job_delay).await;
            }
        }

        tracing::debug!("Media drain loop idle");
        self.inner.idle.notify_waiters();
    }

    /// Runs the attempt on its own task so a panicking adapter costs one
    /// retry instead of killing the drain loop.
    async fn run_isolated(&self, job: MediaJob) -> Option<MediaJob> {
        let queue = self.clone();
        let attempt = tokio::spawn({
            let job = job.clone();
            async move { queue.run_attempt(job).await }
        });

        match attempt.await {
            Ok(retry) => retry,
            Err(e) => {
                let reason = if e.is_panic() {
                    "attempt panicked"
                } else {
                    "attempt was cancelled"
                };
                self.settle_failure(job, FailureKind::Aborted, reason.to_string())
                    .await
            }
        }
    }

    /// Returns the job when it should be retried.
    async fn run_attempt(&self, job: MediaJob) -> Option<MediaJob> {
        let span = tracing::info_span!(
            "media_job",
            job_id = %job.id,
            media_id = %job.media_id,
            category = %job.category,
            attempt = job.attempt(),
        );

        async move {
            match self.inner.processor.process(&job).await {
                Ok(ProcessOutcome::Completed { tag_count }) => {
                    tracing::info!(tag_count, "Media processing completed");
                    None
                }
                Ok(ProcessOutcome::Skipped) => None,
                Err(failure) => {
                    self.settle_failure(job, failure.kind(), failure.to_string())
                        .await
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Requeues while retries remain, otherwise marks the record failed.
    async fn settle_failure(
        &self,
        mut job: MediaJob,
        kind: FailureKind,
        error: String,
    ) -> Option<MediaJob> {
        if job.retry_count < self.inner.config.max_retries {
            job.retry_count += 1;
            tracing::warn!(
                media_id = %job.media_id,
                error = %error,
                failure_kind = %kind,
                retry_count = job.retry_count,
                max_retries = self.inner.config.max_retries,
                "Media job failed, requeueing at tail"
            );
            return Some(job);
        }

        tracing::error!(
            media_id = %job.media_id,
            error = %error,
            failure_kind = %kind,
            retry_count = job.retry_count,
            "Media job failed permanently"
        );
        let note = format!("{}: {}", kind, error);
        match self
            .inner
            .processor
            .repository()
            .mark_failed(job.media_id, note)
            .await
        {
            Ok(true) => {}
            Ok(false) => tracing::warn!(
                media_id = %job.media_id,
                "Media record not in processing, leaving its status as is"
            ),
            Err(e) => tracing::error!(
                media_id = %job.media_id,
                error = %e,
                "Failed to mark media as failed; recovery will reclaim it once stale"
            ),
        }
        None
    }
}
