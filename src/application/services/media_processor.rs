use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{
    AnalysisError, AnalysisProvider, FetchError, ImageFetcher, MediaRepository, RepositoryError,
};
use crate::domain::{MediaJob, MediaUpdate};

pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_ENRICHMENT_TAG_COUNT: usize = 5;
pub const DEFAULT_EMBEDDING_DIMENSION: usize = 1408;

/// Runs one job attempt: claim, fetch, tag, embed, persist.
pub struct MediaProcessor {
    repository: Arc<dyn MediaRepository>,
    fetcher: Arc<dyn ImageFetcher>,
    provider: Arc<dyn AnalysisProvider>,
    call_timeout: Duration,
    enrichment_tag_count: usize,
    embedding_dimension: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    Completed { tag_count: usize },
    /// The record was missing or already terminal; nothing was written.
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Tagging,
    Embedding,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Fetch => "image fetch",
            Stage::Tagging => "tagging",
            Stage::Embedding => "embedding",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Fetch,
    Analysis,
    Timeout,
    Persistence,
    /// The attempt's task panicked or was cancelled.
    Aborted,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Fetch => "fetch",
            FailureKind::Analysis => "analysis",
            FailureKind::Timeout => "timeout",
            FailureKind::Persistence => "persistence",
            FailureKind::Aborted => "aborted",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JobFailure {
    #[error("image fetch: {0}")]
    Fetch(FetchError),
    #[error("{stage}: {source}")]
    Analysis {
        stage: Stage,
        source: AnalysisError,
    },
    #[error("embedding has {actual} dimensions, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("{stage} timed out after {after:?}")]
    Timeout { stage: Stage, after: Duration },
    #[error("record store: {0}")]
    Persistence(RepositoryError),
}

impl JobFailure {
    pub fn kind(&self) -> FailureKind {
        match self {
            JobFailure::Fetch(_) => FailureKind::Fetch,
            JobFailure::Analysis { .. } | JobFailure::DimensionMismatch { .. } => {
                FailureKind::Analysis
            }
            JobFailure::Timeout { .. } => FailureKind::Timeout,
            JobFailure::Persistence(_) => FailureKind::Persistence,
        }
    }
}

impl MediaProcessor {
    pub fn new(
        repository: Arc<dyn MediaRepository>,
        fetcher: Arc<dyn ImageFetcher>,
        provider: Arc<dyn AnalysisProvider>,
        call_timeout: Duration,
        enrichment_tag_count: usize,
        embedding_dimension: usize,
    ) -> Self {
        Self {
            repository,
            fetcher,
            provider,
            call_timeout,
            enrichment_tag_count,
            embedding_dimension,
        }
    }

    pub fn repository(&self) -> &Arc<dyn MediaRepository> {
        &self.repository
    }

    pub async fn process(&self, job: &MediaJob) -> Result<ProcessOutcome, JobFailure> {
        let claimed = self
            .repository
            .claim_for_processing(job.media_id)
            .await
            .map_err(JobFailure::Persistence)?;
        if !claimed {
            tracing::warn!("Media record missing or terminal, skipping job");
            return Ok(ProcessOutcome::Skipped);
        }

        let image = self
            .bounded(Stage::Fetch, self.fetcher.fetch(&job.media_url))
            .await?
            .map_err(JobFailure::Fetch)?;
        tracing::debug!(bytes = image.len(), "Image fetched");

        let analysis = self
            .bounded(Stage::Tagging, self.provider.analyze(&image, job.category))
            .await?
            .map_err(|source| JobFailure::Analysis {
                stage: Stage::Tagging,
                source,
            })?;
        let tags = analysis.normalized_tags();
        tracing::debug!(tag_count = tags.len(), "Tags extracted");

        let context = enrich_context(
            job.context.as_deref(),
            &analysis.top_tags(self.enrichment_tag_count),
        );
        let embedding = self
            .bounded(Stage::Embedding, self.provider.embed(&image, &context))
            .await?
            .map_err(|source| JobFailure::Analysis {
                stage: Stage::Embedding,
                source,
            })?;

        if !embedding.has_dimensions(self.embedding_dimension) {
            return Err(JobFailure::DimensionMismatch {
                expected: self.embedding_dimension,
                actual: embedding.dimensions(),
            });
        }
        if !embedding.is_finite() {
            return Err(JobFailure::Analysis {
                stage: Stage::Embedding,
                source: AnalysisError::InvalidResponse("non-finite embedding value".to_string()),
            });
        }

        let tag_count = tags.len();
        self.repository
            .update_status(job.media_id, MediaUpdate::completed(tags, embedding))
            .await
            .map_err(JobFailure::Persistence)?;

        Ok(ProcessOutcome::Completed { tag_count })
    }

    async fn bounded<T>(
        &self,
        stage: Stage,
        call: impl Future<Output = T>,
    ) -> Result<T, JobFailure> {
        tokio::time::timeout(self.call_timeout, call)
            .await
            .map_err(|_| JobFailure::Timeout {
                stage,
                after: self.call_timeout,
            })
    }
}

/// Builds the embedding-stage context from the job's own context and the
/// strongest stage-one tags.
pub fn enrich_context(context: Option<&str>, top_tags: &[String]) -> String {
    let base = context.map(str::trim).filter(|c| !c.is_empty());
    match (base, top_tags.is_empty()) {
        (Some(base), true) => base.to_string(),
        (Some(base), false) => format!("{}. Visual features: {}", base, top_tags.join(", ")),
        (None, false) => format!("Visual features: {}", top_tags.join(", ")),
        (None, true) => String::new(),
    }
}
