mod media_processing_queue;
mod media_processor;
mod recovery_scanner;

pub use media_processing_queue::{
    DEFAULT_INTER_JOB_DELAY, DEFAULT_MAX_RETRIES, EnqueueError, EnqueueRequest,
    MediaProcessingQueue, QueueConfig, QueueSnapshot,
};
pub use media_processor::{
    DEFAULT_CALL_TIMEOUT, DEFAULT_EMBEDDING_DIMENSION, DEFAULT_ENRICHMENT_TAG_COUNT, FailureKind,
    JobFailure, MediaProcessor, ProcessOutcome, Stage, enrich_context,
};
pub use recovery_scanner::{
    DEFAULT_RECOVERY_BATCH_LIMIT, DEFAULT_STALE_THRESHOLD, RecoveryConfig, RecoveryError,
    RecoveryReport, RecoveryScanner,
};
