use std::fmt;

use chrono::{DateTime, Utc};

use super::{MediaId, ServiceCategory};

/// Identity of one enqueue attempt. A retried job keeps its id; enqueueing
/// the same media again yields a new one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(String);

impl JobId {
    pub fn new(media_id: MediaId, enqueued_at: DateTime<Utc>, sequence: u64) -> Self {
        Self(format!(
            "{}-{}-{}",
            media_id,
            enqueued_at.timestamp_millis(),
            sequence
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct MediaJob {
    pub id: JobId,
    pub media_id: MediaId,
    pub media_url: String,
    pub category: ServiceCategory,
    pub context: Option<String>,
    pub retry_count: u32,
    pub enqueued_at: DateTime<Utc>,
}

impl MediaJob {
    pub fn new(
        media_id: MediaId,
        media_url: String,
        category: ServiceCategory,
        context: Option<String>,
        sequence: u64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::new(media_id, now, sequence),
            media_id,
            media_url,
            category,
            context,
            retry_count: 0,
            enqueued_at: now,
        }
    }

    pub fn attempt(&self) -> u32 {
        self.retry_count + 1
    }
}
