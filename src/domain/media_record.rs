use chrono::{DateTime, Utc};

use super::{Embedding, MediaId, ProcessingStatus, ServiceCategory, ServiceId};

/// Tag written onto a record whose retry budget ran out.
pub const FAILED_TAG: &str = "ai_processing_failed";

#[derive(Debug, Clone)]
pub struct MediaRecord {
    pub id: MediaId,
    pub service_id: ServiceId,
    pub media_url: String,
    pub processing_status: ProcessingStatus,
    pub ai_tags: Option<Vec<String>>,
    pub ai_embedding: Option<Embedding>,
    pub processing_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MediaRecord {
    pub fn new(service_id: ServiceId, media_url: String) -> Self {
        let now = Utc::now();
        Self {
            id: MediaId::new(),
            service_id,
            media_url,
            processing_status: ProcessingStatus::Pending,
            ai_tags: None,
            ai_embedding: None,
            processing_error: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Parent service fields joined onto a media record. Job inputs are derived
/// from this at enqueue time and never stored on the job row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceContext {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
}

impl ServiceContext {
    pub fn category(&self) -> ServiceCategory {
        self.category
            .as_deref()
            .map(ServiceCategory::from_label)
            .unwrap_or(ServiceCategory::Other)
    }

    /// Free-text context for the embedding stage, `None` when the service
    /// has neither a title nor a description.
    pub fn job_context(&self) -> Option<String> {
        let parts: Vec<&str> = [Some(self.title.as_str()), self.description.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(". "))
        }
    }
}

#[derive(Debug, Clone)]
pub struct MediaWithContext {
    pub record: MediaRecord,
    pub service: ServiceContext,
}

/// Field changes applied together with a status transition.
///
/// `ai_tags` and `ai_embedding` are left untouched when `None`;
/// `processing_error` is always written, so `None` clears it.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaUpdate {
    pub status: ProcessingStatus,
    pub ai_tags: Option<Vec<String>>,
    pub ai_embedding: Option<Embedding>,
    pub processing_error: Option<String>,
}

impl MediaUpdate {
    pub fn completed(tags: Vec<String>, embedding: Embedding) -> Self {
        Self {
            status: ProcessingStatus::Completed,
            ai_tags: Some(tags),
            ai_embedding: Some(embedding),
            processing_error: None,
        }
    }

    pub fn failed(error: String) -> Self {
        Self {
            status: ProcessingStatus::Failed,
            ai_tags: Some(vec![FAILED_TAG.to_string()]),
            ai_embedding: None,
            processing_error: Some(error),
        }
    }
}
