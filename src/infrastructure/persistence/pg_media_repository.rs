use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::application::ports::{MediaRepository, RepositoryError};
use crate::domain::{
    Embedding, FAILED_TAG, MediaId, MediaRecord, MediaUpdate, MediaWithContext, ProcessingStatus,
    ServiceContext, ServiceId,
};

const SELECT_MEDIA: &str = r#"
    SELECT m.id, m.service_id, m.media_url, m.processing_status, m.ai_tags, m.ai_embedding,
           m.processing_error, m.created_at, m.updated_at,
           s.title, s.description, s.category
    FROM media m
    JOIN services s ON s.id = m.service_id
"#;

pub struct PgMediaRepository {
    pool: PgPool,
}

impl PgMediaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct MediaRow {
    id: Uuid,
    service_id: Uuid,
    media_url: String,
    processing_status: String,
    ai_tags: Option<Vec<String>>,
    ai_embedding: Option<Vec<f32>>,
    processing_error: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    title: String,
    description: Option<String>,
    category: Option<String>,
}

impl TryFrom<MediaRow> for MediaWithContext {
    type Error = RepositoryError;

    fn try_from(r: MediaRow) -> Result<Self, Self::Error> {
        let processing_status = r
            .processing_status
            .parse::<ProcessingStatus>()
            .map_err(RepositoryError::InvalidData)?;

        Ok(MediaWithContext {
            record: MediaRecord {
                id: MediaId::from_uuid(r.id),
                service_id: ServiceId::from_uuid(r.service_id),
                media_url: r.media_url,
                processing_status,
                ai_tags: r.ai_tags,
                ai_embedding: r.ai_embedding.map(Embedding::new),
                processing_error: r.processing_error,
                created_at: r.created_at,
                updated_at: r.updated_at,
            },
            service: ServiceContext {
                title: r.title,
                description: r.description,
                category: r.category,
            },
        })
    }
}

fn into_media(rows: Vec<MediaRow>) -> Result<Vec<MediaWithContext>, RepositoryError> {
    rows.into_iter().map(MediaWithContext::try_from).collect()
}

fn query_failed(e: sqlx::Error) -> RepositoryError {
    RepositoryError::QueryFailed(e.to_string())
}

#[async_trait]
impl MediaRepository for PgMediaRepository {
    #[instrument(skip(self), fields(media_id = %id))]
    async fn get_by_id(&self, id: MediaId) -> Result<Option<MediaWithContext>, RepositoryError> {
        let row = sqlx::query_as::<_, MediaRow>(&format!("{SELECT_MEDIA} WHERE m.id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(query_failed)?;

        row.map(MediaWithContext::try_from).transpose()
    }

    #[instrument(skip(self, update), fields(media_id = %id, status = %update.status))]
    async fn update_status(
        &self,
        id: MediaId,
        update: MediaUpdate,
    ) -> Result<(), RepositoryError> {
        let embedding = update.ai_embedding.map(|e| e.values);

        let result = sqlx::query(
            r#"
            UPDATE media
            SET processing_status = $1,
                ai_tags = COALESCE($2, ai_tags),
                ai_embedding = COALESCE($3, ai_embedding),
                processing_error = $4,
                updated_at = $5
            WHERE id = $6
            "#,
        )
        .bind(update.status.as_str())
        .bind(update.ai_tags)
        .bind(embedding)
        .bind(update.processing_error)
        .bind(Utc::now())
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(query_failed)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("media {}", id)));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(media_id = %id))]
    async fn claim_for_processing(&self, id: MediaId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE media
            SET processing_status = 'processing', updated_at = $1
            WHERE id = $2 AND processing_status IN ('pending', 'processing')
            "#,
        )
        .bind(Utc::now())
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(query_failed)?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self, error), fields(media_id = %id))]
    async fn mark_failed(&self, id: MediaId, error: String) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE media
            SET processing_status = 'failed',
                ai_tags = ARRAY[$1]::TEXT[],
                processing_error = $2,
                updated_at = $3
            WHERE id = $4 AND processing_status = 'processing'
            "#,
        )
        .bind(FAILED_TAG)
        .bind(error)
        .bind(Utc::now())
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(query_failed)?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self), fields(media_id = %id))]
    async fn reset_for_reprocess(&self, id: MediaId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE media
            SET processing_status = 'pending',
                ai_tags = NULLIF(array_remove(ai_tags, $1), '{}'),
                processing_error = NULL,
                updated_at = $2
            WHERE id = $3
            "#,
        )
        .bind(FAILED_TAG)
        .bind(Utc::now())
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(query_failed)?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self), fields(status = %status))]
    async fn find_by_status(
        &self,
        status: ProcessingStatus,
        limit: usize,
    ) -> Result<Vec<MediaWithContext>, RepositoryError> {
        let rows = sqlx::query_as::<_, MediaRow>(&format!(
            "{SELECT_MEDIA} WHERE m.processing_status = $1 ORDER BY m.created_at ASC LIMIT $2"
        ))
        .bind(status.as_str())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(query_failed)?;

        into_media(rows)
    }

    #[instrument(skip(self), fields(cutoff = %cutoff))]
    async fn find_stale_processing(
        &self,
        cutoff: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<MediaWithContext>, RepositoryError> {
        let rows = sqlx::query_as::<_, MediaRow>(&format!(
            "{SELECT_MEDIA} WHERE m.processing_status = 'processing' AND m.updated_at < $1 \
             ORDER BY m.created_at ASC LIMIT $2"
        ))
        .bind(cutoff)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(query_failed)?;

        into_media(rows)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn reset_stale_to_pending(
        &self,
        ids: &[MediaId],
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<MediaId>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = ids.iter().map(MediaId::as_uuid).collect();

        let reset: Vec<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE media
            SET processing_status = 'pending', updated_at = $1
            WHERE id = ANY($2) AND processing_status = 'processing' AND updated_at < $3
            RETURNING id
            "#,
        )
        .bind(Utc::now())
        .bind(ids)
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(query_failed)?;

        Ok(reset.into_iter().map(MediaId::from_uuid).collect())
    }
}
