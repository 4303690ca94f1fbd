use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;
use uuid::Uuid;

use crate::application::services::EnqueueRequest;
use crate::domain::{MediaId, ProcessingStatus};
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct QueueStatusResponse {
    pub queued: usize,
    pub is_processing: bool,
    pub in_flight: Option<String>,
    pub drain_loops_started: u64,
}

#[derive(Serialize)]
pub struct RecoveryResponse {
    pub recovered_count: usize,
    pub pending_count: usize,
    pub stuck_count: usize,
}

#[derive(Serialize)]
pub struct ReprocessResponse {
    pub media_id: String,
    pub status: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: String) -> axum::response::Response {
    (status, Json(ErrorResponse { error })).into_response()
}

pub async fn queue_status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.queue.snapshot().await;
    (
        StatusCode::OK,
        Json(QueueStatusResponse {
            queued: snapshot.queued,
            is_processing: snapshot.is_processing,
            in_flight: snapshot.in_flight.map(|id| id.to_string()),
            drain_loops_started: snapshot.drain_loops_started,
        }),
    )
}

#[tracing::instrument(skip(state))]
pub async fn recover_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.recovery.recover().await {
        Ok(report) => (
            StatusCode::OK,
            Json(RecoveryResponse {
                recovered_count: report.recovered_count,
                pending_count: report.pending_count,
                stuck_count: report.stuck_count,
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Media recovery failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Recovery failed: {}", e),
            )
        }
    }
}

/// Explicit re-trigger: puts the record back to `pending` whatever its
/// current state, drops any failure marker, and queues it.
#[tracing::instrument(skip(state))]
pub async fn reprocess_handler(
    State(state): State<AppState>,
    Path(media_id): Path<String>,
) -> impl IntoResponse {
    let media_id = match Uuid::parse_str(&media_id) {
        Ok(uuid) => MediaId::from_uuid(uuid),
        Err(_) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("Invalid media ID: {}", media_id),
            );
        }
    };

    let media = match state.repository.get_by_id(media_id).await {
        Ok(Some(media)) => media,
        Ok(None) => {
            return error_response(
                StatusCode::NOT_FOUND,
                format!("Media not found: {}", media_id),
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to load media");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to load media: {}", e),
            );
        }
    };

    match state.repository.reset_for_reprocess(media_id).await {
        Ok(true) => {}
        Ok(false) => {
            return error_response(
                StatusCode::NOT_FOUND,
                format!("Media not found: {}", media_id),
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to reset media to pending");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to reset media: {}", e),
            );
        }
    }

    if let Err(e) = state.queue.enqueue(EnqueueRequest::from_media(&media)).await {
        return error_response(StatusCode::UNPROCESSABLE_ENTITY, e.to_string());
    }

    (
        StatusCode::ACCEPTED,
        Json(ReprocessResponse {
            media_id: media_id.to_string(),
            status: ProcessingStatus::Pending.to_string(),
        }),
    )
        .into_response()
}
