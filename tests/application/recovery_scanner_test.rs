use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use vitrine::application::ports::{ImageFetcher, MediaRepository};
use vitrine::application::services::{
    EnqueueRequest, MediaProcessingQueue, QueueConfig, RecoveryConfig, RecoveryReport, RecoveryScanner,
};
use vitrine::domain::{MediaWithContext, ProcessingStatus};
use vitrine::infrastructure::persistence::InMemoryMediaRepository;

use crate::helpers::{
    FlakyMediaRepository, GatedImageFetcher, ScriptedAnalysisProvider, UrlImageFetcher, build_queue, media_with_service,
    seeded_repository, stale_processing_media,
};

fn fast_config() -> QueueConfig {
    QueueConfig {
        inter_job_delay: Duration::from_millis(1),
        ..QueueConfig::default()
    }
}

fn scanner(
    repository: &Arc<InMemoryMediaRepository>,
    queue: &MediaProcessingQueue,
    config: RecoveryConfig,
) -> RecoveryScanner {
    let repository: Arc<dyn MediaRepository> = repository.clone();
    RecoveryScanner::new(repository, queue.clone(), config)
}

struct Harness {
    repository: Arc<InMemoryMediaRepository>,
    provider: Arc<ScriptedAnalysisProvider>,
    queue: MediaProcessingQueue,
    scanner: RecoveryScanner,
}

async fn harness(media: &[MediaWithContext], fetcher: Arc<dyn ImageFetcher>) -> Harness {
    let repository = seeded_repository(media).await;
    let provider = Arc::new(ScriptedAnalysisProvider::new());
    let queue = build_queue(repository.clone(), fetcher, provider.clone(), fast_config());
    let scanner = scanner(&repository, &queue, RecoveryConfig::default());
    Harness {
        repository,
        provider,
        queue,
        scanner,
    }
}

async fn status_of(repository: &InMemoryMediaRepository, media: &MediaWithContext) -> ProcessingStatus {
    repository
        .get_by_id(media.record.id)
        .await
        .unwrap()
        .unwrap()
        .record
        .processing_status
}

#[tokio::test]
async fn given_empty_backlog_when_recovering_then_report_is_zero_and_no_loop_starts() {
    let h = harness(&[], Arc::new(UrlImageFetcher)).await;

    let report = h.scanner.recover().await.unwrap();

    assert_eq!(report, RecoveryReport::default());
    assert_eq!(h.queue.snapshot().await.drain_loops_started, 0);
}

#[tokio::test]
async fn given_pending_records_when_recovering_then_all_are_enqueued_and_completed() {
    let a = media_with_service("https://cdn.example.com/a.jpg", "hair");
    let b = media_with_service("https://cdn.example.com/b.jpg", "lashes");
    let h = harness(&[a.clone(), b.clone()], Arc::new(UrlImageFetcher)).await;

    let report = h.scanner.recover().await.unwrap();
    h.queue.wait_until_idle().await;

    assert_eq!(
        report,
        RecoveryReport {
            recovered_count: 2,
            pending_count: 2,
            stuck_count: 0,
        }
    );
    assert_eq!(status_of(&h.repository, &a).await, ProcessingStatus::Completed);
    assert_eq!(status_of(&h.repository, &b).await, ProcessingStatus::Completed);
}

#[tokio::test]
async fn given_stale_processing_record_when_recovering_then_it_is_reset_and_reprocessed() {
    let stuck = stale_processing_media(
        "https://cdn.example.com/stuck.jpg",
        Utc::now() - chrono::Duration::minutes(10),
    );
    let h = harness(&[stuck.clone()], Arc::new(UrlImageFetcher)).await;

    let report = h.scanner.recover().await.unwrap();
    h.queue.wait_until_idle().await;

    assert_eq!(report.stuck_count, 1);
    assert_eq!(report.recovered_count, 1);
    assert_eq!(h.provider.analyze_count(), 1);
    assert_eq!(
        status_of(&h.repository, &stuck).await,
        ProcessingStatus::Completed
    );
}

#[tokio::test]
async fn given_recently_claimed_record_when_recovering_then_it_is_left_alone() {
    let fresh = stale_processing_media(
        "https://cdn.example.com/fresh.jpg",
        Utc::now() - chrono::Duration::minutes(1),
    );
    let h = harness(&[fresh.clone()], Arc::new(UrlImageFetcher)).await;

    let report = h.scanner.recover().await.unwrap();

    assert_eq!(report, RecoveryReport::default());
    assert!(h.provider.calls().is_empty());
    assert_eq!(
        status_of(&h.repository, &fresh).await,
        ProcessingStatus::Processing
    );
}

#[tokio::test]
async fn given_terminal_records_when_recovering_then_nothing_is_enqueued() {
    let mut completed = media_with_service("https://cdn.example.com/done.jpg", "hair");
    completed.record.processing_status = ProcessingStatus::Completed;
    let mut failed = media_with_service("https://cdn.example.com/failed.jpg", "hair");
    failed.record.processing_status = ProcessingStatus::Failed;
    failed.record.updated_at = Utc::now() - chrono::Duration::hours(1);
    let h = harness(&[completed.clone(), failed.clone()], Arc::new(UrlImageFetcher)).await;

    let report = h.scanner.recover().await.unwrap();

    assert_eq!(report, RecoveryReport::default());
    assert_eq!(h.queue.snapshot().await.drain_loops_started, 0);
    assert_eq!(status_of(&h.repository, &failed).await, ProcessingStatus::Failed);
}

#[tokio::test]
async fn given_backlog_larger_than_batch_when_recovering_then_batch_limit_applies() {
    let media: Vec<_> = (0..60)
        .map(|i| media_with_service(&format!("https://cdn.example.com/{i}.jpg"), "hair"))
        .collect();
    let fetcher = Arc::new(GatedImageFetcher::new());
    let h = harness(&media, fetcher.clone()).await;

    let report = h.scanner.recover().await.unwrap();

    assert_eq!(report.pending_count, 50);
    assert_eq!(report.recovered_count, 50);

    fetcher.release();
    h.queue.wait_until_idle().await;
    assert_eq!(h.provider.analyze_count(), 50);
}

#[tokio::test]
async fn given_recovery_already_ran_when_recovering_again_then_no_job_is_duplicated() {
    let a = media_with_service("https://cdn.example.com/a.jpg", "hair");
    let b = media_with_service("https://cdn.example.com/b.jpg", "hair");
    let fetcher = Arc::new(GatedImageFetcher::new());
    let h = harness(&[a.clone(), b.clone()], fetcher.clone()).await;

    let first = h.scanner.recover().await.unwrap();
    fetcher.wait_for_arrival().await;
    let second = h.scanner.recover().await.unwrap();

    assert_eq!(first.recovered_count, 2);
    assert_eq!(second, RecoveryReport::default());
    let snapshot = h.queue.snapshot().await;
    assert_eq!(snapshot.queued, 1);
    assert_eq!(snapshot.drain_loops_started, 1);

    fetcher.release();
    h.queue.wait_until_idle().await;
    assert_eq!(h.provider.analyze_count(), 2);
}

#[tokio::test]
async fn given_custom_threshold_when_recovering_then_threshold_decides_staleness() {
    let stuck = stale_processing_media(
        "https://cdn.example.com/stuck.jpg",
        Utc::now() - chrono::Duration::seconds(30),
    );
    let repository = seeded_repository(&[stuck.clone()]).await;
    let provider = Arc::new(ScriptedAnalysisProvider::new());
    let queue = build_queue(
        repository.clone(),
        Arc::new(UrlImageFetcher),
        provider.clone(),
        fast_config(),
    );
    let scanner = scanner(
        &repository,
        &queue,
        RecoveryConfig {
            batch_limit: 10,
            stale_threshold: Duration::from_secs(10),
        },
    );

    let report = scanner.recover().await.unwrap();
    queue.wait_until_idle().await;

    assert_eq!(report.stuck_count, 1);
    assert_eq!(status_of(&repository, &stuck).await, ProcessingStatus::Completed);
}

#[tokio::test]
async fn given_terminal_write_fails_when_budget_runs_out_then_record_stays_processing_until_recovery_reclaims_it()
 {
    let media = media_with_service("https://cdn.example.com/a.jpg", "hair");
    let store = seeded_repository(&[media.clone()]).await;
    let repository = Arc::new(FlakyMediaRepository::new(store.clone()));
    repository.set_mark_failed_broken(true);
    let provider = Arc::new(ScriptedAnalysisProvider::new().failing(&media.record.media_url, 4));
    let queue = build_queue(
        repository.clone(),
        Arc::new(UrlImageFetcher),
        provider.clone(),
        fast_config(),
    );

    queue
        .enqueue(EnqueueRequest::from_media(&media))
        .await
        .unwrap();
    queue.wait_until_idle().await;

    assert_eq!(provider.analyze_count(), 4);
    let mut orphaned = store.get_by_id(media.record.id).await.unwrap().unwrap();
    assert_eq!(orphaned.record.processing_status, ProcessingStatus::Processing);
    assert!(orphaned.record.processing_error.is_none());

    orphaned.record.updated_at = Utc::now() - chrono::Duration::minutes(10);
    store.insert(orphaned).await;
    repository.set_mark_failed_broken(false);
    let scanner = RecoveryScanner::new(repository.clone(), queue.clone(), RecoveryConfig::default());

    let report = scanner.recover().await.unwrap();
    queue.wait_until_idle().await;

    assert_eq!(report.stuck_count, 1);
    assert_eq!(report.recovered_count, 1);
    assert_eq!(provider.analyze_count(), 5);
    assert_eq!(status_of(&store, &media).await, ProcessingStatus::Completed);
}

#[tokio::test]
async fn given_stale_row_moved_on_before_reset_when_recovering_then_it_is_neither_counted_nor_enqueued()
 {
    let stuck = stale_processing_media(
        "https://cdn.example.com/stuck.jpg",
        Utc::now() - chrono::Duration::minutes(10),
    );
    let store = seeded_repository(&[stuck.clone()]).await;
    let repository = Arc::new(FlakyMediaRepository::new(store.clone()).skipping_stale_resets());
    let provider = Arc::new(ScriptedAnalysisProvider::new());
    let queue = build_queue(
        repository.clone(),
        Arc::new(UrlImageFetcher),
        provider.clone(),
        fast_config(),
    );
    let scanner = RecoveryScanner::new(repository, queue.clone(), RecoveryConfig::default());

    let report = scanner.recover().await.unwrap();

    assert_eq!(report, RecoveryReport::default());
    assert_eq!(queue.snapshot().await.drain_loops_started, 0);
    assert!(provider.calls().is_empty());
}
