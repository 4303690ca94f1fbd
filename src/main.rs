use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use vitrine::application::ports::{ImageFetcher, MediaRepository};
use vitrine::application::services::{MediaProcessingQueue, MediaProcessor, RecoveryScanner};
use vitrine::infrastructure::analysis::AnalysisProviderFactory;
use vitrine::infrastructure::fetch::{HttpImageFetcher, MockImageFetcher};
use vitrine::infrastructure::observability::{TracingConfig, init_tracing};
use vitrine::infrastructure::persistence::{
    InMemoryMediaRepository, PgMediaRepository, create_pool, run_migrations,
};
use vitrine::presentation::config::AnalysisProviderSetting;
use vitrine::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment).context("Failed to load settings")?;

    init_tracing(&TracingConfig::from_settings(
        environment.as_str(),
        &settings.logging.level,
        settings.logging.enable_json,
    ));

    let repository: Arc<dyn MediaRepository> = match settings.database.url.as_deref() {
        Some(url) => {
            let pool = create_pool(url, settings.database.max_connections).await?;
            if settings.database.run_migrations {
                run_migrations(&pool).await?;
            }
            Arc::new(PgMediaRepository::new(pool))
        }
        None => {
            tracing::warn!("No database url configured, using in-memory media store");
            Arc::new(InMemoryMediaRepository::new())
        }
    };

    let fetcher: Arc<dyn ImageFetcher> = match settings.analysis.provider {
        AnalysisProviderSetting::Mock => Arc::new(MockImageFetcher),
        AnalysisProviderSetting::Http => {
            Arc::new(HttpImageFetcher::new(settings.fetch.max_image_bytes)?)
        }
    };
    let provider = AnalysisProviderFactory::create(&settings.analysis)?;

    let processor = MediaProcessor::new(
        Arc::clone(&repository),
        fetcher,
        provider,
        settings.queue.call_timeout(),
        settings.queue.enrichment_tag_count,
        settings.analysis.embedding_dimension,
    );
    let queue = MediaProcessingQueue::new(processor, settings.queue.queue_config());
    let recovery = Arc::new(RecoveryScanner::new(
        Arc::clone(&repository),
        queue.clone(),
        settings.recovery.recovery_config(),
    ));

    if settings.recovery.run_on_startup {
        match recovery.recover().await {
            Ok(report) => tracing::info!(
                recovered = report.recovered_count,
                "Startup recovery finished"
            ),
            Err(e) => tracing::error!(error = %e, "Startup recovery failed"),
        }
    }

    let state = AppState {
        queue: queue.clone(),
        recovery,
        repository,
    };
    let router = create_router(state);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("Invalid server address")?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment = %environment, "Listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Draining media queue before exit");
    queue.wait_until_idle().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
