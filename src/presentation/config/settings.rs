use std::time::Duration;

use config::{Config, ConfigError, Environment as EnvironmentSource, File};
use serde::Deserialize;

use crate::application::services::{
    DEFAULT_CALL_TIMEOUT, DEFAULT_EMBEDDING_DIMENSION, DEFAULT_ENRICHMENT_TAG_COUNT,
    DEFAULT_INTER_JOB_DELAY, DEFAULT_MAX_RETRIES, DEFAULT_RECOVERY_BATCH_LIMIT,
    DEFAULT_STALE_THRESHOLD, QueueConfig, RecoveryConfig,
};

use super::Environment;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub queue: QueueSettings,
    #[serde(default)]
    pub recovery: RecoverySettings,
    pub analysis: AnalysisSettings,
    #[serde(default)]
    pub fetch: FetchSettings,
    pub logging: LoggingSettings,
}

impl Settings {
    /// Layers `appsettings.{env}.toml` (optional) under `APP_*` environment
    /// variables, e.g. `APP_QUEUE__MAX_RETRIES=5`.
    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("database.max_connections", 10)?
            .set_default("database.run_migrations", true)?
            .set_default("analysis.provider", "mock")?
            .set_default("analysis.vision_model", "gpt-4o-mini")?
            .set_default("analysis.embedding_dimension", DEFAULT_EMBEDDING_DIMENSION as i64)?
            .set_default("logging.level", "info")?
            .set_default("logging.enable_json", false)?
            .add_source(
                File::with_name(&format!(
                    "appsettings.{}",
                    environment.as_str().to_lowercase()
                ))
                .required(false),
            )
            .add_source(
                EnvironmentSource::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Absent means the in-memory record store (scaffold mode).
    pub url: Option<String>,
    pub max_connections: u32,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueueSettings {
    pub inter_job_delay_ms: u64,
    pub max_retries: u32,
    pub call_timeout_secs: u64,
    pub enrichment_tag_count: usize,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            inter_job_delay_ms: DEFAULT_INTER_JOB_DELAY.as_millis() as u64,
            max_retries: DEFAULT_MAX_RETRIES,
            call_timeout_secs: DEFAULT_CALL_TIMEOUT.as_secs(),
            enrichment_tag_count: DEFAULT_ENRICHMENT_TAG_COUNT,
        }
    }
}

impl QueueSettings {
    pub fn queue_config(&self) -> QueueConfig {
        QueueConfig {
            inter_job_delay: Duration::from_millis(self.inter_job_delay_ms),
            max_retries: self.max_retries,
        }
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecoverySettings {
    pub batch_limit: usize,
    pub stale_threshold_secs: u64,
    pub run_on_startup: bool,
}

impl Default for RecoverySettings {
    fn default() -> Self {
        Self {
            batch_limit: DEFAULT_RECOVERY_BATCH_LIMIT,
            stale_threshold_secs: DEFAULT_STALE_THRESHOLD.as_secs(),
            run_on_startup: true,
        }
    }
}

impl RecoverySettings {
    pub fn recovery_config(&self) -> RecoveryConfig {
        RecoveryConfig {
            batch_limit: self.batch_limit,
            stale_threshold: Duration::from_secs(self.stale_threshold_secs),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisProviderSetting {
    Mock,
    Http,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisSettings {
    pub provider: AnalysisProviderSetting,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub vision_model: String,
    pub embedding_url: Option<String>,
    pub embedding_dimension: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    pub max_image_bytes: usize,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            max_image_bytes: 20 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub enable_json: bool,
}
