use std::time::Duration;

use vitrine::application::services::{DEFAULT_MAX_RETRIES, DEFAULT_RECOVERY_BATCH_LIMIT};
use vitrine::presentation::config::{AnalysisProviderSetting, QueueSettings, RecoverySettings};
use vitrine::presentation::{Environment, Settings};

#[test]
fn given_no_settings_file_when_loading_then_defaults_apply() {
    let settings = Settings::load(Environment::Test).expect("settings should load from defaults");

    assert_eq!(settings.server.port, 3000);
    assert_eq!(settings.analysis.provider, AnalysisProviderSetting::Mock);
    assert_eq!(settings.queue.max_retries, DEFAULT_MAX_RETRIES);
    assert_eq!(settings.recovery.batch_limit, DEFAULT_RECOVERY_BATCH_LIMIT);
    assert!(settings.recovery.run_on_startup);
}

#[test]
fn given_default_queue_settings_when_converting_then_one_second_delay_and_three_retries() {
    let config = QueueSettings::default().queue_config();

    assert_eq!(config.inter_job_delay, Duration::from_millis(1000));
    assert_eq!(config.max_retries, 3);
    assert_eq!(QueueSettings::default().call_timeout(), Duration::from_secs(60));
}

#[test]
fn given_default_recovery_settings_when_converting_then_five_minute_threshold() {
    let config = RecoverySettings::default().recovery_config();

    assert_eq!(config.batch_limit, 50);
    assert_eq!(config.stale_threshold, Duration::from_secs(300));
}
