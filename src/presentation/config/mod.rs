mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    AnalysisProviderSetting, AnalysisSettings, DatabaseSettings, FetchSettings, LoggingSettings,
    QueueSettings, RecoverySettings, ServerSettings, Settings,
};
