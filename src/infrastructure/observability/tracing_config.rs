/// Configuration for tracing initialization.
pub struct TracingConfig {
    pub environment: String,
    pub json_format: bool,
    /// Fallback filter directive when `RUST_LOG` is unset.
    pub default_level: String,
}

impl TracingConfig {
    pub fn from_settings(environment: &str, level: &str, json_format: bool) -> Self {
        Self {
            environment: environment.to_string(),
            json_format,
            default_level: level.to_string(),
        }
    }

    pub fn filter_directive(&self) -> String {
        format!(
            "{level},vitrine={level},tower_http=debug,sqlx=warn",
            level = self.default_level
        )
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            environment: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            json_format: std::env::var("LOG_FORMAT")
                .map(|v| v.to_lowercase() == "json")
                .unwrap_or(false),
            default_level: "info".to_string(),
        }
    }
}
