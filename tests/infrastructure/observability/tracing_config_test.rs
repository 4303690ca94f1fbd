use vitrine::infrastructure::observability::TracingConfig;

#[test]
fn given_settings_when_building_config_then_fields_are_copied() {
    let config = TracingConfig::from_settings("Prod", "warn", true);

    assert_eq!(config.environment, "Prod");
    assert_eq!(config.default_level, "warn");
    assert!(config.json_format);
}

#[test]
fn given_level_when_building_filter_then_crate_and_dependencies_are_scoped() {
    let config = TracingConfig::from_settings("Local", "debug", false);

    assert_eq!(
        config.filter_directive(),
        "debug,vitrine=debug,tower_http=debug,sqlx=warn"
    );
}

#[test]
fn given_default_config_when_created_then_environment_is_set() {
    let config = TracingConfig::default();
    assert!(!config.environment.is_empty());
    assert_eq!(config.default_level, "info");
}
