use vitrine::domain::ServiceCategory;
use vitrine::infrastructure::analysis::{AnalysisProviderFactory, AnalysisProviderFactoryError};
use vitrine::presentation::config::{AnalysisProviderSetting, AnalysisSettings};

fn settings(provider: AnalysisProviderSetting) -> AnalysisSettings {
    AnalysisSettings {
        provider,
        base_url: Some("http://localhost:1234".to_string()),
        api_key: Some("test-key".to_string()),
        vision_model: "gpt-4o-mini".to_string(),
        embedding_url: Some("http://localhost:1235/predict".to_string()),
        embedding_dimension: 16,
    }
}

#[tokio::test]
async fn given_mock_setting_when_creating_then_provider_returns_configured_dimension() {
    let provider = AnalysisProviderFactory::create(&settings(AnalysisProviderSetting::Mock))
        .unwrap_or_else(|e| panic!("factory failed: {e}"));

    let analysis = provider.analyze(b"img", ServiceCategory::Tattoo).await.unwrap();
    let embedding = provider.embed(b"img", "context").await.unwrap();

    assert!(analysis.tags.contains(&"tattoo".to_string()));
    assert_eq!(embedding.dimensions(), 16);
}

#[test]
fn given_http_setting_without_api_key_when_creating_then_missing_setting() {
    let mut config = settings(AnalysisProviderSetting::Http);
    config.api_key = None;

    match AnalysisProviderFactory::create(&config) {
        Err(AnalysisProviderFactoryError::MissingSetting(name)) => {
            assert_eq!(name, "analysis.api_key")
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected missing api key"),
    }
}

#[test]
fn given_http_setting_without_embedding_url_when_creating_then_missing_setting() {
    let mut config = settings(AnalysisProviderSetting::Http);
    config.embedding_url = None;

    assert!(matches!(
        AnalysisProviderFactory::create(&config),
        Err(AnalysisProviderFactoryError::MissingSetting("analysis.embedding_url"))
    ));
}

#[test]
fn given_complete_http_setting_when_creating_then_succeeds() {
    assert!(AnalysisProviderFactory::create(&settings(AnalysisProviderSetting::Http)).is_ok());
}
