use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::application::ports::{AnalysisError, AnalysisProvider};
use crate::domain::{Embedding, ImageAnalysis, ServiceCategory};
use crate::infrastructure::observability::sanitize_prompt;

const TAGGING_PROMPT: &str = "You label photos for a services marketplace. \
Return only a JSON array of 5 to 15 short lowercase tags describing what is visible, \
most relevant first. No prose.";

/// Talks to an OpenAI-compatible vision chat endpoint for tags and a
/// multimodal embedding endpoint for vectors.
pub struct HttpAnalysisProvider {
    client: Client,
    base_url: String,
    api_key: String,
    vision_model: String,
    embedding_url: String,
    embedding_dimension: usize,
}

impl HttpAnalysisProvider {
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

    pub fn new(
        base_url: &str,
        api_key: &str,
        vision_model: &str,
        embedding_url: &str,
        embedding_dimension: usize,
    ) -> Result<Self, AnalysisError> {
        let client = Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AnalysisError::ApiRequestFailed(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            vision_model: vision_model.to_string(),
            embedding_url: embedding_url.to_string(),
            embedding_dimension,
        })
    }

    async fn check_status(response: Response, image_len: usize) -> Result<Response, AnalysisError> {
        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => Err(AnalysisError::RateLimited),
            StatusCode::PAYLOAD_TOO_LARGE => Err(AnalysisError::ImageTooLarge(image_len)),
            status if !status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                Err(AnalysisError::ApiRequestFailed(format!(
                    "HTTP {}: {}",
                    status, body
                )))
            }
            _ => Ok(response),
        }
    }
}

#[derive(Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    instances: Vec<EmbeddingInstance<'a>>,
    parameters: EmbeddingParameters,
}

#[derive(Serialize)]
struct EmbeddingInstance<'a> {
    image: EmbeddingImage,
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbeddingImage {
    bytes_base64_encoded: String,
}

#[derive(Serialize)]
struct EmbeddingParameters {
    dimension: usize,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    predictions: Vec<Prediction>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    image_embedding: Vec<f32>,
}

#[async_trait]
impl AnalysisProvider for HttpAnalysisProvider {
    #[tracing::instrument(skip(self, image), fields(bytes = image.len(), category = %category))]
    async fn analyze(
        &self,
        image: &[u8],
        category: ServiceCategory,
    ) -> Result<ImageAnalysis, AnalysisError> {
        let data_uri = format!(
            "data:{};base64,{}",
            image_mime(image),
            general_purpose::STANDARD.encode(image)
        );

        let body = serde_json::json!({
            "model": self.vision_model,
            "messages": [
                {
                    "role": "user",
                    "content": [
                        {
                            "type": "image_url",
                            "image_url": { "url": data_uri }
                        },
                        {
                            "type": "text",
                            "text": format!("{} {}", TAGGING_PROMPT, category.analysis_hint())
                        }
                    ]
                }
            ],
            "max_tokens": 256,
            "temperature": 0.0,
            "stream": false
        });

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| AnalysisError::ApiRequestFailed(e.to_string()))?;
        let response = Self::check_status(response, image.len()).await?;

        let completion: ChatCompletion = response
            .json()
            .await
            .map_err(|e| AnalysisError::InvalidResponse(e.to_string()))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AnalysisError::InvalidResponse("empty completion".to_string()))?;

        Ok(ImageAnalysis::new(parse_tags(&content)))
    }

    #[tracing::instrument(skip(self, image, context), fields(bytes = image.len()))]
    async fn embed(&self, image: &[u8], context: &str) -> Result<Embedding, AnalysisError> {
        tracing::debug!(context = %sanitize_prompt(context), "Requesting image embedding");

        let request_body = EmbeddingRequest {
            instances: vec![EmbeddingInstance {
                image: EmbeddingImage {
                    bytes_base64_encoded: general_purpose::STANDARD.encode(image),
                },
                text: context,
            }],
            parameters: EmbeddingParameters {
                dimension: self.embedding_dimension,
            },
        };

        let response = self
            .client
            .post(&self.embedding_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| AnalysisError::ApiRequestFailed(e.to_string()))?;
        let response = Self::check_status(response, image.len()).await?;

        let embedding_response: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::InvalidResponse(e.to_string()))?;

        embedding_response
            .predictions
            .into_iter()
            .next()
            .map(|p| Embedding::new(p.image_embedding))
            .ok_or_else(|| AnalysisError::InvalidResponse("empty predictions".to_string()))
    }
}

/// Accepts a JSON array, optionally wrapped in a code fence, or falls back
/// to comma/newline separated text.
pub fn parse_tags(content: &str) -> Vec<String> {
    let trimmed = content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    if let Ok(tags) = serde_json::from_str::<Vec<String>>(trimmed) {
        return tags;
    }

    trimmed
        .split([',', '\n'])
        .map(|t| t.trim().trim_start_matches('-').trim().trim_matches('"'))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn image_mime(bytes: &[u8]) -> &'static str {
    image::guess_format(bytes)
        .map(|format| format.to_mime_type())
        .unwrap_or("application/octet-stream")
}
