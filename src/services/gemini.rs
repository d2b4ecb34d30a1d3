//! Google Gemini client behind the [`TextGenerator`] trait.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};
use url::Url;

use crate::{
    config::GeminiConfig,
    error::AppError,
    services::generator::{GenerationRequest, ResponseFormat, TextGenerator},
};

#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    endpoint: Url,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiResponseContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    #[serde(default)]
    prompt_token_count: Option<u32>,
    #[serde(default)]
    candidates_token_count: Option<u32>,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self, AppError> {
        if config.api_key.trim().is_empty() {
            return Err(AppError::Config("GEMINI_API_KEY is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| AppError::Config(format!("cannot build HTTP client: {err}")))?;

        let endpoint = config
            .base_url
            .join(&format!("models/{}:generateContent", config.model))
            .map_err(|err| AppError::Config(format!("invalid Gemini model path: {err}")))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

fn build_request(request: GenerationRequest) -> GeminiRequest {
    let generation_config = match request.format {
        ResponseFormat::Json => Some(GeminiGenerationConfig {
            response_mime_type: "application/json",
        }),
        ResponseFormat::Text => None,
    };
    GeminiRequest {
        contents: vec![GeminiContent {
            parts: vec![GeminiPart {
                text: request.prompt,
            }],
        }],
        generation_config,
    }
}

/// Joins the text parts of the first candidate.
fn extract_text(body: &str) -> Result<String, AppError> {
    let response: GeminiResponse = serde_json::from_str(body)
        .map_err(|err| AppError::generation(format!("unreadable Gemini response: {err}")))?;

    if let Some(usage) = &response.usage_metadata {
        debug!(
            prompt_tokens = ?usage.prompt_token_count,
            response_tokens = ?usage.candidates_token_count,
            "Gemini usage"
        );
    }

    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(AppError::generation("Gemini returned no text"));
    }
    Ok(text)
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, request: GenerationRequest) -> Result<String, AppError> {
        info!(format = ?request.format, "calling Gemini");

        let response = self
            .client
            .post(self.endpoint.clone())
            .header("x-goog-api-key", &self.api_key)
            .json(&build_request(request))
            .send()
            .await
            .map_err(|err| AppError::generation(format!("Gemini request failed: {err}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| AppError::generation(format!("Gemini response unreadable: {err}")))?;

        if !status.is_success() {
            error!("Gemini API error: {status} - {body}");
            return Err(AppError::generation(format!("Gemini returned HTTP {status}")));
        }

        extract_text(&body)
    }
}
