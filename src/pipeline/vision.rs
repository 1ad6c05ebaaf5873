//! HTTP client for the multimodal model that reads the scanned PDFs.
//!
//! The PDF travels base64-encoded as inline data next to a text prompt; the
//! model is asked to answer with JSON.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info_span, Instrument};

use crate::config::ServiceConfig;
use crate::error::{PipelineError, Result};

const PDF_MIME_TYPE: &str = "application/pdf";

/// A model that answers a prompt about one PDF.
#[async_trait]
pub trait VisionClient: Send + Sync {
    /// Returns the raw text of the model's answer.
    async fn generate(&self, prompt: &str, pdf_bytes: &[u8]) -> Result<String>;
}

// --- generateContent wire format ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    InlineData { inline_data: InlineData },
    Text { text: &'a str },
}

#[derive(Serialize)]
struct InlineData {
    mime_type: &'static str,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    temperature: f32,
}

#[derive(Deserialize, Debug)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Debug)]
struct ResponsePart {
    text: Option<String>,
}

/// [`VisionClient`] backed by a `generateContent` endpoint.
pub struct HttpVisionClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl HttpVisionClient {
    pub fn new(config: &ServiceConfig, api_key: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PipelineError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(HttpVisionClient {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    /// Reads the API key from the environment variable named in the config.
    pub fn from_env(config: &ServiceConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).ok();
        if api_key.is_none() {
            tracing::warn!(
                env = %config.api_key_env,
                "API key environment variable not set; requests will be sent unauthenticated"
            );
        }
        HttpVisionClient::new(config, api_key)
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl VisionClient for HttpVisionClient {
    async fn generate(&self, prompt: &str, pdf_bytes: &[u8]) -> Result<String> {
        let span = info_span!("vision_generate", model = %self.model, pdf_size = pdf_bytes.len());
        async move {
            let start = Instant::now();
            let body = GenerateRequest {
                contents: vec![Content {
                    parts: vec![
                        RequestPart::InlineData {
                            inline_data: InlineData {
                                mime_type: PDF_MIME_TYPE,
                                data: base64::engine::general_purpose::STANDARD.encode(pdf_bytes),
                            },
                        },
                        RequestPart::Text { text: prompt },
                    ],
                }],
                generation_config: GenerationConfig {
                    response_mime_type: "application/json",
                    temperature: 0.0,
                },
            };

            let mut request = self.client.post(self.endpoint()).json(&body);
            if let Some(key) = &self.api_key {
                request = request.header("x-goog-api-key", key);
            }

            let response = request.send().await?;
            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(PipelineError::ServiceError(format!(
                    "Vision service returned {}: {}",
                    status, body
                )));
            }

            let parsed: GenerateResponse = response.json().await?;
            let text = response_text(parsed)?;
            debug!(
                elapsed_ms = start.elapsed().as_millis() as u64,
                response_len = text.len(),
                "Vision service answered"
            );
            Ok(text)
        }
        .instrument(span)
        .await
    }
}

fn response_text(response: GenerateResponse) -> Result<String> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(PipelineError::ServiceError(
            "Vision service returned no text".to_string(),
        ));
    }
    Ok(text)
}

/// Removes a surrounding markdown code fence (```json ... ```), if any.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    // Drop the info string ("json") on the opening fence line.
    match rest.find('\n') {
        Some(newline) => rest[newline + 1..].trim(),
        None => rest.trim(),
    }
}

/// Parses a model answer that must be a single JSON object.
pub fn parse_json_object(raw: &str) -> std::result::Result<Map<String, Value>, String> {
    match serde_json::from_str::<Value>(strip_code_fence(raw)) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(format!("expected a JSON object, got {}", json_kind(&other))),
        Err(e) => Err(format!("response is not valid JSON: {}", e)),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
