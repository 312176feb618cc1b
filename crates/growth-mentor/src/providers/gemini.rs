//! Gemini client for chat generation and image analysis
//!
//! Talks to the public `generateContent` REST endpoint with an API key.

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::llm::{BackendResponse, GenerativeBackend, GroundingChunk, VisionBackend, VisionRequest};
use crate::config::{GeminiConfig, ModelTable};
use crate::error::{Error, Result};
use crate::generation::templates::VISION_PROMPT;
use crate::generation::GenerationPayload;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini client over the Generative Language API
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    vision_model: String,
    temperature: Option<f32>,
    max_output_tokens: Option<u32>,
}

impl GeminiClient {
    /// Create a client. A missing key is allowed here and reported by
    /// `is_configured`, so callers can surface it before any request.
    pub fn new(config: &GeminiConfig, models: &ModelTable) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            api_key: config.api_key().map(str::to_string),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            vision_model: models.vision.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        })
    }

    /// Get the API endpoint URL for a model
    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    fn require_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| Error::config("Gemini API key is not set"))
    }

    async fn post(&self, model: &str, request: &GenerateRequest) -> Result<GenerateResponse> {
        let key = self.require_key()?;

        let response = self
            .http
            .post(self.endpoint(model))
            .header(API_KEY_HEADER, key)
            .json(request)
            .send()
            .await
            .map_err(|e| Error::generation(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|envelope| envelope.error.message)
                .unwrap_or(body);
            return Err(Error::generation(format!(
                "Gemini returned {}: {}",
                status, message
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::generation(format!("Failed to parse Gemini response: {}", e)))
    }

    fn generation_config(&self, thinking_budget: Option<u32>) -> Option<GenerationConfig> {
        let config = GenerationConfig {
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
            thinking_config: thinking_budget.map(|thinking_budget| ThinkingConfig { thinking_budget }),
        };
        if config.temperature.is_none()
            && config.max_output_tokens.is_none()
            && config.thinking_config.is_none()
        {
            None
        } else {
            Some(config)
        }
    }

    fn build_request(&self, payload: &GenerationPayload) -> GenerateRequest {
        let mut contents: Vec<Content> = payload
            .history
            .iter()
            .map(|entry| Content::text(entry.role.as_str(), &entry.text))
            .collect();
        contents.push(Content::text("user", &payload.message));

        let tools = if payload.options.search_enabled {
            vec![Tool {
                google_search: GoogleSearch {},
            }]
        } else {
            Vec::new()
        };

        GenerateRequest {
            system_instruction: Some(Content {
                role: None,
                parts: vec![Part::text(&payload.system_instruction)],
            }),
            contents,
            tools,
            generation_config: self.generation_config(payload.options.reasoning_budget),
        }
    }
}

#[async_trait]
impl GenerativeBackend for GeminiClient {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate(&self, payload: &GenerationPayload) -> Result<BackendResponse> {
        let model = &payload.options.endpoint_model_id;
        let request = self.build_request(payload);

        tracing::debug!(
            "Gemini request: model={} history={} search={} budget={:?}",
            model,
            payload.history.len(),
            payload.options.search_enabled,
            payload.options.reasoning_budget
        );

        let response = self.post(model, &request).await?;
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| Error::generation("Gemini returned no candidates"))?;

        Ok(BackendResponse {
            text: candidate.text(),
            grounding_chunks: candidate
                .grounding_metadata
                .and_then(|metadata| metadata.grounding_chunks),
        })
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

#[async_trait]
impl VisionBackend for GeminiClient {
    async fn describe_image(&self, request: &VisionRequest) -> Result<String> {
        let data = base64::engine::general_purpose::STANDARD.encode(&request.data);

        let body = GenerateRequest {
            system_instruction: None,
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    Part {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: request.mime_type.clone(),
                            data,
                        }),
                    },
                    Part::text(VISION_PROMPT),
                ],
            }],
            tools: Vec::new(),
            generation_config: self.generation_config(None),
        };

        let response = self.post(&self.vision_model, &body).await?;
        Ok(response
            .candidates
            .into_iter()
            .next()
            .map(|candidate| candidate.text())
            .unwrap_or_default())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

impl Content {
    fn text(role: &str, text: &str) -> Self {
        Self {
            role: Some(role.to_string()),
            parts: vec![Part::text(text)],
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            inline_data: None,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Serialize)]
struct GoogleSearch {}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<ThinkingConfig>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

impl Candidate {
    /// Concatenated answer text, thought summaries skipped
    fn text(&self) -> String {
        self.content
            .iter()
            .flat_map(|content| content.parts.iter())
            .filter(|part| !part.thought)
            .filter_map(|part| part.text.as_deref())
            .collect()
    }
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Option<Vec<GroundingChunk>>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{GenerationOptions, HistoryEntry};
    use crate::types::Role;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, key: Option<&str>) -> GeminiClient {
        let config = GeminiConfig {
            api_key: key.map(str::to_string),
            base_url: server.uri(),
            ..GeminiConfig::default()
        };
        GeminiClient::new(&config, &ModelTable::default()).unwrap()
    }

    fn payload(search_enabled: bool, reasoning_budget: Option<u32>) -> GenerationPayload {
        GenerationPayload {
            options: GenerationOptions {
                endpoint_model_id: "gemini-2.5-flash".to_string(),
                search_enabled,
                reasoning_budget,
            },
            system_instruction: "You are a mentor.".to_string(),
            history: vec![
                HistoryEntry {
                    role: Role::User,
                    text: "What is CAC?".to_string(),
                },
                HistoryEntry {
                    role: Role::Model,
                    text: "Customer acquisition cost.".to_string(),
                },
            ],
            message: "How do I lower it?".to_string(),
        }
    }

    #[tokio::test]
    async fn test_generate_sends_search_tool_and_reads_grounding() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({
                "systemInstruction": { "parts": [{ "text": "You are a mentor." }] },
                "tools": [{ "google_search": {} }],
                "contents": [
                    { "role": "user", "parts": [{ "text": "What is CAC?" }] },
                    { "role": "model", "parts": [{ "text": "Customer acquisition cost." }] },
                    { "role": "user", "parts": [{ "text": "How do I lower it?" }] }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": { "parts": [
                        { "text": "planning...", "thought": true },
                        { "text": "Improve " },
                        { "text": "targeting." }
                    ]},
                    "groundingMetadata": {
                        "groundingChunks": [
                            { "web": { "uri": "https://example.com/cac", "title": "CAC guide" } },
                            { "retrievedContext": { "uri": "gs://bucket/doc" } }
                        ]
                    }
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Some("test-key"));
        let response = client.generate(&payload(true, None)).await.unwrap();

        assert_eq!(response.text, "Improve targeting.");
        let chunks = response.grounding_chunks.unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(
            chunks[0].web.as_ref().and_then(|w| w.uri.as_deref()),
            Some("https://example.com/cac")
        );
        assert!(chunks[1].web.is_none());
    }

    #[tokio::test]
    async fn test_generate_sends_thinking_budget() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .and(body_partial_json(json!({
                "generationConfig": { "thinkingConfig": { "thinkingBudget": 32768 } }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [{ "text": "Deep answer" }] } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Some("test-key"));
        let response = client.generate(&payload(false, Some(32768))).await.unwrap();
        assert_eq!(response.text, "Deep answer");
        assert!(response.grounding_chunks.is_none());
    }

    #[tokio::test]
    async fn test_backend_error_message_surfaces() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": { "code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED" }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("test-key"));
        let err = client.generate(&payload(false, None)).await.unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
        assert!(err.to_string().contains("Resource has been exhausted"));
    }

    #[tokio::test]
    async fn test_missing_key_never_calls_backend() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server, Some("   "));
        assert!(!client.is_configured());
        let err = client.generate(&payload(false, None)).await.unwrap_err();
        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn test_describe_image_sends_inline_data() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .and(body_partial_json(json!({
                "contents": [{
                    "role": "user",
                    "parts": [{ "inlineData": { "mimeType": "image/png", "data": "iVBORw==" } }]
                }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [{ "text": "| month | visits |" }] } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Some("test-key"));
        let request = VisionRequest {
            data: bytes::Bytes::from_static(&[0x89, 0x50, 0x4e, 0x47]),
            mime_type: "image/png".to_string(),
        };
        let description = client.describe_image(&request).await.unwrap();
        assert_eq!(description, "| month | visits |");
    }
}
