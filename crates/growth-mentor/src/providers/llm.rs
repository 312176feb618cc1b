//! Backend traits for text generation and image analysis

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;

use crate::error::Result;
use crate::generation::GenerationPayload;

/// Raw reply from a generative backend
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendResponse {
    /// Reply text, thought parts excluded
    pub text: String,
    /// Grounding chunks; `None` when the backend attached no grounding metadata
    pub grounding_chunks: Option<Vec<GroundingChunk>>,
}

/// One grounding entry; only entries with a web field become sources
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GroundingChunk {
    #[serde(default)]
    pub web: Option<WebChunk>,
}

/// Web source of a grounding chunk
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WebChunk {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Trait for chat generation backends
///
/// Implementations:
/// - `GeminiClient`: Gemini `generateContent` over HTTPS
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Credentials are present; checked before any network call
    fn is_configured(&self) -> bool;

    /// Run one generation call
    async fn generate(&self, payload: &GenerationPayload) -> Result<BackendResponse>;

    /// Provider name for logging
    fn name(&self) -> &str;
}

/// Image bytes handed to a vision backend
#[derive(Debug, Clone)]
pub struct VisionRequest {
    pub data: Bytes,
    pub mime_type: String,
}

/// Trait for multimodal backends that describe images as text
#[async_trait]
pub trait VisionBackend: Send + Sync {
    /// Transcribe and describe an image
    async fn describe_image(&self, request: &VisionRequest) -> Result<String>;
}
