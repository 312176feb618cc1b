//! Image extractor backed by an external vision call

use async_trait::async_trait;
use std::sync::Arc;

use super::fragment::{SourceFile, TextFragment};
use super::parser::Extractor;
use super::progress::ProgressSink;
use super::routing::FileKind;
use crate::error::{Error, Result};
use crate::providers::{VisionBackend, VisionRequest};

/// Sends the whole image to a vision-capable model and keeps its transcription
pub struct ImageExtractor {
    vision: Arc<dyn VisionBackend>,
}

impl ImageExtractor {
    /// Create an extractor over a vision backend
    pub fn new(vision: Arc<dyn VisionBackend>) -> Self {
        Self { vision }
    }
}

#[async_trait]
impl Extractor for ImageExtractor {
    fn kind(&self) -> FileKind {
        FileKind::Image
    }

    async fn extract(&self, file: &SourceFile, _progress: &dyn ProgressSink) -> Result<TextFragment> {
        let request = VisionRequest {
            data: file.bytes.clone(),
            mime_type: file.resolved_mime_type(),
        };

        tracing::info!("Requesting image analysis for {} ({})", file.name, request.mime_type);

        // Not retried: the failure belongs to this file only
        let description = self
            .vision
            .describe_image(&request)
            .await
            .map_err(|e| Error::extraction(&file.name, format!("image analysis failed: {}", e)))?;

        let description = description.trim();
        if description.is_empty() {
            return Err(Error::extraction(&file.name, "image analysis returned no text"));
        }

        let mut fragment = TextFragment::new(&file.name, FileKind::Image);
        fragment.push_body(description);
        Ok(fragment)
    }
}
