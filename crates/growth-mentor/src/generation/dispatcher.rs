//! Sends composed payloads to the backend and normalizes the outcome

use std::sync::Arc;

use super::prompt::GenerationPayload;
use crate::error::{Error, Result};
use crate::providers::{GenerativeBackend, GroundingChunk};
use crate::types::Source;

/// Reply text plus the web sources that grounded it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReply {
    pub text: String,
    /// `None` when the backend returned no web grounding
    pub sources: Option<Vec<Source>>,
}

/// Wraps a backend so every failure comes back as an `Error` value
pub struct GenerationDispatcher {
    backend: Arc<dyn GenerativeBackend>,
}

impl GenerationDispatcher {
    pub fn new(backend: Arc<dyn GenerativeBackend>) -> Self {
        Self { backend }
    }

    /// Run one generation call.
    ///
    /// Returns `Error::Config` without touching the network when the backend
    /// has no credentials; every other failure is an `Error::Generation`.
    pub async fn send(&self, payload: &GenerationPayload) -> Result<GenerationReply> {
        if !self.backend.is_configured() {
            tracing::error!("Generation backend '{}' is not configured", self.backend.name());
            return Err(Error::config(format!(
                "{} backend has no API key configured",
                self.backend.name()
            )));
        }

        tracing::info!(
            "Dispatching to {} model {} ({} history turns)",
            self.backend.name(),
            payload.options.endpoint_model_id,
            payload.history.len()
        );

        let response = self.backend.generate(payload).await.map_err(|e| {
            tracing::error!("Generation failed: {}", e);
            if matches!(e, Error::Config(_) | Error::Generation(_)) {
                e
            } else {
                Error::generation(e.to_string())
            }
        })?;

        if response.text.trim().is_empty() {
            return Err(Error::generation("backend returned an empty reply"));
        }

        Ok(GenerationReply {
            text: response.text,
            sources: extract_sources(response.grounding_chunks.as_deref()),
        })
    }
}

/// Keep only grounding entries with a web URI
pub fn extract_sources(chunks: Option<&[GroundingChunk]>) -> Option<Vec<Source>> {
    let sources: Vec<Source> = chunks?
        .iter()
        .filter_map(|chunk| chunk.web.as_ref())
        .filter_map(|web| {
            let uri = web.uri.as_deref()?.trim();
            if uri.is_empty() {
                return None;
            }
            Some(Source {
                uri: uri.to_string(),
                title: web.title.clone().unwrap_or_default(),
            })
        })
        .collect();

    if sources.is_empty() {
        None
    } else {
        Some(sources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::GenerationOptions;
    use crate::providers::{BackendResponse, WebChunk};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedBackend {
        configured: bool,
        response: Result<BackendResponse>,
        calls: AtomicUsize,
    }

    impl ScriptedBackend {
        fn replying(response: Result<BackendResponse>) -> Self {
            Self {
                configured: true,
                response,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl GenerativeBackend for ScriptedBackend {
        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn generate(&self, _payload: &GenerationPayload) -> Result<BackendResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.response {
                Ok(response) => Ok(response.clone()),
                Err(e) => Err(Error::internal(e.to_string())),
            }
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn payload() -> GenerationPayload {
        GenerationPayload {
            options: GenerationOptions {
                endpoint_model_id: "gemini-2.5-flash".to_string(),
                search_enabled: true,
                reasoning_budget: None,
            },
            system_instruction: "system".to_string(),
            history: Vec::new(),
            message: "What moved CAC last quarter?".to_string(),
        }
    }

    fn web(uri: &str, title: &str) -> GroundingChunk {
        GroundingChunk {
            web: Some(WebChunk {
                uri: Some(uri.to_string()),
                title: Some(title.to_string()),
            }),
        }
    }

    #[tokio::test]
    async fn test_unconfigured_backend_is_never_called() {
        let backend = Arc::new(ScriptedBackend {
            configured: false,
            ..ScriptedBackend::replying(Ok(BackendResponse::default()))
        });
        let dispatcher = GenerationDispatcher::new(backend.clone());

        let err = dispatcher.send(&payload()).await.unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_sources_present_only_for_web_entries() {
        let backend = Arc::new(ScriptedBackend::replying(Ok(BackendResponse {
            text: "Paid social got pricier.".to_string(),
            grounding_chunks: Some(vec![
                web("https://example.com/a", "Report A"),
                GroundingChunk { web: None },
                web("https://example.com/b", "Report B"),
            ]),
        })));
        let reply = GenerationDispatcher::new(backend).send(&payload()).await.unwrap();

        let sources = reply.sources.unwrap();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[1].uri, "https://example.com/b");
        assert_eq!(sources[1].title, "Report B");
    }

    #[tokio::test]
    async fn test_sources_absent_without_grounding() {
        for chunks in [None, Some(Vec::new()), Some(vec![GroundingChunk { web: None }])] {
            let backend = Arc::new(ScriptedBackend::replying(Ok(BackendResponse {
                text: "Answer".to_string(),
                grounding_chunks: chunks,
            })));
            let reply = GenerationDispatcher::new(backend).send(&payload()).await.unwrap();
            assert_eq!(reply.sources, None);
        }
    }

    #[tokio::test]
    async fn test_backend_failures_become_generation_errors() {
        let backend = Arc::new(ScriptedBackend::replying(Err(Error::internal("socket closed"))));
        let err = GenerationDispatcher::new(backend).send(&payload()).await.unwrap_err();
        assert!(matches!(err, Error::Generation(ref m) if m.contains("socket closed")));

        let empty = Arc::new(ScriptedBackend::replying(Ok(BackendResponse::default())));
        let err = GenerationDispatcher::new(empty).send(&payload()).await.unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
    }
}
