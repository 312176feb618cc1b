//! Chat session: conversation state, knowledge base and the send gate

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

use crate::config::{MentorConfig, ModelTable};
use crate::error::{Error, Result};
use crate::generation::{split_reply, GenerationDispatcher, PromptComposer};
use crate::ingestion::{
    BatchReport, ExtractorRegistry, IngestOutcome, IngestionPipeline, IngestionStatus,
    KnowledgeBase, SourceFile,
};
use crate::providers::{GeminiClient, GenerativeBackend, VisionBackend};
use crate::strings::{marketing_topics, ui_strings};
use crate::types::{ConversationTurn, Language, ModelVariant, Segment};

/// Outcome of one send: the model turn appended to the conversation
#[derive(Debug)]
pub struct ChatReply {
    /// Model turn holding the reply, or a localized error notice
    pub turn: ConversationTurn,
    /// Reply split into prose and charts
    pub segments: Vec<Segment>,
    /// Why generation failed, when `turn` is a notice
    pub error: Option<Error>,
}

impl ChatReply {
    /// True when the backend produced the reply
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

struct Conversation {
    turns: Vec<ConversationTurn>,
    language: Language,
}

/// Releases the in-flight gate on every exit path
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::Busy)?;
        Ok(Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// One mentor conversation with its knowledge base
pub struct ChatSession {
    dispatcher: GenerationDispatcher,
    models: ModelTable,
    conversation: Mutex<Conversation>,
    ingestion: tokio::sync::Mutex<IngestionPipeline>,
    status: watch::Receiver<IngestionStatus>,
    in_flight: AtomicBool,
}

impl ChatSession {
    /// Create a session over explicit backends.
    ///
    /// Without a vision backend, image uploads fail as extraction errors.
    pub fn new(
        config: &MentorConfig,
        backend: Arc<dyn GenerativeBackend>,
        vision: Option<Arc<dyn VisionBackend>>,
    ) -> Self {
        let registry = match vision {
            Some(vision) => ExtractorRegistry::with_vision(vision),
            None => ExtractorRegistry::local(),
        };
        let pipeline = IngestionPipeline::new(registry, config.ingestion.clone());
        let status = pipeline.subscribe();

        Self {
            dispatcher: GenerationDispatcher::new(backend),
            models: config.models.clone(),
            conversation: Mutex::new(Conversation {
                turns: vec![welcome_turn(config.language)],
                language: config.language,
            }),
            ingestion: tokio::sync::Mutex::new(pipeline),
            status,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Create a session backed by Gemini for both chat and image analysis
    pub fn gemini(config: &MentorConfig) -> Result<Self> {
        let client = Arc::new(GeminiClient::new(&config.gemini, &config.models)?);
        if !client.is_configured() {
            tracing::warn!("No Gemini API key configured; sends will fail until one is set");
        }
        Ok(Self::new(config, client.clone(), Some(client)))
    }

    /// Send a user message and append the paired model turn.
    ///
    /// Generation failures do not return `Err`: they become a localized
    /// notice turn with `ChatReply::error` set. `Err` means nothing was sent,
    /// either because the message was blank or another send is in flight.
    pub async fn send_message(&self, content: &str, variant: ModelVariant) -> Result<ChatReply> {
        if content.trim().is_empty() {
            return Err(Error::InvalidRequest("message is empty".to_string()));
        }
        let _guard = InFlightGuard::acquire(&self.in_flight)?;

        // Waits for an in-progress file so the reply sees its fragment
        let knowledge = self.ingestion.lock().await.knowledge().text().to_string();

        let (payload, language) = {
            let mut conversation = self.conversation.lock();
            conversation.turns.push(ConversationTurn::user(content, variant));
            let payload = PromptComposer::compose(
                &conversation.turns,
                conversation.language,
                &knowledge,
                variant,
                &self.models,
            )?;
            (payload, conversation.language)
        };

        let reply = match self.dispatcher.send(&payload).await {
            Ok(reply) => {
                let segments = split_reply(&reply.text);
                ChatReply {
                    turn: ConversationTurn::model(reply.text, Some(variant))
                        .with_citations(reply.sources),
                    segments,
                    error: None,
                }
            }
            Err(e) => {
                let strings = ui_strings(language);
                let notice = if e.is_configuration() {
                    strings.not_configured
                } else {
                    strings.generation_error
                };
                ChatReply {
                    turn: ConversationTurn::model(notice, Some(variant)),
                    segments: vec![Segment::Prose(notice.to_string())],
                    error: Some(e),
                }
            }
        };

        self.conversation.lock().turns.push(reply.turn.clone());
        Ok(reply)
    }

    /// Send a quick-start topic's prompt with deep reasoning
    pub async fn ask_topic(&self, topic_id: &str) -> Result<ChatReply> {
        let language = self.language();
        let topic = marketing_topics(language)
            .iter()
            .find(|topic| topic.id == topic_id)
            .ok_or_else(|| Error::InvalidRequest(format!("unknown topic '{}'", topic_id)))?;
        self.send_message(topic.prompt, ModelVariant::DeepReasoning).await
    }

    /// Reset to a fresh welcome message
    pub fn clear_history(&self) {
        let mut conversation = self.conversation.lock();
        conversation.turns = vec![welcome_turn(conversation.language)];
    }

    /// Switch the system template used for the next send
    pub fn set_language(&self, language: Language) {
        self.conversation.lock().language = language;
    }

    pub fn language(&self) -> Language {
        self.conversation.lock().language
    }

    /// Snapshot of the conversation
    pub fn turns(&self) -> Vec<ConversationTurn> {
        self.conversation.lock().turns.clone()
    }

    /// A send is awaiting the backend
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Ingest a file chosen with the picker
    pub async fn ingest_file(&self, file: SourceFile) -> Result<IngestOutcome> {
        self.ingestion.lock().await.ingest_selected(file).await
    }

    /// Ingest files dropped onto the knowledge area
    pub async fn ingest_dropped(&self, files: Vec<SourceFile>) -> BatchReport {
        self.ingestion.lock().await.ingest_dropped(files).await
    }

    /// Current knowledge text
    pub async fn knowledge_text(&self) -> String {
        self.ingestion.lock().await.knowledge().text().to_string()
    }

    /// Replace the knowledge text with manually edited content
    pub async fn set_knowledge_text(&self, text: impl Into<String>) {
        self.ingestion.lock().await.knowledge_mut().replace_manual(text);
    }

    /// Drop all knowledge
    pub async fn clear_knowledge(&self) {
        self.ingestion.lock().await.knowledge_mut().clear();
    }

    /// Seed the knowledge base, e.g. from text saved by the host
    pub async fn load_knowledge(&self, knowledge: KnowledgeBase) {
        *self.ingestion.lock().await.knowledge_mut() = knowledge;
    }

    /// Clear a surfaced ingestion error
    pub async fn acknowledge_ingestion_error(&self) {
        self.ingestion.lock().await.acknowledge_error();
    }

    /// Observe ingestion status
    pub fn subscribe_status(&self) -> watch::Receiver<IngestionStatus> {
        self.status.clone()
    }
}

fn welcome_turn(language: Language) -> ConversationTurn {
    ConversationTurn::model(ui_strings(language).welcome, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::GenerationPayload;
    use crate::providers::BackendResponse;
    use async_trait::async_trait;
    use std::time::Duration;

    struct SlowBackend;

    #[async_trait]
    impl GenerativeBackend for SlowBackend {
        fn is_configured(&self) -> bool {
            true
        }

        async fn generate(&self, _payload: &GenerationPayload) -> Result<BackendResponse> {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(BackendResponse {
                text: "Done".to_string(),
                grounding_chunks: None,
            })
        }

        fn name(&self) -> &str {
            "slow"
        }
    }

    #[tokio::test]
    async fn test_second_send_is_rejected_while_in_flight() {
        let session = Arc::new(ChatSession::new(
            &MentorConfig::default(),
            Arc::new(SlowBackend),
            None,
        ));

        let first = {
            let session = session.clone();
            tokio::spawn(async move { session.send_message("First", ModelVariant::Fast).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(session.is_busy());
        let second = session.send_message("Second", ModelVariant::Fast).await;
        assert!(matches!(second, Err(Error::Busy)));

        let reply = first.await.unwrap().unwrap();
        assert!(reply.is_success());
        assert!(!session.is_busy());
        // welcome, First, reply
        assert_eq!(session.turns().len(), 3);
    }

    #[test]
    fn test_clear_history_uses_current_language() {
        let session = ChatSession::new(&MentorConfig::default(), Arc::new(SlowBackend), None);
        session.set_language(Language::Zh);
        session.clear_history();

        let turns = session.turns();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].content, ui_strings(Language::Zh).welcome);
    }

    #[tokio::test]
    async fn test_blank_message_not_sent() {
        let session = ChatSession::new(&MentorConfig::default(), Arc::new(SlowBackend), None);
        let result = session.send_message("  ", ModelVariant::Fast).await;
        assert!(matches!(result, Err(Error::InvalidRequest(_))));
        assert_eq!(session.turns().len(), 1);
        assert!(!session.is_busy());
    }
}
