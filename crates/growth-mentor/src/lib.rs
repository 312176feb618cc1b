//! growth-mentor: knowledge-base ingestion and context-augmented chat for a
//! growth-marketing mentor
//!
//! Uploaded spreadsheets, PDFs, slide decks, images and text files are turned
//! into one delimited knowledge text. Each chat turn is composed with that text,
//! the conversation history and a per-language system instruction, sent to
//! Gemini, and the reply is split into prose and chart segments.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod logging;
pub mod providers;
pub mod session;
pub mod strings;
pub mod types;

pub use config::{GeminiConfig, IngestionConfig, MentorConfig, ModelTable};
pub use error::{Error, Result};
pub use session::{ChatReply, ChatSession};
pub use types::{ChartSpec, ConversationTurn, Language, ModelVariant, Role, Segment, Source};
