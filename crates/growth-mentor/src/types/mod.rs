//! Core types shared by ingestion, generation and the chat session

pub mod chart;
pub mod conversation;

pub use chart::{ChartKind, ChartSpec, Segment, SeriesSpec};
pub use conversation::{ConversationTurn, Language, ModelVariant, Role, Source};
