//! Prompt composition, dispatch and reply post-processing

pub mod chart;
pub mod dispatcher;
pub mod options;
pub mod prompt;
pub mod templates;

pub use chart::{parse_chart, split_reply};
pub use dispatcher::{extract_sources, GenerationDispatcher, GenerationReply};
pub use options::{GenerationOptions, DEEP_REASONING_BUDGET};
pub use prompt::{
    GenerationPayload, HistoryEntry, PromptComposer, KNOWLEDGE_BEGIN_MARKER, KNOWLEDGE_END_MARKER,
};
pub use templates::{system_instruction, CHART_FENCE_TAG};
