//! Knowledge-base ingestion pipeline with multi-format extraction

mod fragment;
mod image;
mod knowledge;
mod parser;
mod pipeline;
mod progress;
mod registry;
mod routing;

pub use fragment::{FragmentSection, SourceFile, TextFragment};
pub use image::ImageExtractor;
pub use knowledge::{KnowledgeBase, KnowledgeEntry};
pub use parser::{
    Extractor, PdfExtractor, PlainTextExtractor, SlideDeckExtractor, SpreadsheetExtractor,
};
pub use pipeline::{BatchReport, IngestOutcome, IngestionPipeline};
pub use progress::{IngestionStatus, NoProgress, PageProgress, ProgressSink};
pub use registry::ExtractorRegistry;
pub use routing::{extension, is_accepted, FileKind, ACCEPTED_EXTENSIONS};
