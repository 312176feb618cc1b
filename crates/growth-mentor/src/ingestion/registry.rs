//! Lookup table from file kind to extractor

use std::collections::HashMap;
use std::sync::Arc;

use super::image::ImageExtractor;
use super::parser::{
    Extractor, PdfExtractor, PlainTextExtractor, SlideDeckExtractor, SpreadsheetExtractor,
};
use super::routing::FileKind;
use crate::error::{Error, Result};
use crate::providers::VisionBackend;

/// Extractors keyed by the family they handle
pub struct ExtractorRegistry {
    extractors: HashMap<FileKind, Arc<dyn Extractor>>,
}

impl ExtractorRegistry {
    /// Registry with the local extractors only (no image analysis)
    pub fn local() -> Self {
        let mut registry = Self {
            extractors: HashMap::new(),
        };
        registry.register(Arc::new(SpreadsheetExtractor));
        registry.register(Arc::new(SlideDeckExtractor));
        registry.register(Arc::new(PdfExtractor));
        registry.register(Arc::new(PlainTextExtractor));
        registry
    }

    /// Registry with all five extractors
    pub fn with_vision(vision: Arc<dyn VisionBackend>) -> Self {
        let mut registry = Self::local();
        registry.register(Arc::new(ImageExtractor::new(vision)));
        registry
    }

    /// Add or replace the extractor for its kind
    pub fn register(&mut self, extractor: Arc<dyn Extractor>) {
        self.extractors.insert(extractor.kind(), extractor);
    }

    /// Check whether a kind has an extractor
    pub fn supports(&self, kind: FileKind) -> bool {
        self.extractors.contains_key(&kind)
    }

    /// Select the extractor for a filename
    pub fn extractor_for(&self, filename: &str) -> Result<Arc<dyn Extractor>> {
        let kind = FileKind::for_filename(filename);
        self.extractors.get(&kind).cloned().ok_or_else(|| {
            Error::extraction(
                filename,
                format!("no {} extractor is configured", kind.display_name().to_lowercase()),
            )
        })
    }
}
