//! Append-only knowledge text assembled from extracted fragments

use std::ops::Range;

use super::fragment::TextFragment;
use super::routing::FileKind;

/// Provenance of one span of the knowledge text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeEntry {
    /// Source filename; `None` for text the user typed or pasted
    pub filename: Option<String>,
    /// Extractor family; `None` for manual text
    pub kind: Option<FileKind>,
    /// SHA-256 of the source file bytes
    pub source_hash: Option<String>,
    /// Byte range within the knowledge text
    pub range: Range<usize>,
    /// Number of sheets, pages or slides
    pub sections: usize,
}

/// User-supplied corpus injected into the system instruction.
///
/// Fragments are appended whole; a failed extraction never touches it.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    text: String,
    entries: Vec<KnowledgeEntry>,
}

impl KnowledgeBase {
    /// Create an empty knowledge base
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from previously saved or manually entered text
    pub fn from_text(text: impl Into<String>) -> Self {
        let mut kb = Self::new();
        kb.replace_manual(text);
        kb
    }

    /// Full knowledge text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// True when the text holds anything besides whitespace
    pub fn is_active(&self) -> bool {
        !self.text.trim().is_empty()
    }

    /// Provenance entries in append order
    pub fn entries(&self) -> &[KnowledgeEntry] {
        &self.entries
    }

    /// Text of one entry
    pub fn entry_text(&self, entry: &KnowledgeEntry) -> &str {
        self.text.get(entry.range.clone()).unwrap_or_default()
    }

    /// Append a complete fragment
    pub fn append(&mut self, fragment: &TextFragment, source_hash: Option<String>) -> &KnowledgeEntry {
        let rendered = fragment.render();
        let start = self.text.len();
        self.text.push_str(&rendered);

        self.entries.push(KnowledgeEntry {
            filename: Some(fragment.filename.clone()),
            kind: Some(fragment.kind),
            source_hash,
            range: start..self.text.len(),
            sections: fragment.sections.len(),
        });
        &self.entries[self.entries.len() - 1]
    }

    /// Replace everything with user-edited text
    pub fn replace_manual(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.entries.clear();
        if !self.text.is_empty() {
            self.entries.push(KnowledgeEntry {
                filename: None,
                kind: None,
                source_hash: None,
                range: 0..self.text.len(),
                sections: 1,
            });
        }
    }

    /// Drop all text
    pub fn clear(&mut self) {
        self.text.clear();
        self.entries.clear();
    }

    /// Whether a file with these bytes was already appended
    pub fn contains_source(&self, source_hash: &str) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.source_hash.as_deref() == Some(source_hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_tracks_provenance() {
        let mut kb = KnowledgeBase::from_text("Brand voice: playful.");

        let mut fragment = TextFragment::new("notes.md", FileKind::PlainText);
        fragment.push_body("CAC target is $40");
        let entry = kb.append(&fragment, Some("abc".to_string())).clone();

        assert_eq!(kb.entries().len(), 2);
        assert_eq!(kb.entry_text(&entry), "\n\n--- File: notes.md ---\nCAC target is $40");
        assert!(kb.text().starts_with("Brand voice: playful."));
        assert!(kb.contains_source("abc"));
        assert!(!kb.contains_source("def"));
    }

    #[test]
    fn test_whitespace_only_is_inactive() {
        let mut kb = KnowledgeBase::from_text(" \n\t ");
        assert!(!kb.is_active());

        kb.replace_manual("LTV = ARPU / churn");
        assert!(kb.is_active());

        kb.clear();
        assert!(kb.text().is_empty());
        assert!(kb.entries().is_empty());
    }
}
