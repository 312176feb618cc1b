//! Extension-based routing of uploaded files to extractors

use serde::{Deserialize, Serialize};

/// Extensions offered by the upload picker
pub const ACCEPTED_EXTENSIONS: [&str; 12] = [
    "txt", "md", "csv", "json", "xlsx", "xls", "png", "jpg", "jpeg", "webp", "pdf", "pptx",
];

/// Extractor family a file is routed to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    /// Excel workbooks and CSV
    Spreadsheet,
    /// Images described by a vision call
    Image,
    /// PDF documents, page by page
    Pdf,
    /// PowerPoint decks, slide by slide
    SlideDeck,
    /// Fallback for everything else
    PlainText,
}

/// Normalized extension to extractor family
const ROUTING_TABLE: &[(&str, FileKind)] = &[
    ("xlsx", FileKind::Spreadsheet),
    ("xls", FileKind::Spreadsheet),
    ("csv", FileKind::Spreadsheet),
    ("png", FileKind::Image),
    ("jpg", FileKind::Image),
    ("jpeg", FileKind::Image),
    ("webp", FileKind::Image),
    ("heic", FileKind::Image),
    ("pdf", FileKind::Pdf),
    ("pptx", FileKind::SlideDeck),
];

impl FileKind {
    /// Route by normalized extension; unknown extensions are plain text
    pub fn from_extension(ext: &str) -> Self {
        let ext = ext.trim_start_matches('.').to_lowercase();
        ROUTING_TABLE
            .iter()
            .find(|(candidate, _)| *candidate == ext)
            .map(|(_, kind)| *kind)
            .unwrap_or(Self::PlainText)
    }

    /// Route a filename
    pub fn for_filename(filename: &str) -> Self {
        extension(filename)
            .map(|ext| Self::from_extension(&ext))
            .unwrap_or(Self::PlainText)
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Spreadsheet => "Spreadsheet",
            Self::Image => "Image",
            Self::Pdf => "PDF",
            Self::SlideDeck => "Presentation",
            Self::PlainText => "Text",
        }
    }
}

/// Lowercased extension of a filename, without the dot
pub fn extension(filename: &str) -> Option<String> {
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

/// Check a filename against the upload accept set
pub fn is_accepted(filename: &str) -> bool {
    extension(filename)
        .map(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routing_table() {
        for name in ["a.xlsx", "a.XLS", "report.csv"] {
            assert_eq!(FileKind::for_filename(name), FileKind::Spreadsheet, "{}", name);
        }
        for name in ["a.png", "a.JPG", "a.jpeg", "a.webp", "IMG_1.HEIC"] {
            assert_eq!(FileKind::for_filename(name), FileKind::Image, "{}", name);
        }
        assert_eq!(FileKind::for_filename("Deck.PDF"), FileKind::Pdf);
        assert_eq!(FileKind::for_filename("q3.pptx"), FileKind::SlideDeck);
    }

    #[test]
    fn test_unknown_routes_to_plain_text() {
        for name in ["notes.md", "data.json", "script.py", "README", ".env", "archive.tar.gz", "deck.ppt"] {
            assert_eq!(FileKind::for_filename(name), FileKind::PlainText, "{}", name);
        }
    }

    #[test]
    fn test_extension() {
        assert_eq!(extension("dir.v2/Plan.Final.PPTX"), Some("pptx".to_string()));
        assert_eq!(extension("noext"), None);
        assert_eq!(extension(".hidden"), None);
        assert_eq!(extension("trailing."), None);
    }

    #[test]
    fn test_accept_set() {
        assert!(is_accepted("funnel.xlsx"));
        assert!(is_accepted("notes.MD"));
        assert!(!is_accepted("photo.heic"));
        assert!(!is_accepted("binary.exe"));
    }
}
