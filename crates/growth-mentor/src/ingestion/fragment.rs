//! Uploaded files and the text fragments extracted from them

use bytes::Bytes;
use sha2::{Digest, Sha256};
use std::path::Path;

use super::routing::{extension, FileKind};
use crate::error::Result;

/// A file handed to the ingestion pipeline
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Original filename as uploaded
    pub name: String,
    /// Raw file contents
    pub bytes: Bytes,
    /// MIME type reported by the caller, if any
    pub mime_type: Option<String>,
}

impl SourceFile {
    /// Create from a name and contents
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
            mime_type: None,
        }
    }

    /// Set the caller-reported MIME type
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Read a file from disk, keeping only its file name
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, data))
    }

    /// File size in bytes
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Lowercased extension
    pub fn extension(&self) -> Option<String> {
        extension(&self.name)
    }

    /// MIME type: the reported one, else guessed from the extension
    pub fn resolved_mime_type(&self) -> String {
        if let Some(mime) = self.mime_type.as_deref().filter(|m| !m.is_empty()) {
            return mime.to_string();
        }
        match self.extension().as_deref() {
            Some("heic") => "image/heic".to_string(),
            _ => mime_guess::from_path(&self.name)
                .first_raw()
                .unwrap_or("application/octet-stream")
                .to_string(),
        }
    }

    /// SHA-256 of the contents, used to detect re-uploads
    pub fn content_hash(&self) -> String {
        hex::encode(Sha256::digest(&self.bytes))
    }
}

/// One labeled section of a fragment (a sheet, page or slide)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentSection {
    /// Sheet name or page/slide number; `None` for single-body fragments
    pub label: Option<String>,
    /// Extracted text
    pub body: String,
}

/// Immutable text extracted from one file, appended to the knowledge base at most once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFragment {
    /// Source filename
    pub filename: String,
    /// Extractor family that produced it
    pub kind: FileKind,
    /// Sections in document order
    pub sections: Vec<FragmentSection>,
}

impl TextFragment {
    /// Create an empty fragment
    pub fn new(filename: impl Into<String>, kind: FileKind) -> Self {
        Self {
            filename: filename.into(),
            kind,
            sections: Vec::new(),
        }
    }

    /// Add a labeled section
    pub fn push_section(&mut self, label: impl Into<String>, body: impl Into<String>) {
        self.sections.push(FragmentSection {
            label: Some(label.into()),
            body: body.into(),
        });
    }

    /// Add the single unlabeled body
    pub fn push_body(&mut self, body: impl Into<String>) {
        self.sections.push(FragmentSection {
            label: None,
            body: body.into(),
        });
    }

    /// Provenance banner opening the fragment
    pub fn banner(&self) -> String {
        match self.kind {
            FileKind::Spreadsheet => format!("\n--- File: {} ---\n", self.filename),
            FileKind::Image => format!("\n\n--- Image Analysis ({}) ---\n", self.filename),
            FileKind::Pdf => format!("\n\n--- PDF: {} ---\n", self.filename),
            FileKind::SlideDeck => format!("\n\n--- Presentation: {} ---\n", self.filename),
            FileKind::PlainText => format!("\n\n--- File: {} ---\n", self.filename),
        }
    }

    /// Render the text appended to the knowledge base
    pub fn render(&self) -> String {
        let mut out = self.banner();
        for section in &self.sections {
            match (self.kind, section.label.as_deref()) {
                (FileKind::Spreadsheet, Some(sheet)) => {
                    out.push_str(&format!("\n[Sheet: {}]\n{}\n", sheet, section.body));
                }
                (FileKind::Pdf, Some(page)) => {
                    out.push_str(&format!("[Page {}]\n{}\n\n", page, section.body));
                }
                (FileKind::SlideDeck, Some(slide)) => {
                    out.push_str(&format!("[Slide {}]\n{}\n\n", slide, section.body));
                }
                (FileKind::Image, _) => {
                    out.push_str(&section.body);
                    out.push('\n');
                }
                (_, Some(label)) => {
                    out.push_str(&format!("[{}]\n{}\n", label, section.body));
                }
                (_, None) => out.push_str(&section.body),
            }
        }
        out
    }
}
