//! Ingestion status and page-level progress reporting

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::strings::ui_strings;
use crate::types::Language;

/// Transient state of an ingestion pipeline
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum IngestionStatus {
    /// Nothing in progress
    #[default]
    Idle,
    /// A file is being extracted
    Processing {
        file: String,
        page: Option<u32>,
        total_pages: Option<u32>,
    },
    /// The last file failed; cleared by acknowledging it
    Error { file: String, reason: String },
}

impl IngestionStatus {
    /// Check for the idle state
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Localized status line for display, `None` when idle
    pub fn describe(&self, language: Language) -> Option<String> {
        let strings = ui_strings(language);
        match self {
            Self::Idle => None,
            Self::Processing {
                file,
                page: Some(page),
                total_pages: Some(total),
            } => Some(format!(
                "{} {} ({} {}/{})...",
                strings.processing, file, strings.processing_page, page, total
            )),
            Self::Processing { file, .. } => Some(format!("{} {}...", strings.processing, file)),
            Self::Error { file, .. } => Some(format!("{} {}", strings.upload_error, file)),
        }
    }
}

/// Completion of one page or slide
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageProgress {
    /// 1-indexed page just completed
    pub page: u32,
    /// Total pages in the document
    pub total: u32,
}

/// Receiver of page-level progress from paged extractors
pub trait ProgressSink: Send + Sync {
    /// Called after each page completes, in page order
    fn report(&self, filename: &str, progress: PageProgress);
}

/// Sink that drops all progress
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _filename: &str, _progress: PageProgress) {}
}

/// Sink publishing progress into a pipeline's status channel
pub(crate) struct StatusProgress<'a> {
    pub(crate) sender: &'a watch::Sender<IngestionStatus>,
}

impl ProgressSink for StatusProgress<'_> {
    fn report(&self, filename: &str, progress: PageProgress) {
        tracing::debug!("{}: page {}/{}", filename, progress.page, progress.total);
        self.sender.send_replace(IngestionStatus::Processing {
            file: filename.to_string(),
            page: Some(progress.page),
            total_pages: Some(progress.total),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_paged_status() {
        let status = IngestionStatus::Processing {
            file: "deck.pdf".to_string(),
            page: Some(3),
            total_pages: Some(10),
        };
        assert_eq!(
            status.describe(Language::En).unwrap(),
            "Processing deck.pdf (Processing page 3/10)..."
        );
        assert!(IngestionStatus::Idle.describe(Language::Zh).is_none());
    }

    #[test]
    fn test_status_progress_publishes() {
        let (sender, receiver) = watch::channel(IngestionStatus::Idle);
        let sink = StatusProgress { sender: &sender };
        sink.report("deck.pptx", PageProgress { page: 2, total: 4 });

        assert_eq!(
            *receiver.borrow(),
            IngestionStatus::Processing {
                file: "deck.pptx".to_string(),
                page: Some(2),
                total_pages: Some(4),
            }
        );
    }
}
