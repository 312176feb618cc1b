//! Ingestion coordinator: routes files, tracks status, merges fragments

use tokio::sync::watch;

use super::fragment::SourceFile;
use super::knowledge::KnowledgeBase;
use super::progress::{IngestionStatus, StatusProgress};
use super::registry::ExtractorRegistry;
use super::routing::FileKind;
use crate::config::IngestionConfig;
use crate::error::{Error, Result};

/// Result of ingesting one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The fragment was appended to the knowledge base
    Appended {
        filename: String,
        kind: FileKind,
        sections: usize,
    },
    /// Identical bytes were already ingested
    SkippedDuplicate { filename: String },
}

/// Result of ingesting a queue of files
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Files processed without error
    pub completed: Vec<IngestOutcome>,
    /// Per-file failures; each names its file
    pub failures: Vec<Error>,
}

impl BatchReport {
    /// True when no file failed
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Names of the files that failed
    pub fn failed_files(&self) -> Vec<&str> {
        self.failures.iter().filter_map(Error::filename).collect()
    }
}

/// Sequential, per-file isolated ingestion into a knowledge base
pub struct IngestionPipeline {
    registry: ExtractorRegistry,
    config: IngestionConfig,
    knowledge: KnowledgeBase,
    status: watch::Sender<IngestionStatus>,
}

impl IngestionPipeline {
    /// Create a pipeline with an empty knowledge base
    pub fn new(registry: ExtractorRegistry, config: IngestionConfig) -> Self {
        let (status, _) = watch::channel(IngestionStatus::Idle);
        Self {
            registry,
            config,
            knowledge: KnowledgeBase::new(),
            status,
        }
    }

    /// Observe status changes
    pub fn subscribe(&self) -> watch::Receiver<IngestionStatus> {
        self.status.subscribe()
    }

    /// Current status
    pub fn status(&self) -> IngestionStatus {
        self.status.borrow().clone()
    }

    /// Clear a surfaced error back to idle
    pub fn acknowledge_error(&self) {
        self.status.send_if_modified(|status| {
            if matches!(status, IngestionStatus::Error { .. }) {
                *status = IngestionStatus::Idle;
                true
            } else {
                false
            }
        });
    }

    /// Accumulated knowledge
    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    /// Mutable access for manual edits
    pub fn knowledge_mut(&mut self) -> &mut KnowledgeBase {
        &mut self.knowledge
    }

    /// Files dropped onto the knowledge area
    pub async fn ingest_dropped(&mut self, files: Vec<SourceFile>) -> BatchReport {
        tracing::debug!("{} file(s) dropped", files.len());
        self.ingest_batch(files).await
    }

    /// A file chosen with the picker
    pub async fn ingest_selected(&mut self, file: SourceFile) -> Result<IngestOutcome> {
        tracing::debug!("{} selected", file.name);
        self.ingest_file(file).await
    }

    /// Process queued files one at a time; failures do not stop the batch
    pub async fn ingest_batch(&mut self, files: Vec<SourceFile>) -> BatchReport {
        let mut report = BatchReport::default();
        for file in files {
            match self.ingest_file(file).await {
                Ok(outcome) => report.completed.push(outcome),
                Err(e) => report.failures.push(e),
            }
        }
        report
    }

    /// Extract one file and append its fragment, or leave the knowledge untouched
    pub async fn ingest_file(&mut self, file: SourceFile) -> Result<IngestOutcome> {
        let filename = file.name.clone();
        self.status.send_replace(IngestionStatus::Processing {
            file: filename.clone(),
            page: None,
            total_pages: None,
        });

        match self.run_extraction(&file).await {
            Ok(outcome) => {
                self.status.send_replace(IngestionStatus::Idle);
                Ok(outcome)
            }
            Err(e) => {
                let e = if matches!(e, Error::Extraction { .. }) {
                    e
                } else {
                    Error::extraction(&filename, e.to_string())
                };
                tracing::error!("Ingestion failed: {}", e);
                self.status.send_replace(IngestionStatus::Error {
                    file: filename,
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn run_extraction(&mut self, file: &SourceFile) -> Result<IngestOutcome> {
        if file.size() > self.config.max_file_bytes {
            return Err(Error::extraction(
                &file.name,
                format!(
                    "file is {} bytes, limit is {} bytes",
                    file.size(),
                    self.config.max_file_bytes
                ),
            ));
        }

        let source_hash = file.content_hash();
        if self.config.skip_duplicate_files && self.knowledge.contains_source(&source_hash) {
            tracing::warn!("Skipping {}: identical file already ingested", file.name);
            return Ok(IngestOutcome::SkippedDuplicate {
                filename: file.name.clone(),
            });
        }

        let extractor = self.registry.extractor_for(&file.name)?;
        tracing::info!(
            "Extracting {} ({} bytes) as {}",
            file.name,
            file.size(),
            extractor.kind().display_name()
        );

        let progress = StatusProgress {
            sender: &self.status,
        };
        let fragment = extractor.extract(file, &progress).await?;

        let entry = self.knowledge.append(&fragment, Some(source_hash));
        tracing::info!(
            "Appended {} ({} section(s), {} chars)",
            file.name,
            entry.sections,
            entry.range.len()
        );

        Ok(IngestOutcome::Appended {
            filename: fragment.filename,
            kind: fragment.kind,
            sections: fragment.sections.len(),
        })
    }
}
