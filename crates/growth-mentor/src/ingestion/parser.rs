//! Format extractors: spreadsheet, slide deck, PDF and plain text

use async_trait::async_trait;
use calamine::Reader;
use regex::Regex;
use std::io::{Cursor, Read};
use std::sync::OnceLock;
use tokio::sync::mpsc;

use super::fragment::{SourceFile, TextFragment};
use super::progress::{PageProgress, ProgressSink};
use super::routing::FileKind;
use crate::error::{Error, Result};

/// Bytes inspected when deciding whether a fallback file is binary
const BINARY_SNIFF_BYTES: usize = 8 * 1024;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Converts one file into an appendable text fragment.
///
/// Failures are returned, never raised, so the pipeline can continue
/// with other files. Paged extractors report progress after each page,
/// strictly in page order.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Extractor family
    fn kind(&self) -> FileKind;

    /// Extract the whole file
    async fn extract(&self, file: &SourceFile, progress: &dyn ProgressSink) -> Result<TextFragment>;
}

/// Forwards page reports from the blocking pool
struct ChannelProgress(mpsc::UnboundedSender<PageProgress>);

impl ProgressSink for ChannelProgress {
    fn report(&self, _filename: &str, progress: PageProgress) {
        let _ = self.0.send(progress);
    }
}

/// Run a synchronous paged parser on the blocking pool.
///
/// Page reports are relayed to `progress` in the order the parser emits them.
async fn run_paged<F>(file: &SourceFile, progress: &dyn ProgressSink, parse: F) -> Result<TextFragment>
where
    F: FnOnce(&SourceFile, &dyn ProgressSink) -> Result<TextFragment> + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel();
    let owned = file.clone();
    let task = tokio::task::spawn_blocking(move || parse(&owned, &ChannelProgress(tx)));

    while let Some(page) = rx.recv().await {
        progress.report(&file.name, page);
    }

    task.await
        .map_err(|e| Error::extraction(&file.name, format!("extraction task failed: {}", e)))?
}

/// Workbook extractor: every sheet rendered as CSV, in workbook order
pub struct SpreadsheetExtractor;

impl SpreadsheetExtractor {
    fn read_sheets(file: &SourceFile) -> Result<Vec<(String, String)>> {
        if file.extension().as_deref() == Some("csv") {
            let csv = Self::normalize_csv(file)?;
            return Ok(vec![("Sheet1".to_string(), csv)]);
        }

        let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(&file.bytes[..]))
            .map_err(|e| Error::extraction(&file.name, e.to_string()))?;

        let mut sheets = Vec::new();
        for sheet_name in workbook.sheet_names().to_vec() {
            let range = workbook.worksheet_range(&sheet_name).map_err(|e| {
                Error::extraction(&file.name, format!("sheet '{}': {}", sheet_name, e))
            })?;

            let rows = range
                .rows()
                .map(|row| row.iter().map(cell_text).collect::<Vec<_>>());
            let csv = rows_to_csv(&file.name, rows)?;
            sheets.push((sheet_name, csv));
        }

        Ok(sheets)
    }

    /// Re-emit a CSV upload through the same writer used for sheets
    fn normalize_csv(file: &SourceFile) -> Result<String> {
        let data = &file.bytes[..];
        let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(data);

        // Exports from localized Excel are often not UTF-8
        let mut rows = Vec::new();
        for record in reader.byte_records() {
            let record = record.map_err(|e| Error::extraction(&file.name, e.to_string()))?;
            rows.push(
                record
                    .iter()
                    .map(|field| String::from_utf8_lossy(field).into_owned())
                    .collect::<Vec<_>>(),
            );
        }

        rows_to_csv(&file.name, rows)
    }
}

#[async_trait]
impl Extractor for SpreadsheetExtractor {
    fn kind(&self) -> FileKind {
        FileKind::Spreadsheet
    }

    async fn extract(&self, file: &SourceFile, _progress: &dyn ProgressSink) -> Result<TextFragment> {
        let sheets = Self::read_sheets(file)?;

        let mut fragment = TextFragment::new(&file.name, FileKind::Spreadsheet);
        for (sheet, csv) in sheets {
            fragment.push_section(sheet, csv);
        }
        Ok(fragment)
    }
}

fn cell_text(cell: &calamine::Data) -> String {
    match cell {
        calamine::Data::Empty => String::new(),
        calamine::Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn rows_to_csv<I>(filename: &str, rows: I) -> Result<String>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    for row in rows {
        writer
            .write_record(&row)
            .map_err(|e| Error::extraction(filename, e.to_string()))?;
    }

    let data = writer
        .into_inner()
        .map_err(|e| Error::extraction(filename, e.error().to_string()))?;
    let text = String::from_utf8(data).map_err(|e| Error::extraction(filename, e.to_string()))?;

    Ok(text.trim_end_matches('\n').to_string())
}

/// PowerPoint extractor: slides in numeric order, one section per slide
pub struct SlideDeckExtractor;

impl SlideDeckExtractor {
    /// Slide index embedded in a part name such as `ppt/slides/slide12.xml`
    pub fn slide_number(part_name: &str) -> Option<u32> {
        static SLIDE_PART: OnceLock<Regex> = OnceLock::new();
        let pattern = SLIDE_PART
            .get_or_init(|| Regex::new(r"^ppt/slides/slide(\d+)\.xml$").expect("valid slide pattern"));
        pattern
            .captures(part_name)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }

    fn extract_slides(file: &SourceFile, progress: &dyn ProgressSink) -> Result<TextFragment> {
        let mut archive = zip::ZipArchive::new(Cursor::new(&file.bytes[..]))
            .map_err(|e| Error::extraction(&file.name, format!("not a valid .pptx archive: {}", e)))?;

        let mut slides: Vec<(u32, String)> = archive
            .file_names()
            .filter_map(|name| Self::slide_number(name).map(|n| (n, name.to_string())))
            .collect();

        // slide10 must follow slide9
        slides.sort_by_key(|(number, _)| *number);

        if slides.is_empty() {
            return Err(Error::extraction(&file.name, "no slides found in presentation"));
        }

        let total = slides.len() as u32;
        let mut fragment = TextFragment::new(&file.name, FileKind::SlideDeck);

        for (index, (number, part_name)) in slides.iter().enumerate() {
            let mut xml = String::new();
            archive
                .by_name(part_name)
                .map_err(|e| Error::extraction(&file.name, e.to_string()))?
                .read_to_string(&mut xml)
                .map_err(|e| Error::extraction(&file.name, format!("slide {}: {}", number, e)))?;

            let text = Self::slide_text(&xml)
                .map_err(|e| Error::extraction(&file.name, format!("slide {}: {}", number, e)))?;

            fragment.push_section(number.to_string(), text);
            progress.report(
                &file.name,
                PageProgress {
                    page: index as u32 + 1,
                    total,
                },
            );
        }

        Ok(fragment)
    }

    /// Join the `<a:t>` run texts of one slide with single spaces
    fn slide_text(xml: &str) -> std::result::Result<String, String> {
        use quick_xml::events::Event;
        use quick_xml::Reader as XmlReader;

        let mut reader = XmlReader::from_str(xml);
        let mut runs = Vec::new();
        let mut in_run = false;
        let mut current = String::new();

        loop {
            match reader.read_event().map_err(|e| e.to_string())? {
                Event::Start(e) if e.local_name().as_ref() == b"t" => {
                    in_run = true;
                    current.clear();
                }
                Event::Text(e) if in_run => {
                    let text = e.unescape().map_err(|e| e.to_string())?;
                    current.push_str(&text);
                }
                Event::End(e) if e.local_name().as_ref() == b"t" => {
                    in_run = false;
                    let run = current.trim();
                    if !run.is_empty() {
                        runs.push(run.to_string());
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(runs.join(" "))
    }
}

#[async_trait]
impl Extractor for SlideDeckExtractor {
    fn kind(&self) -> FileKind {
        FileKind::SlideDeck
    }

    async fn extract(&self, file: &SourceFile, progress: &dyn ProgressSink) -> Result<TextFragment> {
        run_paged(file, progress, Self::extract_slides).await
    }
}

/// PDF extractor: pages 1..N in order, text items joined by single spaces
pub struct PdfExtractor;

impl PdfExtractor {
    fn extract_pages(file: &SourceFile, progress: &dyn ProgressSink) -> Result<TextFragment> {
        let doc = lopdf::Document::load_mem(&file.bytes[..])
            .map_err(|e| Error::extraction(&file.name, format!("failed to load PDF: {}", e)))?;

        // BTreeMap keys: ascending page numbers
        let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
        if page_numbers.is_empty() {
            return Err(Error::extraction(&file.name, "PDF has no pages"));
        }

        let total = page_numbers.len() as u32;
        let mut fragment = TextFragment::new(&file.name, FileKind::Pdf);

        for (index, page_number) in page_numbers.iter().enumerate() {
            let page = index as u32 + 1;
            let text = match doc.extract_text(&[*page_number]) {
                Ok(raw) => normalize_page_text(&raw),
                Err(e) => {
                    tracing::warn!("{}: no text extracted from page {}: {}", file.name, page, e);
                    String::new()
                }
            };

            fragment.push_section(page.to_string(), text);
            progress.report(&file.name, PageProgress { page, total });
        }

        Ok(fragment)
    }
}

#[async_trait]
impl Extractor for PdfExtractor {
    fn kind(&self) -> FileKind {
        FileKind::Pdf
    }

    async fn extract(&self, file: &SourceFile, progress: &dyn ProgressSink) -> Result<TextFragment> {
        run_paged(file, progress, Self::extract_pages).await
    }
}

/// Collapse a page's text items into one line, undoing common font artifacts
fn normalize_page_text(raw: &str) -> String {
    let cleaned = raw
        .replace('\0', "")
        .replace('\u{00A0}', " ")
        .replace('\u{FB00}', "ff")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace('\u{FB03}', "ffi")
        .replace('\u{FB04}', "ffl");

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Fallback extractor: reads the whole file as text
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    fn decode(file: &SourceFile) -> Result<String> {
        let data = &file.bytes[..];
        let head = &data[..data.len().min(BINARY_SNIFF_BYTES)];
        if head.contains(&0) {
            return Err(Error::extraction(&file.name, "file does not look like text"));
        }

        let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
        Ok(String::from_utf8_lossy(data).into_owned())
    }
}

#[async_trait]
impl Extractor for PlainTextExtractor {
    fn kind(&self) -> FileKind {
        FileKind::PlainText
    }

    async fn extract(&self, file: &SourceFile, _progress: &dyn ProgressSink) -> Result<TextFragment> {
        let text = Self::decode(file)?;

        let mut fragment = TextFragment::new(&file.name, FileKind::PlainText);
        fragment.push_body(text);
        Ok(fragment)
    }
}
