//! Document-level types.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{RecordKind, RecordStore, TitleTree};

/// Everything extracted from one document.
///
/// Created at the start of a conversion and owned by it; nothing is shared
/// between documents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentIndex {
    /// Records in sequence order
    pub records: RecordStore,

    /// Section index built after the last page
    pub titles: TitleTree,
}

impl DocumentIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pages that contributed at least one record, ascending.
    pub fn pages(&self) -> Vec<u32> {
        let mut pages: Vec<u32> = self.records.iter().map(|r| r.page).collect();
        pages.dedup();
        pages
    }

    /// Retained body text joined with newlines.
    pub fn plain_text(&self) -> String {
        self.records
            .retained()
            .map(|r| r.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Identity of the converted document, copied into every output item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    /// Document title
    pub title: String,

    /// Source identifier (usually the file path)
    pub source: String,
}

impl DocumentInfo {
    /// Create document info.
    pub fn new(title: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            source: source.into(),
        }
    }

    /// Use the file stem as title and the full path as source.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let title = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        Self::new(title, path.to_string_lossy())
    }
}

/// Counters collected while converting a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Pages visited
    pub pages: u32,
    /// Whether the document was classified as scanned
    pub scanned: bool,
    /// Pages whose OCR pass produced at least one line
    pub ocr_pages: u32,
    /// Pages that contributed no records
    pub empty_pages: u32,
    /// Ragged table rows turned into text
    pub ragged_rows: u32,
    /// Text records (after header/footer tagging)
    pub text_records: usize,
    /// Table records
    pub table_records: usize,
    /// Records tagged as header
    pub header_records: usize,
    /// Records tagged as footer
    pub footer_records: usize,
}

impl ConversionStats {
    /// Fill the record counters from a finished store.
    pub fn count_records(&mut self, records: &RecordStore) {
        self.text_records = records.count(RecordKind::Text);
        self.table_records = records.count(RecordKind::Table);
        self.header_records = records.count(RecordKind::Header);
        self.footer_records = records.count(RecordKind::Footer);
    }
}
