//! Page source abstraction layer.
//!
//! Provides a trait-based interface for paginated input, isolating the
//! concrete PDF tooling (whatever produced the words, text and table regions)
//! from the layout analysis logic.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{BoundingBox, TableRegion};

/// A word token with its bounding box, in top-down page coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    /// Word text
    pub text: String,
    /// Left edge
    pub x0: f32,
    /// Right edge
    pub x1: f32,
    /// Top edge, distance from the top of the page
    pub top: f32,
    /// Bottom edge, distance from the top of the page
    pub bottom: f32,
}

impl Word {
    /// Create a word.
    pub fn new(text: impl Into<String>, x0: f32, top: f32, x1: f32, bottom: f32) -> Self {
        Self {
            text: text.into(),
            x0,
            x1,
            top,
            bottom,
        }
    }

    /// The word's bounding box.
    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::new(self.x0, self.top, self.x1, self.bottom)
    }

    /// Whether every coordinate is a finite number.
    pub fn is_finite(&self) -> bool {
        [self.x0, self.x1, self.top, self.bottom].iter().all(|v| v.is_finite())
    }
}

/// Abstract interface for one page of the input document.
///
/// Every accessor may fail independently; callers decide how a failure
/// affects the page.
pub trait PdfPage {
    /// 1-based page number.
    fn number(&self) -> u32;

    /// Page width in points.
    fn width(&self) -> f32;

    /// Page height in points.
    fn height(&self) -> f32;

    /// Extractable plain text.
    fn extract_text(&self) -> Result<String>;

    /// Words in reading order.
    fn extract_words(&self) -> Result<Vec<Word>>;

    /// Detected table regions, in detection order.
    fn find_tables(&self) -> Result<Vec<TableRegion>>;
}

impl<T: PdfPage + ?Sized> PdfPage for &T {
    fn number(&self) -> u32 {
        (**self).number()
    }

    fn width(&self) -> f32 {
        (**self).width()
    }

    fn height(&self) -> f32 {
        (**self).height()
    }

    fn extract_text(&self) -> Result<String> {
        (**self).extract_text()
    }

    fn extract_words(&self) -> Result<Vec<Word>> {
        (**self).extract_words()
    }

    fn find_tables(&self) -> Result<Vec<TableRegion>> {
        (**self).find_tables()
    }
}

/// Abstract interface for a paginated document.
pub trait PageSource {
    /// Identifier of the document (usually its path).
    fn identifier(&self) -> &str;

    /// Number of pages. Failing here aborts the conversion.
    fn page_count(&self) -> Result<usize>;

    /// Page at a 0-based index.
    fn page(&self, index: usize) -> Result<Box<dyn PdfPage + '_>>;
}

/// A page whose content was extracted ahead of time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageData {
    /// 1-based page number
    pub number: u32,
    /// Page width in points
    pub width: f32,
    /// Page height in points
    pub height: f32,
    /// Plain text; derived from the words when absent
    #[serde(default)]
    pub text: Option<String>,
    /// Words in reading order
    #[serde(default)]
    pub words: Vec<Word>,
    /// Table regions
    #[serde(default)]
    pub tables: Vec<TableRegion>,
}

impl PageData {
    /// Create an empty page.
    pub fn new(number: u32, width: f32, height: f32) -> Self {
        Self {
            number,
            width,
            height,
            ..Self::default()
        }
    }

    /// Create an empty A4 page (595 x 842 points).
    pub fn a4(number: u32) -> Self {
        Self::new(number, 595.0, 842.0)
    }

    /// Set words and return self.
    pub fn with_words(mut self, words: Vec<Word>) -> Self {
        self.words = words;
        self
    }

    /// Add a table region and return self.
    pub fn with_table(mut self, table: TableRegion) -> Self {
        self.tables.push(table);
        self
    }

    /// Set the plain text and return self.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

impl PdfPage for PageData {
    fn number(&self) -> u32 {
        self.number
    }

    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn extract_text(&self) -> Result<String> {
        if let Some(text) = &self.text {
            return Ok(text.clone());
        }
        Ok(self
            .words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" "))
    }

    fn extract_words(&self) -> Result<Vec<Word>> {
        if let Some(word) = self.words.iter().find(|w| !w.is_finite()) {
            return Err(Error::Extraction {
                page: self.number,
                message: format!("word '{}' has a non-finite bounding box", word.text),
            });
        }
        Ok(self.words.clone())
    }

    fn find_tables(&self) -> Result<Vec<TableRegion>> {
        Ok(self.tables.clone())
    }
}

// ---------------------------------------------------------------------------
// JsonPageSource: pages loaded from a JSON page dump
// ---------------------------------------------------------------------------

/// Concrete [`PageSource`] backed by a JSON page dump.
///
/// The dump has the shape `{ "source": "...", "pages": [PageData, ...] }`;
/// `source` is optional and defaults to the dump's own path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JsonPageSource {
    /// Identifier of the source document
    #[serde(default)]
    pub source: String,
    /// Pages in document order
    pub pages: Vec<PageData>,
}

impl JsonPageSource {
    /// Wrap in-memory pages.
    pub fn from_pages(source: impl Into<String>, pages: Vec<PageData>) -> Self {
        Self {
            source: source.into(),
            pages,
        }
    }

    /// Load from a file path.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut dump = Self::load_reader(BufReader::new(file))?;
        if dump.source.is_empty() {
            dump.source = path.to_string_lossy().to_string();
        }
        Ok(dump)
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        let dump: Self = serde_json::from_slice(data)?;
        dump.validate()?;
        Ok(dump)
    }

    /// Load from a reader.
    pub fn load_reader<R: Read>(reader: R) -> Result<Self> {
        let dump: Self = serde_json::from_reader(reader)?;
        dump.validate()?;
        Ok(dump)
    }

    fn validate(&self) -> Result<()> {
        for pair in self.pages.windows(2) {
            if pair[1].number <= pair[0].number {
                return Err(Error::Open(format!(
                    "pages out of order: {} follows {}",
                    pair[1].number, pair[0].number
                )));
            }
        }
        Ok(())
    }
}

impl PageSource for JsonPageSource {
    fn identifier(&self) -> &str {
        &self.source
    }

    fn page_count(&self) -> Result<usize> {
        Ok(self.pages.len())
    }

    fn page(&self, index: usize) -> Result<Box<dyn PdfPage + '_>> {
        self.pages
            .get(index)
            .map(|p| Box::new(p) as Box<dyn PdfPage + '_>)
            .ok_or_else(|| {
                Error::Open(format!(
                    "page index {} out of range ({} pages)",
                    index,
                    self.pages.len()
                ))
            })
    }
}
