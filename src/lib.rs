//! # pdfknowledge
//!
//! Structural extraction of PDF pages into ordered content records.
//!
//! Pages arrive as positioned words and detected table regions (see
//! [`PageSource`]). Each page is reconstructed into text lines and repaired
//! tables, running headers and footers are tagged, scanned documents fall
//! back to OCR, and a two-level section index is inferred from `§N` / `N.M`
//! headings. The result is one output item per page plus the section index.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfknowledge::{convert_file, render};
//!
//! fn main() -> pdfknowledge::Result<()> {
//!     // A JSON page dump produced by the PDF tooling of your choice
//!     let conversion = convert_file("report.pages.json")?;
//!
//!     let json = render::to_json(&conversion.items, render::JsonFormat::Pretty)?;
//!     println!("{}", json);
//!     println!("{} sections", conversion.titles().section_count());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Line reconstruction**: baseline grouping and wrapped-line merging
//! - **Table repair**: continuation-row stitching, empty column pruning, header repair
//! - **OCR fallback**: scanned documents go through `pdftoppm` + `tesseract`
//! - **Section index**: numbered headings with the tables found under them
//! - **Record dumps**: JSON Lines snapshots that can be re-assembled later
//! - **Batch processing**: independent documents in parallel with Rayon

pub mod detect;
pub mod error;
pub mod literal;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_pdf, PdfFormat};
pub use error::{Error, Result};
pub use literal::{parse_grid, parse_literal, parse_row, Literal, LiteralError};
pub use model::{
    ContentType, ConversionStats, DocumentIndex, DocumentInfo, OutputItem, Record, RecordKind,
    RecordStore, TableRef, TitleEntry, TitleNode, TitleTree,
};
pub use parser::{
    convert_batch, Conversion, DocumentProcessor, ExtractOptions, JsonPageSource, LayoutMode,
    OcrConfig, OcrPipeline, PageData, PageSource, PdfPage, Word,
};
#[cfg(feature = "async")]
pub use parser::convert_async;
pub use render::{load_records, save_records, JsonFormat, PageAssembler};

use std::path::{Path, PathBuf};

/// Convert a JSON page dump with default options.
///
/// # Example
///
/// ```no_run
/// use pdfknowledge::convert_file;
///
/// let conversion = convert_file("report.pages.json").unwrap();
/// for item in &conversion.items {
///     println!("page {}: {}", item.page, item.content);
/// }
/// ```
pub fn convert_file<P: AsRef<Path>>(path: P) -> Result<Conversion> {
    PdfKnowledge::new().convert(path)
}

/// Convert a JSON page dump with custom options.
///
/// # Example
///
/// ```no_run
/// use pdfknowledge::{convert_file_with_options, ExtractOptions};
///
/// let options = ExtractOptions::new().with_min_words(10);
/// let conversion = convert_file_with_options("report.pages.json", options).unwrap();
/// ```
pub fn convert_file_with_options<P: AsRef<Path>>(path: P, options: ExtractOptions) -> Result<Conversion> {
    PdfKnowledge::new().with_options(options).convert(path)
}

/// Convert a JSON page dump held in memory.
pub fn convert_bytes(data: &[u8]) -> Result<Conversion> {
    let source = JsonPageSource::load_bytes(data)?;
    PdfKnowledge::new().convert_source(&source)
}

/// Extract the retained body text of a JSON page dump, one record per line.
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    Ok(convert_file(path)?.index.plain_text())
}

/// Builder for converting documents.
///
/// # Example
///
/// ```no_run
/// use pdfknowledge::{OcrConfig, PdfKnowledge};
///
/// let conversion = PdfKnowledge::new()
///     .with_min_words(8)
///     .with_ocr_config(OcrConfig::new().with_dpi(200))
///     .with_pdf("report.pdf")
///     .convert("report.pages.json")?;
/// # Ok::<(), pdfknowledge::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct PdfKnowledge {
    options: ExtractOptions,
    pdf: Option<PathBuf>,
    title: Option<String>,
}

impl PdfKnowledge {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all extraction options.
    pub fn with_options(mut self, options: ExtractOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the minimum word count for a native-text page.
    pub fn with_min_words(mut self, min_words: usize) -> Self {
        self.options = self.options.with_min_words(min_words);
        self
    }

    /// Set OCR settings (used only together with [`with_pdf`](Self::with_pdf)).
    pub fn with_ocr_config(mut self, ocr: OcrConfig) -> Self {
        self.options = self.options.with_ocr(ocr);
        self
    }

    /// Original PDF; enables the OCR fallback and names the output items.
    pub fn with_pdf(mut self, path: impl Into<PathBuf>) -> Self {
        self.pdf = Some(path.into());
        self
    }

    /// Override the document title used in output items.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Convert a JSON page dump file.
    pub fn convert<P: AsRef<Path>>(self, pages_json: P) -> Result<Conversion> {
        let source = JsonPageSource::load_file(pages_json)?;
        self.convert_source(&source)
    }

    /// Convert any page source.
    pub fn convert_source(self, source: &dyn PageSource) -> Result<Conversion> {
        let mut info = match &self.pdf {
            Some(pdf) => DocumentInfo::from_path(pdf),
            None => DocumentInfo::from_path(source.identifier()),
        };
        if let Some(title) = self.title {
            info.title = title;
        }

        let ocr = self.options.ocr.clone();
        let mut processor = DocumentProcessor::new(self.options)?;
        if let Some(pdf) = self.pdf {
            processor = processor.with_ocr(OcrPipeline::for_pdf(ocr, pdf)?);
        }
        processor.convert(source, &info)
    }
}
