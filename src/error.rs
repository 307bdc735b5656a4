//! Error types for pdfknowledge library.

use std::io;
use thiserror::Error;

use crate::literal::LiteralError;

/// Result type alias for pdfknowledge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during document extraction.
///
/// Only [`Error::Open`] (and I/O or JSON failures while loading inputs) abort a
/// conversion. Everything else is scoped to a single page and handled by the
/// component that raised it.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The page source could not be opened or paginated.
    #[error("Cannot open page source: {0}")]
    Open(String),

    /// The file handed to a rasterizer is not a PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// Page text or word extraction failed.
    ///
    /// [`PageData`](crate::PageData) raises it for words with non-finite
    /// coordinates; host [`PdfPage`](crate::PdfPage) implementations use it
    /// for their own backend failures.
    #[error("Extraction error on page {page}: {message}")]
    Extraction {
        /// 1-based page number
        page: u32,
        /// Backend message
        message: String,
    },

    /// The OCR engine is unavailable or recognition failed.
    #[error("OCR error: {0}")]
    Ocr(String),

    /// Rasterizing a page to a bitmap failed.
    #[error("Rasterization error on page {page}: {message}")]
    Raster {
        /// 1-based page number
        page: u32,
        /// Backend message
        message: String,
    },

    /// A table row does not match the table's column count.
    #[error("Ragged table row {row}: {columns} cells, expected {expected}")]
    TableStitch {
        /// Row index in the raw grid
        row: usize,
        /// Number of cells in the row
        columns: usize,
        /// Number of cells in the header row
        expected: usize,
    },

    /// A heading candidate broke numeric continuity or duplicated a label.
    #[error("Title '{label}' (id {id}) rejected: {reason}")]
    TitleConflict {
        /// Parsed heading number
        id: u32,
        /// Heading label
        label: String,
        /// Why the candidate was rejected
        reason: &'static str,
    },

    /// A configured pattern is not a valid regular expression.
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// A cell or row literal could not be parsed.
    #[error("Literal parse error: {0}")]
    Literal(#[from] LiteralError),

    /// A record dump line is malformed.
    #[error("Record dump line {line}: {message}")]
    Dump {
        /// 1-based line number in the dump
        line: usize,
        /// What was wrong with the line
        message: String,
    },

    /// Error while rendering output.
    #[error("Rendering error: {0}")]
    Render(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::TableStitch {
            row: 3,
            columns: 2,
            expected: 4,
        };
        assert_eq!(err.to_string(), "Ragged table row 3: 2 cells, expected 4");

        let err = Error::Extraction {
            page: 7,
            message: "broken stream".to_string(),
        };
        assert_eq!(err.to_string(), "Extraction error on page 7: broken stream");

        let err = Error::Dump {
            line: 2,
            message: "unknown record type 'image'".to_string(),
        };
        assert_eq!(err.to_string(), "Record dump line 2: unknown record type 'image'");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_literal_error_conversion() {
        let err: Error = crate::literal::parse_literal("['a'").unwrap_err().into();
        assert!(matches!(err, Error::Literal(_)));
    }
}
