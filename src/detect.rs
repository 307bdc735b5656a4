//! Input and raster format sniffing.
//!
//! The rasterizer refuses to spawn on anything that is not a PDF, and the
//! bitmaps it returns are checked before they are handed to the OCR engine.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// PDF header information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfFormat {
    /// PDF version (e.g., "1.7", "2.0")
    pub version: String,
}

impl std::fmt::Display for PdfFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PDF {}", self.version)
    }
}

/// Bitmap encodings a rasterizer may produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// Portable Network Graphics
    Png,
    /// Netpbm (PPM/PGM/PBM)
    Pnm,
    /// TIFF, either byte order
    Tiff,
    /// JPEG
    Jpeg,
}

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const PDF_MAGIC_LEN: usize = 5;
const VERSION_LEN: usize = 3; // e.g., "1.7"

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Detect PDF format from a file path.
///
/// # Example
/// ```no_run
/// use pdfknowledge::detect::detect_format_from_path;
///
/// let format = detect_format_from_path("annual-report.pdf").unwrap();
/// println!("PDF version: {}", format.version);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<PdfFormat> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut header = [0u8; 16];
    let read = reader.read(&mut header)?;
    detect_format_from_bytes(&header[..read])
}

/// Detect PDF format from the first bytes of a file.
///
/// Returns [`Error::UnknownFormat`] when the data does not start with a
/// `%PDF-x.y` header.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<PdfFormat> {
    if data.len() < PDF_MAGIC_LEN + VERSION_LEN || !data.starts_with(PDF_MAGIC) {
        return Err(Error::UnknownFormat);
    }

    let version_bytes = &data[PDF_MAGIC_LEN..PDF_MAGIC_LEN + VERSION_LEN];
    let version = String::from_utf8_lossy(version_bytes).to_string();
    if !is_valid_version(&version) {
        return Err(Error::UnknownFormat);
    }

    Ok(PdfFormat { version })
}

fn is_valid_version(version: &str) -> bool {
    let bytes = version.as_bytes();
    bytes.len() == 3 && bytes[0].is_ascii_digit() && bytes[1] == b'.' && bytes[2].is_ascii_digit()
}

/// Check if a file is a PDF.
pub fn is_pdf<P: AsRef<Path>>(path: P) -> bool {
    detect_format_from_path(path).is_ok()
}

/// Check if bytes start with a PDF header.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    detect_format_from_bytes(data).is_ok()
}

/// Identify a raster image by its magic bytes.
pub fn detect_image_format(data: &[u8]) -> Option<ImageFormat> {
    if data.starts_with(PNG_MAGIC) {
        Some(ImageFormat::Png)
    } else if data.starts_with(b"\xff\xd8\xff") {
        Some(ImageFormat::Jpeg)
    } else if data.starts_with(b"II*\0") || data.starts_with(b"MM\0*") {
        Some(ImageFormat::Tiff)
    } else if data.len() >= 2 && data[0] == b'P' && (b'1'..=b'6').contains(&data[1]) {
        Some(ImageFormat::Pnm)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_detect_valid_pdf() {
        let format = detect_format_from_bytes(b"%PDF-1.7\n%\xe2\xe3\xcf\xd3").unwrap();
        assert_eq!(format.version, "1.7");
        assert_eq!(format.to_string(), "PDF 1.7");
    }

    #[test]
    fn test_detect_invalid_format() {
        assert!(matches!(
            detect_format_from_bytes(b"<!DOCTYPE html>"),
            Err(Error::UnknownFormat)
        ));
        assert!(matches!(detect_format_from_bytes(b"%PDF"), Err(Error::UnknownFormat)));
        assert!(matches!(
            detect_format_from_bytes(b"%PDF-x.y"),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_is_pdf_file() {
        let mut pdf = tempfile::NamedTempFile::new().unwrap();
        pdf.write_all(b"%PDF-1.4\n").unwrap();
        assert!(is_pdf(pdf.path()));

        let mut json = tempfile::NamedTempFile::new().unwrap();
        json.write_all(b"{\"pages\": []}").unwrap();
        assert!(!is_pdf(json.path()));
        assert!(!is_pdf("/nonexistent/report.pdf"));
    }

    #[test]
    fn test_detect_image_format() {
        assert_eq!(
            detect_image_format(b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR"),
            Some(ImageFormat::Png)
        );
        assert_eq!(detect_image_format(b"P6\n300 300\n255\n"), Some(ImageFormat::Pnm));
        assert_eq!(detect_image_format(b"II*\0"), Some(ImageFormat::Tiff));
        assert_eq!(detect_image_format(b"\xff\xd8\xff\xe0"), Some(ImageFormat::Jpeg));
        assert_eq!(detect_image_format(b"%PDF-1.7"), None);
    }
}
