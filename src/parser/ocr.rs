//! OCR fallback for scanned pages.
//!
//! A scanned page is rasterized, recognized by an external OCR engine, and
//! the raw recognition output is cleaned into text lines. Both collaborators
//! are traits so hosts can plug in their own tooling; the shipped
//! implementations drive poppler's `pdftoppm` and the `tesseract` binary.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::detect::{self, ImageFormat};
use crate::error::{Error, Result};

use super::options::{LayoutMode, OcrConfig};

/// An owned page bitmap. Dropped as soon as recognition returns.
#[derive(Debug, Clone)]
pub struct RasterImage {
    /// 1-based page number
    pub page: u32,
    /// Resolution the page was rendered at
    pub dpi: u32,
    /// Encoded image bytes
    pub data: Vec<u8>,
    /// Encoding, if recognized
    pub format: Option<ImageFormat>,
}

impl RasterImage {
    /// Wrap encoded image bytes, sniffing the encoding.
    pub fn new(page: u32, dpi: u32, data: Vec<u8>) -> Self {
        let format = detect::detect_image_format(&data);
        Self {
            page,
            dpi,
            data,
            format,
        }
    }

    /// Size of the encoded image in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the image holds no data.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Renders document pages to bitmaps.
pub trait Rasterizer: Send + Sync {
    /// Render one page (1-based) at the given resolution.
    fn rasterize(&self, page_number: u32, dpi: u32) -> Result<RasterImage>;
}

/// Recognizes text in a bitmap.
pub trait OcrEngine: Send + Sync {
    /// Recognize the image's text with a language profile and layout assumption.
    fn recognize(&self, image: &RasterImage, language: &str, layout: LayoutMode) -> Result<String>;
}

// ---------------------------------------------------------------------------
// pdftoppm
// ---------------------------------------------------------------------------

/// [`Rasterizer`] that spawns poppler's `pdftoppm` for one page at a time.
///
/// The PNG is read from the child's stdout; nothing is written to disk.
#[derive(Debug, Clone)]
pub struct PdftoppmRasterizer {
    pdf_path: PathBuf,
    binary: PathBuf,
}

impl PdftoppmRasterizer {
    /// Rasterize pages of `pdf_path` with the given `pdftoppm` binary.
    pub fn new(pdf_path: impl Into<PathBuf>, binary: impl Into<PathBuf>) -> Self {
        Self {
            pdf_path: pdf_path.into(),
            binary: binary.into(),
        }
    }

    /// The document being rasterized.
    pub fn pdf_path(&self) -> &Path {
        &self.pdf_path
    }
}

impl Rasterizer for PdftoppmRasterizer {
    fn rasterize(&self, page_number: u32, dpi: u32) -> Result<RasterImage> {
        detect::detect_format_from_path(&self.pdf_path)?;

        let page = page_number.to_string();
        let output = Command::new(&self.binary)
            .args(["-png", "-singlefile", "-r", &dpi.to_string()])
            .args(["-f", &page, "-l", &page])
            .arg(&self.pdf_path)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| Error::Raster {
                page: page_number,
                message: format!("cannot run {}: {}", self.binary.display(), e),
            })?;

        if !output.status.success() {
            return Err(Error::Raster {
                page: page_number,
                message: format!(
                    "{} exited with {}: {}",
                    self.binary.display(),
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        if output.stdout.is_empty() {
            return Err(Error::Raster {
                page: page_number,
                message: "rasterizer produced no image".to_string(),
            });
        }

        Ok(RasterImage::new(page_number, dpi, output.stdout))
    }
}

// ---------------------------------------------------------------------------
// tesseract
// ---------------------------------------------------------------------------

/// [`OcrEngine`] that spawns the `tesseract` binary, feeding the image on
/// stdin and reading text from stdout.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    binary: PathBuf,
}

impl TesseractEngine {
    /// Use the given `tesseract` binary.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize(&self, image: &RasterImage, language: &str, layout: LayoutMode) -> Result<String> {
        let mut child = Command::new(&self.binary)
            .args(["stdin", "stdout", "-l", language, "--oem", "3", "--psm"])
            .arg(layout.psm().to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::Ocr(format!("cannot run {}: {}", self.binary.display(), e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&image.data)?;
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(Error::Ocr(format!(
                "{} exited with {} on page {}: {}",
                self.binary.display(),
                output.status,
                image.page,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Rasterize, recognize and clean a scanned page.
pub struct OcrPipeline {
    config: OcrConfig,
    rasterizer: Box<dyn Rasterizer>,
    engine: Box<dyn OcrEngine>,
    disallowed: Regex,
    horizontal_space: Regex,
}

impl OcrPipeline {
    /// Build a pipeline from explicit collaborators.
    pub fn new(
        config: OcrConfig,
        rasterizer: impl Rasterizer + 'static,
        engine: impl OcrEngine + 'static,
    ) -> Result<Self> {
        Ok(Self {
            config,
            rasterizer: Box::new(rasterizer),
            engine: Box::new(engine),
            disallowed: Regex::new(r"[^\w\s\x{4e00}-\x{9fff}.,，。:：()（）\-]")?,
            horizontal_space: Regex::new(r"[^\S\n]+")?,
        })
    }

    /// Build a pipeline that runs `pdftoppm` and `tesseract` from the
    /// configured paths against `pdf_path`.
    pub fn for_pdf(config: OcrConfig, pdf_path: impl Into<PathBuf>) -> Result<Self> {
        let rasterizer = PdftoppmRasterizer::new(pdf_path, config.pdftoppm_path.clone());
        let engine = TesseractEngine::new(config.tesseract_path.clone());
        Self::new(config, rasterizer, engine)
    }

    /// The pipeline's settings.
    pub fn config(&self) -> &OcrConfig {
        &self.config
    }

    /// Recognize a page and return its cleaned, non-empty lines.
    ///
    /// Any failure is logged and yields no lines.
    pub fn extract(&self, page_number: u32) -> Vec<String> {
        match self.try_extract(page_number) {
            Ok(lines) => lines,
            Err(e) => {
                log::warn!("Page {}: OCR failed, page left empty: {}", page_number, e);
                Vec::new()
            }
        }
    }

    /// Like [`extract`](Self::extract) but surfaces the failure.
    pub fn try_extract(&self, page_number: u32) -> Result<Vec<String>> {
        let image = self.rasterizer.rasterize(page_number, self.config.dpi)?;
        log::debug!(
            "Page {}: rasterized {} bytes at {} dpi ({:?})",
            page_number,
            image.len(),
            image.dpi,
            image.format
        );
        let raw = self
            .engine
            .recognize(&image, &self.config.language, self.config.layout)?;
        drop(image);

        Ok(self
            .clean(&raw)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Normalize raw recognition output.
    ///
    /// NFC-normalizes, strips characters outside the allow-list, collapses
    /// runs of horizontal whitespace, then applies the substitution table.
    /// Line breaks are preserved.
    pub fn clean(&self, text: &str) -> String {
        let text: String = text.nfc().collect();
        let text = self.disallowed.replace_all(&text, "");
        let mut text = self.horizontal_space.replace_all(&text, " ").into_owned();
        for (from, to) in &self.config.substitutions {
            text = text.replace(from.as_str(), to);
        }
        text
    }
}

impl std::fmt::Debug for OcrPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrPipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
