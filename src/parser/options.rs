//! Extraction options and configuration.

use std::path::PathBuf;

/// Options for extracting a document.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Line reconstruction settings
    pub lines: LineConfig,

    /// Table repair settings
    pub tables: TableConfig,

    /// Scanned-page detection settings
    pub scan: ScanConfig,

    /// Header/footer boundary patterns
    pub boundaries: BoundaryPatterns,

    /// Section heading patterns
    pub titles: TitlePatterns,

    /// OCR fallback settings
    pub ocr: OcrConfig,
}

impl ExtractOptions {
    /// Create new extract options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set line reconstruction settings.
    pub fn with_lines(mut self, lines: LineConfig) -> Self {
        self.lines = lines;
        self
    }

    /// Set table repair settings.
    pub fn with_tables(mut self, tables: TableConfig) -> Self {
        self.tables = tables;
        self
    }

    /// Set the minimum word count for a native-text page.
    pub fn with_min_words(mut self, min_words: usize) -> Self {
        self.scan.min_words = min_words;
        self
    }

    /// Set header/footer patterns.
    pub fn with_boundaries(mut self, boundaries: BoundaryPatterns) -> Self {
        self.boundaries = boundaries;
        self
    }

    /// Set section heading patterns.
    pub fn with_titles(mut self, titles: TitlePatterns) -> Self {
        self.titles = titles;
        self
    }

    /// Set OCR settings.
    pub fn with_ocr(mut self, ocr: OcrConfig) -> Self {
        self.ocr = ocr;
        self
    }
}

/// Line terminators: sentence end, unit/currency notes, a digit, or a report
/// title suffix. A line ending in one of these is never merged with the next.
pub const DEFAULT_TERMINATOR_PATTERN: &str = r"(?:。|；|单位：人民币元|金额单位：人民币元|单位：万元|币种：人民币|\d|报告(?:全文)?(?:（修订版）|（修订稿）|（更正后）)?)$";

/// Settings for merging words into lines.
#[derive(Debug, Clone)]
pub struct LineConfig {
    /// Maximum vertical offset between words on the same visual line
    pub same_line_tolerance: f32,

    /// A word ending right of `width * right_margin_ratio` touches the margin
    pub right_margin_ratio: f32,

    /// Wrapped lines are only merged above `height * page_footer_ratio`
    /// (whole-page extraction)
    pub page_footer_ratio: f32,

    /// Same as `page_footer_ratio`, for text around tables
    pub region_footer_ratio: f32,

    /// Regex matched against the accumulated text before merging a wrap
    pub terminator_pattern: String,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            same_line_tolerance: 2.0,
            right_margin_ratio: 0.85,
            page_footer_ratio: 0.9,
            region_footer_ratio: 0.85,
            terminator_pattern: DEFAULT_TERMINATOR_PATTERN.to_string(),
        }
    }
}

/// Settings for table grid repair.
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// Merge continuation rows (empty first cell) into the row above
    pub stitch_rows: bool,

    /// Fill empty header and data cells from their neighbours
    pub repair_cells: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            stitch_rows: true,
            repair_cells: true,
        }
    }
}

/// Settings for scanned-page detection.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Pages with fewer words are treated as scanned
    pub min_words: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self { min_words: 5 }
    }
}

/// Boundary patterns for running headers and footers.
#[derive(Debug, Clone)]
pub struct BoundaryPatterns {
    /// A page's first line matching this is a running header
    pub header: String,

    /// A page's last line matching this is a footer
    pub footer: String,

    /// Footer candidates containing this character are kept as text
    pub footer_exclude: char,
}

impl Default for BoundaryPatterns {
    fn default() -> Self {
        Self {
            header: r"[^计](?:报告(?:全文)?(?:（修订版）|（修订稿）|（更正后）)?)$".to_string(),
            footer: r"^(?:\d|\\|/|第|共|页|-|_| )+".to_string(),
            footer_exclude: '[',
        }
    }
}

/// Section heading patterns.
///
/// `chapter` must capture the number then the heading text, `subsection` the
/// `N.M` number, `bare_marker` the number alone.
#[derive(Debug, Clone)]
pub struct TitlePatterns {
    /// Top-level heading with inline text, e.g. `§3重要事项`
    pub chapter: String,

    /// Decimal subsection heading, e.g. `3.1报告期内经营情况`
    pub subsection: String,

    /// Top-level marker whose text is on the next line, e.g. `§3`
    pub bare_marker: String,

    /// A next-line label containing this is a table-of-contents entry
    pub toc_leader: String,
}

impl Default for TitlePatterns {
    fn default() -> Self {
        Self {
            chapter: r"^§(\d+)([\x{4e00}-\x{9fa5}]+)".to_string(),
            subsection: r"^(\d+)\.\d+[\x{4e00}-\x{9fa5}]+".to_string(),
            bare_marker: r"^§(\d+)$".to_string(),
            toc_leader: "...".to_string(),
        }
    }
}

/// Page layout assumption passed to the OCR engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutMode {
    /// Fully automatic page segmentation
    Auto,
    /// A single column of text of variable sizes. The default: report
    /// pages are read top to bottom as one column (`--psm 4`).
    #[default]
    SingleColumn,
    /// A single uniform block of text
    SingleBlock,
    /// As much text as possible in no particular order
    SparseText,
}

impl LayoutMode {
    /// Tesseract page segmentation mode number.
    pub fn psm(self) -> u8 {
        match self {
            LayoutMode::Auto => 3,
            LayoutMode::SingleColumn => 4,
            LayoutMode::SingleBlock => 6,
            LayoutMode::SparseText => 11,
        }
    }
}

/// OCR fallback settings. Paths name external programs; they are looked up
/// on `PATH` when relative.
#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Recognition language profile
    pub language: String,

    /// Layout assumption
    pub layout: LayoutMode,

    /// Rasterization resolution
    pub dpi: u32,

    /// Known misrecognitions, applied in order after cleaning
    pub substitutions: Vec<(String, String)>,

    /// OCR engine binary
    pub tesseract_path: PathBuf,

    /// Rasterizer binary
    pub pdftoppm_path: PathBuf,
}

impl OcrConfig {
    /// Create OCR settings with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the language profile.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Set the layout assumption.
    pub fn with_layout(mut self, layout: LayoutMode) -> Self {
        self.layout = layout;
        self
    }

    /// Set the rasterization resolution.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Add a misrecognition substitution.
    pub fn with_substitution(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.substitutions.push((from.into(), to.into()));
        self
    }

    /// Set the OCR engine binary.
    pub fn with_tesseract_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.tesseract_path = path.into();
        self
    }

    /// Set the rasterizer binary.
    pub fn with_pdftoppm_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.pdftoppm_path = path.into();
        self
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: "chi_sim+eng".to_string(),
            layout: LayoutMode::default(),
            dpi: 300,
            substitutions: vec![
                ("虱".to_string(), "是".to_string()),
                ("振".to_string(), "数".to_string()),
                ("探".to_string(), "文".to_string()),
            ],
            tesseract_path: PathBuf::from("tesseract"),
            pdftoppm_path: PathBuf::from("pdftoppm"),
        }
    }
}
