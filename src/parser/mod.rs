//! Page extraction: from positioned words and table regions to records.

mod backend;
mod boundary;
mod lines;
mod ocr;
mod options;
mod processor;
mod scan;
mod table_extractor;
mod titles;

pub use backend::{JsonPageSource, PageData, PageSource, PdfPage, Word};
pub use boundary::{BoundaryOutcome, HeaderFooterClassifier};
pub use lines::{LineBounds, LineReconstructor};
pub use ocr::{OcrEngine, OcrPipeline, PdftoppmRasterizer, RasterImage, Rasterizer, TesseractEngine};
pub use options::{
    BoundaryPatterns, ExtractOptions, LayoutMode, LineConfig, OcrConfig, ScanConfig, TableConfig,
    TitlePatterns, DEFAULT_TERMINATOR_PATTERN,
};
pub use processor::{convert_batch, Conversion, DocumentProcessor};
#[cfg(feature = "async")]
pub use processor::convert_async;
pub use scan::{PageClass, ScannedPageDetector};
pub use table_extractor::{
    drop_empty_columns, drop_empty_rows, normalize_cells, render_markup, repair_cells,
    split_ragged, stitch_rows, PageSegment, TableExtractor,
};
pub use titles::TitleHierarchyBuilder;
