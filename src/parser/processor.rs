//! Document processing: pages in, records and a section index out.

use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::model::{ConversionStats, DocumentIndex, DocumentInfo, OutputItem, RecordStore, TitleTree};
use crate::render::PageAssembler;

use super::backend::{PageSource, PdfPage};
use super::boundary::HeaderFooterClassifier;
use super::lines::LineReconstructor;
use super::ocr::OcrPipeline;
use super::options::ExtractOptions;
use super::scan::{PageClass, ScannedPageDetector};
use super::table_extractor::{render_markup, PageSegment, TableExtractor};
use super::titles::TitleHierarchyBuilder;

/// Result of converting one document.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// Document identity used for the output items
    pub info: DocumentInfo,
    /// Records and section index
    pub index: DocumentIndex,
    /// One item per page with body content
    pub items: Vec<OutputItem>,
    /// Counters collected during processing
    pub stats: ConversionStats,
}

impl Conversion {
    /// The section index.
    pub fn titles(&self) -> &TitleTree {
        &self.index.titles
    }

    /// The record store.
    pub fn records(&self) -> &RecordStore {
        &self.index.records
    }
}

/// Drives page extraction for one document at a time.
///
/// # Example
///
/// ```no_run
/// use pdfknowledge::{DocumentInfo, DocumentProcessor, ExtractOptions, JsonPageSource};
///
/// let source = JsonPageSource::load_file("report.pages.json")?;
/// let mut processor = DocumentProcessor::new(ExtractOptions::default())?;
/// let conversion = processor.convert(&source, &DocumentInfo::from_path("report.pdf"))?;
/// println!("{} items", conversion.items.len());
/// # Ok::<(), pdfknowledge::Error>(())
/// ```
pub struct DocumentProcessor {
    lines: LineReconstructor,
    tables: TableExtractor,
    detector: ScannedPageDetector,
    boundaries: HeaderFooterClassifier,
    titles: TitleHierarchyBuilder,
    ocr: Option<OcrPipeline>,
    store: RecordStore,
    last_record: Option<u64>,
    last_page: Option<u32>,
    stats: ConversionStats,
}

impl DocumentProcessor {
    /// Create a processor; fails if a configured pattern does not compile.
    pub fn new(options: ExtractOptions) -> Result<Self> {
        Ok(Self {
            lines: LineReconstructor::new(options.lines)?,
            tables: TableExtractor::new(options.tables),
            detector: ScannedPageDetector::new(options.scan),
            boundaries: HeaderFooterClassifier::new(&options.boundaries)?,
            titles: TitleHierarchyBuilder::new(&options.titles)?,
            ocr: None,
            store: RecordStore::new(),
            last_record: None,
            last_page: None,
            stats: ConversionStats::default(),
        })
    }

    /// Attach an OCR pipeline for scanned documents.
    ///
    /// Without one, scanned pages contribute no records.
    pub fn with_ocr(mut self, pipeline: OcrPipeline) -> Self {
        self.ocr = Some(pipeline);
        self
    }

    /// Counters from the most recent [`process`](Self::process) call.
    pub fn stats(&self) -> &ConversionStats {
        &self.stats
    }

    /// Extract every page of `source` and build the section index.
    ///
    /// Fails only when the source cannot be paginated. Page-level failures
    /// are logged and the page contributes no records.
    pub fn process(&mut self, source: &dyn PageSource) -> Result<DocumentIndex> {
        self.reset();

        let count = source.page_count().map_err(|e| match e {
            Error::Open(_) => e,
            other => Error::Open(format!("{}: {}", source.identifier(), other)),
        })?;
        log::debug!("Processing {} ({} pages)", source.identifier(), count);

        for index in 0..count {
            let page = match source.page(index) {
                Ok(page) => page,
                Err(e) => {
                    log::warn!("Page index {}: cannot load page: {}", index, e);
                    self.stats.empty_pages += 1;
                    continue;
                }
            };
            self.process_page(page.as_ref());
        }

        self.stats.scanned = self.detector.cached() == Some(PageClass::Scanned);
        self.stats.count_records(&self.store);

        let records = std::mem::take(&mut self.store);
        let titles = self.titles.build(&records);
        log::debug!(
            "{}: {} records, {} sections",
            source.identifier(),
            records.len(),
            titles.section_count()
        );
        Ok(DocumentIndex { records, titles })
    }

    /// Process a document and assemble its output items.
    pub fn convert(&mut self, source: &dyn PageSource, info: &DocumentInfo) -> Result<Conversion> {
        let index = self.process(source)?;
        let items = PageAssembler::new().assemble(&index, info);
        Ok(Conversion {
            info: info.clone(),
            index,
            items,
            stats: self.stats.clone(),
        })
    }

    fn reset(&mut self) {
        self.store = RecordStore::new();
        self.last_record = None;
        self.last_page = None;
        self.detector.reset();
        self.stats = ConversionStats::default();
    }

    fn process_page(&mut self, page: &dyn PdfPage) {
        let number = page.number();
        if self.last_page.is_some_and(|last| number <= last) {
            log::warn!("Page {} is out of order, skipped", number);
            self.stats.empty_pages += 1;
            return;
        }
        self.last_page = Some(number);
        self.stats.pages += 1;

        let before = self.store.len();
        match self.detector.classify(page) {
            PageClass::Scanned => self.extract_scanned(number),
            PageClass::Native => self.extract_native(page),
        }
        let appended = self.store.len() - before;

        if appended == 0 {
            self.stats.empty_pages += 1;
            log::info!("Page {}: no content", number);
            return;
        }

        self.boundaries
            .classify_page(&mut self.store, self.last_record);
        self.last_record = self.store.last_id();
        log::info!("Page {}: {} records", number, appended);
    }

    fn extract_native(&mut self, page: &dyn PdfPage) {
        let number = page.number();
        let segments = match self.tables.extract(page, &self.lines) {
            Ok(segments) => segments,
            Err(e) => {
                log::warn!("Page {}: extraction failed: {}", number, e);
                return;
            }
        };

        for segment in segments {
            match segment {
                PageSegment::Text(line) => {
                    self.store.push_text(number, line);
                }
                PageSegment::Table(grid) => {
                    let markup = render_markup(&grid);
                    self.store.push_table(number, grid, markup);
                }
                PageSegment::Ragged(line) => {
                    self.stats.ragged_rows += 1;
                    self.store.push_text(number, line);
                }
            }
        }
    }

    fn extract_scanned(&mut self, number: u32) {
        let Some(ocr) = &self.ocr else {
            log::debug!("Page {}: scanned, but no OCR pipeline configured", number);
            return;
        };
        let lines = ocr.extract(number);
        if !lines.is_empty() {
            self.stats.ocr_pages += 1;
        }
        for line in lines {
            self.store.push_text(number, line);
        }
    }
}

impl std::fmt::Debug for DocumentProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentProcessor")
            .field("ocr", &self.ocr.is_some())
            .field("records", &self.store.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

/// Convert independent documents in parallel, one processor per document.
///
/// Each source's identifier is used as its path for [`DocumentInfo`]. OCR is
/// not attached; scanned documents yield no records.
pub fn convert_batch<S>(sources: &[S], options: &ExtractOptions) -> Vec<Result<Conversion>>
where
    S: PageSource + Sync,
{
    sources
        .par_iter()
        .map(|source| {
            let mut processor = DocumentProcessor::new(options.clone())?;
            let info = DocumentInfo::from_path(source.identifier());
            processor.convert(source, &info)
        })
        .collect()
}

/// Run a conversion on tokio's blocking pool.
#[cfg(feature = "async")]
pub async fn convert_async<S>(
    mut processor: DocumentProcessor,
    source: S,
    info: DocumentInfo,
) -> Result<Conversion>
where
    S: PageSource + Send + 'static,
{
    tokio::task::spawn_blocking(move || processor.convert(&source, &info))
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e)))?
}
