//! Scanned-page detection.

use super::backend::PdfPage;
use super::options::ScanConfig;

/// How a document's pages carry their text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageClass {
    /// Text and word positions are extractable
    Native,
    /// Image-only; text must come from OCR
    Scanned,
}

/// Classifies a document as native or scanned from its first page.
///
/// The first classification is cached and returned for every later page:
/// a document is either scanned or it is not.
#[derive(Debug, Clone, Default)]
pub struct ScannedPageDetector {
    config: ScanConfig,
    cached: Option<PageClass>,
}

impl ScannedPageDetector {
    /// Create a detector with no cached decision.
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            cached: None,
        }
    }

    /// Classify a page, using the cached decision when there is one.
    pub fn classify(&mut self, page: &dyn PdfPage) -> PageClass {
        if let Some(class) = self.cached {
            return class;
        }
        let class = self.inspect(page);
        log::debug!("Page {} classified as {:?}; applies to the whole document", page.number(), class);
        self.cached = Some(class);
        class
    }

    /// The cached decision, if any page has been classified yet.
    pub fn cached(&self) -> Option<PageClass> {
        self.cached
    }

    /// Forget the cached decision (before processing another document).
    pub fn reset(&mut self) {
        self.cached = None;
    }

    fn inspect(&self, page: &dyn PdfPage) -> PageClass {
        let text = match page.extract_text() {
            Ok(text) => text,
            Err(e) => {
                log::warn!("Page {}: text extraction failed, treating as scanned: {}", page.number(), e);
                return PageClass::Scanned;
            }
        };
        let words = match page.extract_words() {
            Ok(words) => words,
            Err(e) => {
                log::warn!("Page {}: word extraction failed, treating as scanned: {}", page.number(), e);
                return PageClass::Scanned;
            }
        };

        if text.trim().is_empty() || words.len() < self.config.min_words {
            PageClass::Scanned
        } else {
            PageClass::Native
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::model::TableRegion;
    use crate::parser::backend::{PageData, Word};

    fn words(n: usize) -> Vec<Word> {
        (0..n)
            .map(|i| Word::new(format!("w{i}"), i as f32 * 20.0, 10.0, i as f32 * 20.0 + 15.0, 20.0))
            .collect()
    }

    struct BrokenPage;

    impl PdfPage for BrokenPage {
        fn number(&self) -> u32 {
            1
        }
        fn width(&self) -> f32 {
            595.0
        }
        fn height(&self) -> f32 {
            842.0
        }
        fn extract_text(&self) -> Result<String> {
            Err(Error::Extraction {
                page: 1,
                message: "no content stream".into(),
            })
        }
        fn extract_words(&self) -> Result<Vec<Word>> {
            Ok(Vec::new())
        }
        fn find_tables(&self) -> Result<Vec<TableRegion>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_native_page() {
        let mut detector = ScannedPageDetector::default();
        let page = PageData::a4(1).with_words(words(5));
        assert_eq!(detector.classify(&page), PageClass::Native);
    }

    #[test]
    fn test_too_few_words_is_scanned() {
        let mut detector = ScannedPageDetector::default();
        let page = PageData::a4(1).with_words(words(4));
        assert_eq!(detector.classify(&page), PageClass::Scanned);

        let mut detector = ScannedPageDetector::new(ScanConfig { min_words: 2 });
        let page = PageData::a4(1).with_words(words(4)).with_text("   ");
        assert_eq!(detector.classify(&page), PageClass::Scanned);
    }

    #[test]
    fn test_error_is_scanned() {
        let mut detector = ScannedPageDetector::default();
        assert_eq!(detector.classify(&BrokenPage), PageClass::Scanned);
    }

    #[test]
    fn test_first_decision_is_cached() {
        let mut detector = ScannedPageDetector::default();
        assert_eq!(detector.classify(&PageData::a4(1)), PageClass::Scanned);
        let rich = PageData::a4(2).with_words(words(50));
        assert_eq!(detector.classify(&rich), PageClass::Scanned);

        detector.reset();
        assert_eq!(detector.cached(), None);
        assert_eq!(detector.classify(&rich), PageClass::Native);
        assert_eq!(detector.classify(&PageData::a4(3)), PageClass::Native);
    }
}
