//! Running header and footer suppression.

use regex::Regex;

use crate::error::Result;
use crate::model::{RecordKind, RecordStore};

use super::options::BoundaryPatterns;

/// What the classifier decided for one page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoundaryOutcome {
    /// Id of the record tagged as header
    pub header: Option<u64>,
    /// Id of the record tagged as footer
    pub footer: Option<u64>,
}

/// Tags the first and last record of each page as header/footer when they
/// look like a running report title or a page number.
#[derive(Debug, Clone)]
pub struct HeaderFooterClassifier {
    header: Regex,
    footer: Regex,
    footer_exclude: char,
}

impl HeaderFooterClassifier {
    /// Compile the boundary patterns.
    pub fn new(patterns: &BoundaryPatterns) -> Result<Self> {
        Ok(Self {
            header: Regex::new(&patterns.header)?,
            footer: Regex::new(&patterns.footer)?,
            footer_exclude: patterns.footer_exclude,
        })
    }

    /// Whether a line looks like a running header.
    pub fn is_header(&self, text: &str) -> bool {
        self.header.is_match(text)
    }

    /// Whether a line looks like a footer or page number.
    pub fn is_footer(&self, text: &str) -> bool {
        !text.contains(self.footer_exclude) && self.footer.is_match(text)
    }

    /// Classify the records one page appended.
    ///
    /// `previous_last` is the id of the last record before the page, or
    /// `None` when the page is the first to contribute records. Pages that
    /// appended nothing are left alone.
    pub fn classify_page(&self, store: &mut RecordStore, previous_last: Option<u64>) -> BoundaryOutcome {
        let mut outcome = BoundaryOutcome::default();
        let first = previous_last.map_or(0, |id| id + 1);
        let Some(last) = store.last_id().filter(|&last| last >= first) else {
            return outcome;
        };

        if let Some(record) = store.get(first).filter(|r| r.is_text()) {
            if self.is_header(&record.content) {
                log::debug!("Page {}: header '{}'", record.page, record.content);
                store.reclassify(first, RecordKind::Header);
                outcome.header = Some(first);
            }
        }

        if last != first || outcome.header.is_none() {
            if let Some(record) = store.get(last).filter(|r| r.is_text()) {
                if self.is_footer(&record.content) {
                    log::debug!("Page {}: footer '{}'", record.page, record.content);
                    store.reclassify(last, RecordKind::Footer);
                    outcome.footer = Some(last);
                }
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> HeaderFooterClassifier {
        HeaderFooterClassifier::new(&BoundaryPatterns::default()).unwrap()
    }

    #[test]
    fn test_header_pattern() {
        let c = classifier();
        assert!(c.is_header("某某股份有限公司2023年年度报告"));
        assert!(c.is_header("某某股份有限公司2023年半年度报告全文"));
        assert!(c.is_header("某某股份有限公司2023年年度报告（修订版）"));
        // an auditor's report is body text
        assert!(!c.is_header("审计报告"));
        assert!(!c.is_header("报告期内公司经营情况"));
    }

    #[test]
    fn test_footer_pattern() {
        let c = classifier();
        assert!(c.is_footer("12"));
        assert!(c.is_footer("第 3 页 共 120 页"));
        assert!(c.is_footer("- 7 -"));
        assert!(c.is_footer("3/120"));
        assert!(!c.is_footer("[12]"));
        assert!(!c.is_footer("营业收入"));
    }

    #[test]
    fn test_classify_first_page() {
        let c = classifier();
        let mut store = RecordStore::new();
        store.push_text(1, "某某股份有限公司2023年年度报告");
        store.push_text(1, "正文");
        store.push_text(1, "1");

        let outcome = c.classify_page(&mut store, None);
        assert_eq!(outcome.header, Some(0));
        assert_eq!(outcome.footer, Some(2));
        assert_eq!(store.get(0).unwrap().kind, RecordKind::Header);
        assert_eq!(store.get(1).unwrap().kind, RecordKind::Text);
        assert_eq!(store.get(2).unwrap().kind, RecordKind::Footer);
    }

    #[test]
    fn test_classify_later_page() {
        let c = classifier();
        let mut store = RecordStore::new();
        store.push_text(1, "封面");
        let previous = store.last_id();
        store.push_text(2, "某某股份有限公司2023年年度报告");
        store.push_table(2, vec![vec!["a".into()]], "| a |".into());

        let outcome = c.classify_page(&mut store, previous);
        assert_eq!(outcome.header, Some(1));
        // tables are never reclassified
        assert_eq!(outcome.footer, None);
        assert_eq!(store.get(0).unwrap().kind, RecordKind::Text);
    }

    #[test]
    fn test_empty_page_is_skipped() {
        let c = classifier();
        let mut store = RecordStore::new();
        store.push_text(1, "12");
        let previous = store.last_id();
        let outcome = c.classify_page(&mut store, previous);
        assert_eq!(outcome, BoundaryOutcome::default());
        assert_eq!(store.get(0).unwrap().kind, RecordKind::Text);

        let outcome = c.classify_page(&mut RecordStore::new(), None);
        assert_eq!(outcome, BoundaryOutcome::default());
    }

    #[test]
    fn test_single_record_page() {
        let c = classifier();
        let mut store = RecordStore::new();
        store.push_text(1, "8");
        let outcome = c.classify_page(&mut store, None);
        assert_eq!(outcome.footer, Some(0));
        assert_eq!(store.get(0).unwrap().kind, RecordKind::Footer);
    }
}
