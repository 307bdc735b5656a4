//! Per-page output assembly.

use crate::model::{ContentType, DocumentIndex, DocumentInfo, OutputItem, Record};

/// Groups retained records into one [`OutputItem`] per page.
///
/// A page's text lines are joined with single spaces; its tables follow on
/// new lines in extraction order. Pages holding only headers and footers
/// produce no item.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageAssembler;

impl PageAssembler {
    /// Create an assembler.
    pub fn new() -> Self {
        Self
    }

    /// Assemble the document's output items, in page order.
    pub fn assemble(&self, index: &DocumentIndex, info: &DocumentInfo) -> Vec<OutputItem> {
        let mut items = Vec::new();
        let mut page_records: Vec<&Record> = Vec::new();

        for record in index.records.retained() {
            if page_records.first().is_some_and(|r| r.page != record.page) {
                items.push(assemble_page(&page_records, info));
                page_records.clear();
            }
            page_records.push(record);
        }
        if !page_records.is_empty() {
            items.push(assemble_page(&page_records, info));
        }

        items
    }
}

fn assemble_page(records: &[&Record], info: &DocumentInfo) -> OutputItem {
    let text = records
        .iter()
        .filter(|r| r.is_text())
        .map(|r| r.content.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    let mut content = text;
    let mut content_type = ContentType::Text;
    for table in records.iter().filter(|r| r.is_table()) {
        match content_type {
            // tables stay separated so each renders on its own
            ContentType::Excel => content.push_str("\n\n"),
            ContentType::Text if !content.is_empty() => content.push('\n'),
            ContentType::Text => {}
        }
        content.push_str(&table.content);
        content_type = ContentType::Excel;
    }

    OutputItem {
        page: records.first().map_or(0, |r| r.page),
        content_type,
        title: info.title.clone(),
        source: info.source.clone(),
        content,
    }
}
