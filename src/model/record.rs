//! Content records and the append-only record store.

use serde::{Deserialize, Serialize};

use super::Grid;

/// What a record holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// A reconstructed body text line
    Text,
    /// A stitched table
    Table,
    /// Running page header (suppressed from output)
    Header,
    /// Running page footer or page number (suppressed from output)
    Footer,
}

impl RecordKind {
    /// Whether records of this kind reach title scanning and assembly.
    pub fn is_retained(self) -> bool {
        matches!(self, RecordKind::Text | RecordKind::Table)
    }

    /// Tag used in record dumps.
    pub fn dump_tag(self) -> &'static str {
        match self {
            RecordKind::Text => "text",
            RecordKind::Table => "excel",
            RecordKind::Header => "header",
            RecordKind::Footer => "footer",
        }
    }

    /// Parse a dump tag back into a kind.
    ///
    /// Older dumps tag headers and footers as `页眉` and `页脚`.
    pub fn from_dump_tag(tag: &str) -> Option<Self> {
        match tag {
            "text" => Some(RecordKind::Text),
            "excel" | "table" => Some(RecordKind::Table),
            "header" | "页眉" => Some(RecordKind::Header),
            "footer" | "页脚" => Some(RecordKind::Footer),
            _ => None,
        }
    }
}

/// One atomic unit of extracted content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Global position in the document; equal to the record's store index
    pub sequence_id: u64,

    /// 1-based page number
    pub page: u32,

    /// Record kind
    pub kind: RecordKind,

    /// Text line, or the table rendered as pipe markup
    pub content: String,

    /// Repaired grid for table records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<Grid>,
}

impl Record {
    /// Whether this record is body content (not a header or footer).
    pub fn is_retained(&self) -> bool {
        self.kind.is_retained()
    }

    /// Whether this is a text line.
    pub fn is_text(&self) -> bool {
        self.kind == RecordKind::Text
    }

    /// Whether this is a table.
    pub fn is_table(&self) -> bool {
        self.kind == RecordKind::Table
    }

    /// First non-empty grid value, used as an ad hoc table title.
    pub fn first_grid_value(&self) -> Option<&str> {
        self.grid
            .as_ref()?
            .iter()
            .flatten()
            .map(String::as_str)
            .find(|cell| !cell.trim().is_empty())
    }
}

/// Append-only, index-addressed store of records.
///
/// A record's `sequence_id` is its index, so ids are gap-free and strictly
/// increasing by construction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordStore {
    records: Vec<Record>,
}

impl RecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> u64 {
        self.records.len() as u64
    }

    /// Append a text line and return its id.
    pub fn push_text(&mut self, page: u32, content: impl Into<String>) -> u64 {
        let id = self.next_id();
        self.records.push(Record {
            sequence_id: id,
            page,
            kind: RecordKind::Text,
            content: content.into(),
            grid: None,
        });
        id
    }

    /// Append a table and return its id.
    pub fn push_table(&mut self, page: u32, grid: Grid, markup: String) -> u64 {
        let id = self.next_id();
        self.records.push(Record {
            sequence_id: id,
            page,
            kind: RecordKind::Table,
            content: markup,
            grid: Some(grid),
        });
        id
    }

    /// Append a record of a given kind (used when loading dumps).
    pub(crate) fn push_kind(
        &mut self,
        page: u32,
        kind: RecordKind,
        content: String,
        grid: Option<Grid>,
    ) -> u64 {
        let id = self.next_id();
        self.records.push(Record {
            sequence_id: id,
            page,
            kind,
            content,
            grid,
        });
        id
    }

    /// Change a text record into a header or footer.
    ///
    /// Returns `false` (and changes nothing) if the record does not exist or
    /// is not a text record.
    pub(crate) fn reclassify(&mut self, id: u64, kind: RecordKind) -> bool {
        match self.records.get_mut(id as usize) {
            Some(record) if record.kind == RecordKind::Text => {
                record.kind = kind;
                true
            }
            _ => false,
        }
    }

    /// Get a record by id.
    pub fn get(&self, id: u64) -> Option<&Record> {
        self.records.get(id as usize)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Id of the most recently appended record.
    pub fn last_id(&self) -> Option<u64> {
        self.records.last().map(|r| r.sequence_id)
    }

    /// All records in sequence order.
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// Records that are not headers or footers, in sequence order.
    pub fn retained(&self) -> impl Iterator<Item = &Record> {
        self.records.iter().filter(|r| r.is_retained())
    }

    /// All records as a slice.
    pub fn as_slice(&self) -> &[Record] {
        &self.records
    }

    /// Count records of a kind.
    pub fn count(&self, kind: RecordKind) -> usize {
        self.records.iter().filter(|r| r.kind == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_follow_insertion_order() {
        let mut store = RecordStore::new();
        assert_eq!(store.push_text(1, "a"), 0);
        assert_eq!(
            store.push_table(1, vec![vec!["x".into()]], "| x |".into()),
            1
        );
        assert_eq!(store.push_text(2, "b"), 2);
        assert_eq!(store.last_id(), Some(2));
        assert_eq!(store.count(RecordKind::Text), 2);
    }

    #[test]
    fn test_reclassify_only_text() {
        let mut store = RecordStore::new();
        store.push_text(1, "年度报告");
        store.push_table(1, vec![vec!["x".into()]], "| x |".into());

        assert!(store.reclassify(0, RecordKind::Header));
        assert_eq!(store.get(0).unwrap().kind, RecordKind::Header);
        assert!(!store.reclassify(0, RecordKind::Footer));
        assert!(!store.reclassify(1, RecordKind::Footer));
        assert!(!store.reclassify(9, RecordKind::Footer));
        assert_eq!(store.retained().count(), 1);
    }

    #[test]
    fn test_first_grid_value_skips_blank_cells() {
        let mut store = RecordStore::new();
        store.push_table(
            1,
            vec![vec!["".into(), " ".into(), "项目".into()]],
            String::new(),
        );
        assert_eq!(store.get(0).unwrap().first_grid_value(), Some("项目"));
    }

    #[test]
    fn test_dump_tags() {
        for kind in [
            RecordKind::Text,
            RecordKind::Table,
            RecordKind::Header,
            RecordKind::Footer,
        ] {
            assert_eq!(RecordKind::from_dump_tag(kind.dump_tag()), Some(kind));
        }
        assert_eq!(RecordKind::from_dump_tag("页眉"), Some(RecordKind::Header));
        assert_eq!(RecordKind::from_dump_tag("页脚"), Some(RecordKind::Footer));
        assert_eq!(RecordKind::from_dump_tag("image"), None);
    }
}
