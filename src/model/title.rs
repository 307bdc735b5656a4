//! Section index types.

use serde::{Deserialize, Serialize};

/// Reference from the section index to a table record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRef {
    /// Sequence id of the table record
    pub sequence_id: u64,
    /// Page the table was found on
    pub page: u32,
    /// Nearest preceding text line, or the first grid value
    pub caption: String,
}

/// A second-level heading (`N.M label`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subsection {
    /// Full heading text, number included
    pub label: String,
    /// Tables that appeared under this subsection
    #[serde(default)]
    pub tables: Vec<TableRef>,
}

impl Subsection {
    /// Create an empty subsection.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            tables: Vec::new(),
        }
    }
}

/// A top-level heading and everything nested under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleNode {
    /// Section number; 1 or the previous section's number plus one
    #[serde(rename = "id")]
    pub numeric_id: u32,
    /// Number and heading text, e.g. `3重要事项`
    pub label: String,
    /// Second-level headings in document order
    #[serde(default)]
    pub subsections: Vec<Subsection>,
    /// Tables that appeared anywhere in this section
    #[serde(default)]
    pub tables: Vec<TableRef>,
}

impl TitleNode {
    /// Create a section with no children.
    pub fn new(numeric_id: u32, label: impl Into<String>) -> Self {
        Self {
            numeric_id,
            label: label.into(),
            subsections: Vec::new(),
            tables: Vec::new(),
        }
    }

    /// Whether a subsection with this label already exists.
    pub fn has_subsection(&self, label: &str) -> bool {
        self.subsections.iter().any(|s| s.label == label)
    }
}

/// One entry of the section index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TitleEntry {
    /// A numbered top-level section
    Section(TitleNode),
    /// A table seen before any section was opened
    Table(TableRef),
}

/// Immutable section index produced once per document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TitleTree {
    entries: Vec<TitleEntry>,
}

impl TitleTree {
    /// Wrap finished entries.
    pub fn new(entries: Vec<TitleEntry>) -> Self {
        Self { entries }
    }

    /// All entries in document order.
    pub fn entries(&self) -> &[TitleEntry] {
        &self.entries
    }

    /// Top-level sections in document order.
    pub fn sections(&self) -> impl Iterator<Item = &TitleNode> {
        self.entries.iter().filter_map(|e| match e {
            TitleEntry::Section(node) => Some(node),
            TitleEntry::Table(_) => None,
        })
    }

    /// Tables that precede the first section.
    pub fn standalone_tables(&self) -> impl Iterator<Item = &TableRef> {
        self.entries.iter().filter_map(|e| match e {
            TitleEntry::Table(t) => Some(t),
            TitleEntry::Section(_) => None,
        })
    }

    /// Find a section by label.
    pub fn section(&self, label: &str) -> Option<&TitleNode> {
        self.sections().find(|n| n.label == label)
    }

    /// Number of top-level sections.
    pub fn section_count(&self) -> usize {
        self.sections().count()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
