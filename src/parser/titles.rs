//! Section index construction.
//!
//! Walks the retained records once, opening a top-level section for each
//! `§N` heading that continues the numbering, nesting `N.M` headings under
//! section `N`, and filing every table under the section it appears in.

use regex::Regex;

use crate::error::{Error, Result};
use crate::model::{
    Record, RecordStore, Subsection, TableRef, TitleEntry, TitleNode, TitleTree,
};

use super::options::TitlePatterns;

/// Builds a [`TitleTree`] from a record store.
#[derive(Debug, Clone)]
pub struct TitleHierarchyBuilder {
    chapter: Regex,
    subsection: Regex,
    bare_marker: Regex,
    toc_leader: String,
}

/// Mutable state of one build pass.
#[derive(Default)]
struct TreeState {
    entries: Vec<TitleEntry>,
    /// Entry indices of top-level sections, in opening order
    sections: Vec<usize>,
    /// Id of the last accepted top-level section
    last_id: Option<u32>,
    /// (section position, subsection index) of the latest subsection,
    /// cleared when a new section opens
    open_subsection: Option<(usize, usize)>,
}

impl TreeState {
    fn section_mut(&mut self, position: usize) -> Option<&mut TitleNode> {
        let index = *self.sections.get(position)?;
        match self.entries.get_mut(index) {
            Some(TitleEntry::Section(node)) => Some(node),
            _ => None,
        }
    }

    fn has_label(&self, label: &str) -> bool {
        self.entries
            .iter()
            .any(|e| matches!(e, TitleEntry::Section(n) if n.label == label))
    }

    fn open_section(&mut self, id: u32, label: String) -> Result<()> {
        if self.has_label(&label) {
            return Err(Error::TitleConflict {
                id,
                label,
                reason: "duplicate label",
            });
        }
        let continues = id == 1 || self.last_id.is_some_and(|last| last.checked_add(1) == Some(id));
        if !continues {
            return Err(Error::TitleConflict {
                id,
                label,
                reason: "breaks numbering",
            });
        }

        self.sections.push(self.entries.len());
        self.entries.push(TitleEntry::Section(TitleNode::new(id, label)));
        self.last_id = Some(id);
        self.open_subsection = None;
        Ok(())
    }

    fn open_subsection(&mut self, parent: u32, label: String) {
        let Some(position) = (parent as usize).checked_sub(1) else {
            return;
        };
        let Some(node) = self.section_mut(position) else {
            log::debug!("Subsection '{}' has no section {}", label, parent);
            return;
        };
        if node.has_subsection(&label) {
            return;
        }
        node.subsections.push(Subsection::new(label));
        let index = node.subsections.len() - 1;
        self.open_subsection = Some((position, index));
    }

    fn add_table(&mut self, table: TableRef) {
        let Some(position) = self.sections.len().checked_sub(1) else {
            self.entries.push(TitleEntry::Table(table));
            return;
        };
        let open_subsection = self.open_subsection;
        let Some(node) = self.section_mut(position) else {
            return;
        };
        if let Some((sub_position, sub_index)) = open_subsection {
            if sub_position == position {
                if let Some(sub) = node.subsections.get_mut(sub_index) {
                    sub.tables.push(table.clone());
                }
            }
        }
        node.tables.push(table);
    }
}

impl TitleHierarchyBuilder {
    /// Compile the heading patterns.
    pub fn new(patterns: &TitlePatterns) -> Result<Self> {
        Ok(Self {
            chapter: Regex::new(&patterns.chapter)?,
            subsection: Regex::new(&patterns.subsection)?,
            bare_marker: Regex::new(&patterns.bare_marker)?,
            toc_leader: patterns.toc_leader.clone(),
        })
    }

    /// Build the section index for a store.
    pub fn build(&self, store: &RecordStore) -> TitleTree {
        let retained: Vec<&Record> = store.retained().collect();
        let mut state = TreeState::default();

        for (i, record) in retained.iter().enumerate() {
            if record.is_table() {
                state.add_table(TableRef {
                    sequence_id: record.sequence_id,
                    page: record.page,
                    caption: caption_for(&retained, i),
                });
                continue;
            }

            let text = record.content.trim();
            if let Some((id, label)) = self.match_chapter(text) {
                self.try_open(&mut state, id, label);
            } else if let Some((parent, label)) = self.match_subsection(text) {
                state.open_subsection(parent, label);
            } else if let Some(id) = self.match_bare_marker(text) {
                let Some(next) = retained[i + 1..].iter().find(|r| r.is_text()) else {
                    continue;
                };
                let next = next.content.trim();
                if next.contains(self.toc_leader.as_str()) {
                    log::debug!("Skipping table-of-contents entry §{} {}", id, next);
                    continue;
                }
                self.try_open(&mut state, id, format!("{}{}", id, next));
            }
        }

        TitleTree::new(state.entries)
    }

    fn try_open(&self, state: &mut TreeState, id: u32, label: String) {
        if let Err(e) = state.open_section(id, label) {
            log::debug!("{}", e);
        }
    }

    fn match_chapter(&self, text: &str) -> Option<(u32, String)> {
        let caps = self.chapter.captures(text)?;
        let number = caps.get(1)?.as_str();
        let heading = caps.get(2).map_or("", |m| m.as_str());
        Some((number.parse().ok()?, format!("{}{}", number, heading)))
    }

    fn match_subsection(&self, text: &str) -> Option<(u32, String)> {
        let caps = self.subsection.captures(text)?;
        let parent = caps.get(1)?.as_str().parse().ok()?;
        Some((parent, caps.get(0)?.as_str().to_string()))
    }

    fn match_bare_marker(&self, text: &str) -> Option<u32> {
        self.bare_marker.captures(text)?.get(1)?.as_str().parse().ok()
    }
}

/// Nearest preceding text line, unless another table comes first; falls
/// back to the table's first grid value.
fn caption_for(retained: &[&Record], index: usize) -> String {
    let preceding = retained[..index]
        .iter()
        .rev()
        .take_while(|r| !r.is_table())
        .find(|r| r.is_text())
        .map(|r| r.content.trim().to_string());

    preceding
        .or_else(|| retained[index].first_grid_value().map(str::to_string))
        .unwrap_or_default()
}
