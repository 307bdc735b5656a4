//! Record dumps in JSON Lines.
//!
//! Each line is `{"page": 3, "allrow": 41, "type": "excel", "inside": "..."}`.
//! Text records carry their line in `inside`; table records carry the grid as
//! a list-of-lists literal. Dumps let a document be re-assembled (or its
//! section index rebuilt with other patterns) without extracting it again.
//!
//! Older dumps wrote one `excel` line per table row; consecutive single-row
//! lines on the same page are merged back into one table when loading.

use std::io::{BufRead, Write};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::literal::{self, Literal};
use crate::model::{DocumentIndex, Grid, RecordKind, RecordStore};
use crate::parser::{render_markup, TitleHierarchyBuilder, TitlePatterns};

#[derive(Debug, Serialize, Deserialize)]
struct DumpLine {
    page: u32,
    allrow: u64,
    #[serde(rename = "type")]
    kind: String,
    inside: String,
}

/// Write every record, headers and footers included, as JSON Lines.
pub fn save_records<W: Write>(index: &DocumentIndex, mut writer: W) -> Result<()> {
    for record in index.records.iter() {
        let inside = match &record.grid {
            Some(grid) if record.is_table() => literal::grid_literal(grid),
            _ => record.content.clone(),
        };
        let line = DumpLine {
            page: record.page,
            allrow: record.sequence_id,
            kind: record.kind.dump_tag().to_string(),
            inside,
        };
        serde_json::to_writer(&mut writer, &line)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Rebuild a document index from a dump, using the default title patterns.
pub fn load_records<R: BufRead>(reader: R) -> Result<DocumentIndex> {
    load_records_with(reader, &TitlePatterns::default())
}

/// Rebuild a document index from a dump with custom title patterns.
///
/// Sequence ids are reassigned in file order.
pub fn load_records_with<R: BufRead>(reader: R, patterns: &TitlePatterns) -> Result<DocumentIndex> {
    let mut store = RecordStore::new();
    // legacy row-per-line table being collected: (page, rows)
    let mut pending: Option<(u32, Grid)> = None;

    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let entry: DumpLine = serde_json::from_str(&line)?;
        let kind = RecordKind::from_dump_tag(&entry.kind).ok_or_else(|| Error::Dump {
            line: number + 1,
            message: format!("unknown record type '{}'", entry.kind),
        })?;

        if kind != RecordKind::Table {
            flush_table(&mut store, &mut pending);
            store.push_kind(entry.page, kind, entry.inside, None);
            continue;
        }

        match literal::parse_literal(&entry.inside)? {
            Literal::List(items) if items.iter().all(|i| matches!(i, Literal::List(_))) => {
                flush_table(&mut store, &mut pending);
                let grid = literal::parse_grid(&entry.inside)?;
                push_table(&mut store, entry.page, grid);
            }
            Literal::List(_) => {
                let row = literal::parse_row(&entry.inside)?;
                match &mut pending {
                    Some((page, rows)) if *page == entry.page => rows.push(row),
                    _ => {
                        flush_table(&mut store, &mut pending);
                        pending = Some((entry.page, vec![row]));
                    }
                }
            }
            _ => return Err(literal::LiteralError::Shape("a row or grid literal").into()),
        }
    }
    flush_table(&mut store, &mut pending);

    let titles = TitleHierarchyBuilder::new(patterns)?.build(&store);
    log::debug!("Loaded {} records from dump", store.len());
    Ok(DocumentIndex {
        records: store,
        titles,
    })
}

fn flush_table(store: &mut RecordStore, pending: &mut Option<(u32, Grid)>) {
    if let Some((page, grid)) = pending.take() {
        push_table(store, page, grid);
    }
}

fn push_table(store: &mut RecordStore, page: u32, grid: Grid) {
    let markup = render_markup(&grid);
    store.push_kind(page, RecordKind::Table, markup, Some(grid));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> DocumentIndex {
        let mut index = DocumentIndex::new();
        let header = index.records.push_text(1, "某公司2023年年度报告");
        index.records.reclassify(header, RecordKind::Header);
        index.records.push_text(1, "§1重要提示");
        let grid = vec![
            vec!["项目".to_string(), "说明".to_string()],
            vec!["董事会".to_string(), "保证'真实'".to_string()],
        ];
        let markup = render_markup(&grid);
        index.records.push_table(1, grid, markup);
        index
    }

    #[test]
    fn test_dump_lines() {
        let mut out = Vec::new();
        save_records(&sample_index(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["type"], "header");
        assert_eq!(first["allrow"], 0);

        let table: serde_json::Value = serde_json::from_str(lines[2]).unwrap();
        assert_eq!(table["type"], "excel");
        assert_eq!(
            table["inside"],
            r"[['项目', '说明'], ['董事会', '保证\'真实\'']]"
        );
    }

    #[test]
    fn test_reload_rebuilds_titles() {
        let mut out = Vec::new();
        save_records(&sample_index(), &mut out).unwrap();
        let index = load_records(out.as_slice()).unwrap();

        assert_eq!(index.records.len(), 3);
        assert_eq!(index.records.get(0).unwrap().kind, RecordKind::Header);
        let table = index.records.get(2).unwrap();
        assert_eq!(table.grid.as_ref().unwrap()[1][1], "保证'真实'");
        assert_eq!(index.titles.section_count(), 1);
        assert_eq!(
            index.titles.section("1重要提示").unwrap().tables[0].caption,
            "§1重要提示"
        );
    }

    #[test]
    fn test_row_per_line_tables_are_merged() {
        let dump = concat!(
            r#"{"page": 2, "allrow": 0, "type": "text", "inside": "主要会计数据"}"#,
            "\n",
            r#"{"page": 2, "allrow": 1, "type": "excel", "inside": "['项目', '金额']"}"#,
            "\n",
            r#"{"page": 2, "allrow": 2, "type": "excel", "inside": "['收入', None]"}"#,
            "\n\n",
            r#"{"page": 3, "allrow": 3, "type": "excel", "inside": "['新表']"}"#,
            "\n",
        );
        let index = load_records(dump.as_bytes()).unwrap();
        assert_eq!(index.records.len(), 3);
        let grid = index.records.get(1).unwrap().grid.clone().unwrap();
        assert_eq!(grid, vec![vec!["项目", "金额"], vec!["收入", ""]]);
        assert_eq!(index.records.get(2).unwrap().page, 3);
    }

    #[test]
    fn test_legacy_boundary_tags() {
        let dump = concat!(
            r#"{"page": 1, "allrow": 0, "type": "text", "inside": "§1释义"}"#,
            "\n",
            r#"{"page": 1, "allrow": 1, "type": "页眉", "inside": "某公司2023年年度报告"}"#,
            "\n",
            r#"{"page": 1, "allrow": 2, "type": "页脚", "inside": "1"}"#,
            "\n",
        );
        let index = load_records(dump.as_bytes()).unwrap();
        let kinds: Vec<RecordKind> = index.records.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![RecordKind::Text, RecordKind::Header, RecordKind::Footer]);
        assert_eq!(index.titles.section_count(), 1);

        // saved again with the current tags
        let mut out = Vec::new();
        save_records(&index, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(r#""type":"header""#));
        assert!(text.contains(r#""type":"footer""#));
    }

    #[test]
    fn test_bad_dump_lines() {
        let unknown = r#"{"page": 1, "allrow": 0, "type": "image", "inside": ""}"#;
        assert!(matches!(
            load_records(unknown.as_bytes()),
            Err(Error::Dump { line: 1, .. })
        ));

        let malformed = r#"{"page": 1, "allrow": 0, "type": "excel", "inside": "['a'"}"#;
        assert!(matches!(load_records(malformed.as_bytes()), Err(Error::Literal(_))));

        assert!(matches!(load_records("not json".as_bytes()), Err(Error::Json(_))));
    }
}
