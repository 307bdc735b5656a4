//! Table extraction and grid repair.
//!
//! A page with detected table regions is cut into horizontal bands: text
//! above the first table, each table, text between tables, and text below
//! the last one. Raw table grids are normalized, continuation rows are
//! stitched into the row they continue, empty rows and columns are pruned,
//! and missing header/data cells are filled from their neighbours.

use crate::error::{Error, Result};
use crate::model::{Grid, RawGrid, TableRegion};

use super::backend::{PdfPage, Word};
use super::lines::{LineBounds, LineReconstructor};
use super::options::TableConfig;

/// One ordered piece of a page's content.
#[derive(Debug, Clone, PartialEq)]
pub enum PageSegment {
    /// A body text line
    Text(String),
    /// A repaired, non-empty table grid
    Table(Grid),
    /// A table row that did not fit the grid, as a text line
    Ragged(String),
}

/// Splits pages into text lines and repaired tables.
#[derive(Debug, Clone)]
pub struct TableExtractor {
    config: TableConfig,
}

impl TableExtractor {
    /// Create an extractor.
    pub fn new(config: TableConfig) -> Self {
        Self { config }
    }

    /// Extract the page's segments in top-to-bottom order.
    ///
    /// Fails only if the page's words or tables cannot be read.
    pub fn extract(&self, page: &dyn PdfPage, lines: &LineReconstructor) -> Result<Vec<PageSegment>> {
        let words = page.extract_words()?;
        let mut tables = page.find_tables()?;
        Ok(self.segment(page.number(), page.width(), page.height(), &words, &mut tables, lines))
    }

    fn segment(
        &self,
        page: u32,
        width: f32,
        height: f32,
        words: &[Word],
        tables: &mut [TableRegion],
        lines: &LineReconstructor,
    ) -> Vec<PageSegment> {
        let mut segments = Vec::new();
        let push_lines = |segments: &mut Vec<PageSegment>, bounds: LineBounds| {
            segments.extend(
                lines
                    .lines(words, width, height, bounds)
                    .into_iter()
                    .map(PageSegment::Text),
            );
        };

        if tables.is_empty() {
            push_lines(&mut segments, LineBounds::Page);
            return segments;
        }

        tables.sort_by(|a, b| a.bbox.top.total_cmp(&b.bbox.top));

        let mut consumed_bottom = 0.0f32;
        for table in tables.iter_mut() {
            if table.bbox.bottom < consumed_bottom {
                log::debug!(
                    "Page {}: skipping table at {:?}, overlaps previous table",
                    page,
                    table.bbox
                );
                continue;
            }

            push_lines(
                &mut segments,
                LineBounds::Between {
                    after: consumed_bottom,
                    before: table.bbox.top,
                },
            );
            consumed_bottom = table.bbox.bottom;

            let (grid, ragged) = self.repair(page, std::mem::take(&mut table.rows));
            if !grid.is_empty() {
                segments.push(PageSegment::Table(grid));
            }
            segments.extend(ragged.into_iter().map(PageSegment::Ragged));
        }

        push_lines(&mut segments, LineBounds::Below(consumed_bottom));
        segments
    }

    /// Run the full repair pipeline on a raw grid.
    ///
    /// Returns the repaired grid (possibly empty) and the ragged rows as
    /// text lines.
    pub fn repair(&self, page: u32, raw: RawGrid) -> (Grid, Vec<String>) {
        let (grid, ragged) = split_ragged(normalize_cells(raw));
        for (row, err) in &ragged {
            log::warn!("Page {}: {} (row kept as text)", page, err);
            log::trace!("Ragged row content: {:?}", row);
        }
        let ragged_text = ragged
            .into_iter()
            .map(|(row, _)| join_cells(&row))
            .filter(|line| !line.is_empty())
            .collect();

        let grid = if self.config.stitch_rows {
            stitch_rows(grid)
        } else {
            grid
        };
        let mut grid = drop_empty_columns(drop_empty_rows(grid));
        if self.config.repair_cells {
            repair_cells(&mut grid);
        }

        (grid, ragged_text)
    }
}

impl Default for TableExtractor {
    fn default() -> Self {
        Self::new(TableConfig::default())
    }
}

fn is_blank(cell: &str) -> bool {
    cell.trim().is_empty()
}

/// Replace missing cells with `""` and strip embedded line breaks.
pub fn normalize_cells(raw: RawGrid) -> Grid {
    raw.into_iter()
        .map(|row| {
            row.into_iter()
                .map(|cell| cell.map(|c| c.replace(['\n', '\r'], "")).unwrap_or_default())
                .collect()
        })
        .collect()
}

/// Separate rows whose width differs from the first row's.
pub fn split_ragged(grid: Grid) -> (Grid, Vec<(Vec<String>, Error)>) {
    let Some(expected) = grid.first().map(Vec::len) else {
        return (grid, Vec::new());
    };

    let mut kept = Vec::with_capacity(grid.len());
    let mut ragged = Vec::new();
    for (index, row) in grid.into_iter().enumerate() {
        if row.len() == expected {
            kept.push(row);
        } else {
            let err = Error::TableStitch {
                row: index,
                columns: row.len(),
                expected,
            };
            ragged.push((row, err));
        }
    }
    (kept, ragged)
}

/// Merge continuation rows into the row they continue.
///
/// A data row whose first cell is empty continues the nearest data row above
/// it that has a first cell; its non-empty cells are appended to that row's
/// cells. The header is never an anchor, and a continuation with no anchor
/// is kept as-is.
pub fn stitch_rows(grid: Grid) -> Grid {
    let mut out: Grid = Vec::with_capacity(grid.len());
    let mut anchor: Option<usize> = None;

    for (index, row) in grid.into_iter().enumerate() {
        if index == 0 {
            out.push(row);
            continue;
        }

        let continuation = row.first().map_or(true, |c| is_blank(c));
        if !continuation {
            anchor = Some(out.len());
            out.push(row);
            continue;
        }

        match anchor {
            Some(a) => {
                let target = &mut out[a];
                for (col, cell) in row.into_iter().enumerate() {
                    if is_blank(&cell) {
                        continue;
                    }
                    match target.get_mut(col) {
                        Some(existing) => existing.push_str(&cell),
                        None => target.push(cell),
                    }
                }
            }
            None => out.push(row),
        }
    }

    out
}

/// Drop rows whose cells are all empty.
pub fn drop_empty_rows(grid: Grid) -> Grid {
    grid.into_iter()
        .filter(|row| row.iter().any(|c| !is_blank(c)))
        .collect()
}

/// Drop columns that are empty in every row.
pub fn drop_empty_columns(grid: Grid) -> Grid {
    let width = grid.iter().map(Vec::len).max().unwrap_or(0);
    let keep: Vec<bool> = (0..width)
        .map(|col| {
            grid.iter()
                .any(|row| row.get(col).is_some_and(|c| !is_blank(c)))
        })
        .collect();

    if keep.iter().all(|&k| k) {
        return grid;
    }

    grid.into_iter()
        .map(|row| {
            row.into_iter()
                .enumerate()
                .filter(|(col, _)| keep[*col])
                .map(|(_, cell)| cell)
                .collect()
        })
        .collect()
}

/// Fill empty header and data cells in place.
///
/// An empty header cell takes `left + right` in the middle, or its single
/// neighbour at an edge. An empty data cell past the first column copies the
/// cell to its left. Both passes run left to right, so filled cells feed the
/// next ones.
pub fn repair_cells(grid: &mut Grid) {
    let Some(header) = grid.first_mut() else {
        return;
    };

    let n = header.len();
    if n > 1 {
        for i in 0..n {
            if !is_blank(&header[i]) {
                continue;
            }
            header[i] = if i == 0 {
                header[1].clone()
            } else if i == n - 1 {
                header[i - 1].clone()
            } else {
                format!("{}{}", header[i - 1], header[i + 1])
            };
        }
    }

    for row in grid.iter_mut().skip(1) {
        for j in 1..row.len() {
            if is_blank(&row[j]) {
                row[j] = row[j - 1].clone();
            }
        }
    }
}

/// Render a grid as pipe markup with a separator after the header row.
pub fn render_markup(grid: &Grid) -> String {
    let mut output = String::new();
    for (i, row) in grid.iter().enumerate() {
        if i > 0 {
            output.push('\n');
        }
        output.push('|');
        for cell in row {
            output.push_str(&format!(" {} |", escape_pipe(cell.trim())));
        }

        if i == 0 {
            output.push_str("\n|");
            for _ in row {
                output.push_str(" --- |");
            }
        }
    }
    output
}

fn escape_pipe(text: &str) -> String {
    text.replace('|', "\\|")
}

fn join_cells(row: &[String]) -> String {
    row.iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
