//! Table geometry and grid types.

use serde::{Deserialize, Serialize};

/// A repaired table grid: rows of cell strings.
pub type Grid = Vec<Vec<String>>;

/// A raw grid as detected on the page; `None` marks a merged or missing cell.
pub type RawGrid = Vec<Vec<Option<String>>>;

/// An axis-aligned box in top-down page coordinates.
///
/// Serialized as `[left, top, right, bottom]`, the same order page dumps use
/// for table bounding boxes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct BoundingBox {
    /// Left edge (x0)
    pub left: f32,
    /// Top edge, distance from the top of the page
    pub top: f32,
    /// Right edge (x1)
    pub right: f32,
    /// Bottom edge, distance from the top of the page
    pub bottom: f32,
}

impl BoundingBox {
    /// Create a bounding box.
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Box width.
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    /// Box height.
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

impl From<[f32; 4]> for BoundingBox {
    fn from(v: [f32; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BoundingBox> for [f32; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.left, b.top, b.right, b.bottom]
    }
}

/// A detected table region and its raw cell grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRegion {
    /// Region bounds
    pub bbox: BoundingBox,

    /// Raw rows, top to bottom
    pub rows: RawGrid,
}

impl TableRegion {
    /// Create a table region.
    pub fn new(bbox: BoundingBox, rows: RawGrid) -> Self {
        Self { bbox, rows }
    }

    /// Build a region from plain strings; empty strings stay empty, not `None`.
    pub fn from_strings<S: Into<String>>(
        bbox: BoundingBox,
        rows: impl IntoIterator<Item = impl IntoIterator<Item = S>>,
    ) -> Self {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(|c| Some(c.into())).collect())
            .collect();
        Self { bbox, rows }
    }

    /// Number of raw rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_json_is_array() {
        let bbox = BoundingBox::new(10.0, 20.0, 110.0, 70.0);
        let json = serde_json::to_string(&bbox).unwrap();
        assert_eq!(json, "[10.0,20.0,110.0,70.0]");
        let back: BoundingBox = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bbox);
        assert_eq!(bbox.width(), 100.0);
        assert_eq!(bbox.height(), 50.0);
    }

    #[test]
    fn test_region_from_strings() {
        let region = TableRegion::from_strings(BoundingBox::default(), [["a", ""], ["b", "c"]]);
        assert_eq!(region.row_count(), 2);
        assert_eq!(region.rows[0][1], Some(String::new()));
    }
}
