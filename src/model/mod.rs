//! Document model types for extracted content.
//!
//! Records are the intermediate representation between page extraction and
//! output assembly. They live in an append-only [`RecordStore`] owned by a
//! [`DocumentIndex`], alongside the [`TitleTree`] built from them.

mod document;
mod output;
mod record;
mod table;
mod title;

pub use document::{ConversionStats, DocumentIndex, DocumentInfo};
pub use output::{ContentType, OutputItem};
pub use record::{Record, RecordKind, RecordStore};
pub use table::{BoundingBox, Grid, RawGrid, TableRegion};
pub use title::{Subsection, TableRef, TitleEntry, TitleNode, TitleTree};
