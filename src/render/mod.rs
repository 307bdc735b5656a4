//! Rendering: page assembly, JSON output and record dumps.

mod assemble;
pub mod dump;
mod json;

pub use assemble::PageAssembler;
pub use dump::{load_records, load_records_with, save_records};
pub use json::{to_json, JsonFormat};
