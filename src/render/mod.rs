//! Rendering of extracted pages for inspection.

mod analysis;
mod json;

pub use analysis::{ImageSummary, PageAnalysis};
pub use json::{to_json, JsonFormat};
