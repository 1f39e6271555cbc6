//! # repdf
//!
//! Layout-preserving PDF page reconstruction with text substitution.
//!
//! A source page is parsed into blocks, lines and spans (each span carrying
//! its bounding box, font, size and color) plus the rectangles its images
//! are drawn at. Edits recovered from a companion document (DOCX or plain
//! text) are applied to span text, and a new single-page PDF is emitted with
//! every span and image at its original coordinates.
//!
//! ## Quick Start
//!
//! ```no_run
//! use repdf::{build_modifications, reconstruct_to};
//!
//! fn main() -> repdf::Result<()> {
//!     let map = build_modifications("output/modified.docx")?;
//!     let report = reconstruct_to("samples/sample.pdf", &map, "output/reconstructed.pdf")?;
//!     println!("{} of {} spans modified", report.spans_modified, report.spans_drawn);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Structural extraction**: span geometry, font and color from the content stream
//! - **Pluggable edit recognition**: label-based by default, rules loadable from JSON
//! - **Exact placement**: text anchored at the source top-left corner
//! - **Image replay**: each image copied once, drawn at every source rectangle

pub mod detect;
pub mod edit;
pub mod error;
pub mod model;
pub mod parser;
pub mod reconstruct;
pub mod render;
pub mod resolve;

// Re-export commonly used types
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_pdf, InputFormat};
pub use edit::{CompanionDocument, EditRecognizer, LabelRecognizer, RecognizerRules};
pub use error::{Error, Result};
pub use model::{BBox, Block, ImagePlacement, Line, ModificationMap, Page, Point, Span};
pub use parser::{ErrorMode, ExtractOptions, SourceDocument};
pub use reconstruct::{ReconstructOptions, ReconstructReport, Reconstructor, TextAnchor};
pub use render::JsonFormat;

use std::path::Path;

/// Extract the first page of a PDF file.
///
/// # Example
///
/// ```no_run
/// let page = repdf::extract_page("sample.pdf").unwrap();
/// for span in page.spans() {
///     println!("{:?} at {:?}", span.text, span.bbox);
/// }
/// ```
pub fn extract_page<P: AsRef<Path>>(path: P) -> Result<Page> {
    extract_page_with_options(path, &ExtractOptions::default())
}

/// Extract a page of a PDF file with custom options.
pub fn extract_page_with_options<P: AsRef<Path>>(path: P, options: &ExtractOptions) -> Result<Page> {
    SourceDocument::open(path)?.extract_page(options)
}

/// Derive a modification map from a companion document with the default
/// label rules.
pub fn build_modifications<P: AsRef<Path>>(companion: P) -> Result<ModificationMap> {
    let companion = CompanionDocument::open(companion)?;
    let recognizer = LabelRecognizer::new()?;
    edit::build_modification_map(&companion, &recognizer)
}

/// Reconstruct the first page of `source` to the default output path.
pub fn reconstruct<P: AsRef<Path>>(source: P, map: &ModificationMap) -> Result<ReconstructReport> {
    Reconstructor::new(ReconstructOptions::default()).run_with_map(source, map)
}

/// Reconstruct the first page of `source` to `output`.
pub fn reconstruct_to<P: AsRef<Path>, Q: AsRef<Path>>(
    source: P,
    map: &ModificationMap,
    output: Q,
) -> Result<ReconstructReport> {
    let options = ReconstructOptions::new().with_output(output.as_ref());
    Reconstructor::new(options).run_with_map(source, map)
}

/// Get the version of the library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
