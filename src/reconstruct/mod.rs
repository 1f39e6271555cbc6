//! Page reconstruction.
//!
//! A run extracts one source page, substitutes text span by span, draws each
//! span at its original position with the resolved output style, replays the
//! page's images at every rectangle they occupied, and writes the result as
//! a new single-page PDF.
//!
//! # Example
//!
//! ```no_run
//! use repdf::edit::{CompanionDocument, LabelRecognizer};
//! use repdf::reconstruct::{ReconstructOptions, Reconstructor};
//!
//! let companion = CompanionDocument::open("modified.docx")?;
//! let recognizer = LabelRecognizer::new()?;
//! let options = ReconstructOptions::new().with_output("out/final.pdf");
//! let report = Reconstructor::new(options).run("sample.pdf", &companion, &recognizer)?;
//! println!("{} spans modified", report.spans_modified);
//! # Ok::<(), repdf::Error>(())
//! ```

mod encoding;
mod images;
mod output;

pub use images::{extract_images_to_folder, DrawnImage};
pub(crate) use images::group_placements;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use lopdf::Document as LopdfDocument;
use serde::{Deserialize, Serialize};

use crate::edit::{build_modification_map, CompanionDocument, EditRecognizer};
use crate::error::{Error, Result};
use crate::model::{BBox, ModificationMap, Page, Point};
use crate::parser::{ExtractOptions, SourceDocument};
use crate::resolve::{resolve_style, Fidelity, ResolvedStyle};
use output::OutputPage;

/// Where output is written unless overridden.
pub const DEFAULT_OUTPUT_PATH: &str = "output/reconstructed.pdf";

/// Which point of a span its replacement text is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextAnchor {
    /// The top-left corner of the original bounding box
    #[default]
    TopLeft,
    /// The original baseline origin
    Baseline,
}

/// Options for a reconstruction run.
#[derive(Debug, Clone)]
pub struct ReconstructOptions {
    /// Output file path
    pub output: PathBuf,

    pub anchor: TextAnchor,

    /// Compress the output content stream
    pub compress: bool,

    /// Options for extracting the source page
    pub extract: ExtractOptions,
}

impl ReconstructOptions {
    /// Create new reconstruct options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output path.
    pub fn with_output<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output = path.into();
        self
    }

    pub fn with_anchor(mut self, anchor: TextAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Select the source page (1-indexed).
    pub fn with_page(mut self, page: u32) -> Self {
        self.extract.page = page;
        self
    }

    pub fn with_extract_options(mut self, extract: ExtractOptions) -> Self {
        self.extract = extract;
        self
    }
}

impl Default for ReconstructOptions {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_OUTPUT_PATH),
            anchor: TextAnchor::TopLeft,
            compress: true,
            extract: ExtractOptions::default(),
        }
    }
}

/// Progress of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Extracting,
    Substituting,
    DrawingText,
    DrawingImages,
    Persisted,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Extracting => "extracting",
            Stage::Substituting => "substituting",
            Stage::DrawingText => "drawing text",
            Stage::DrawingImages => "drawing images",
            Stage::Persisted => "persisted",
        };
        f.write_str(name)
    }
}

/// One text draw on the output page.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnText {
    /// Span text as extracted
    pub source: String,
    /// Text drawn after substitution
    pub text: String,
    /// Source bounding box, unchanged
    pub bbox: BBox,
    /// Drawn baseline start, top-left based
    pub origin: Point,
    pub size: f32,
    pub style: ResolvedStyle,
}

impl DrawnText {
    pub fn is_modified(&self) -> bool {
        self.source != self.text
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct ReconstructReport {
    pub page: u32,
    pub width: f32,
    pub height: f32,
    pub spans_drawn: usize,
    pub spans_modified: usize,
    /// Whitespace-only spans, not drawn
    pub spans_skipped: usize,
    /// Spans whose font was not reproduced exactly
    pub fonts_approximated: usize,
    /// Distinct images copied
    pub image_references: usize,
    pub image_draws: usize,
    pub texts: Vec<DrawnText>,
    pub images: Vec<DrawnImage>,
    /// Written file; `None` for in-memory runs
    pub output: Option<PathBuf>,
}

/// Text draws planned for a page.
struct TextPlan {
    texts: Vec<DrawnText>,
    skipped: usize,
}

fn plan_text(page: &Page, map: &ModificationMap, anchor: TextAnchor) -> TextPlan {
    let mut texts = Vec::new();
    let mut skipped = 0;

    for span in page.spans() {
        if span.is_blank() {
            skipped += 1;
            continue;
        }
        let text = map.apply(&span.text).into_owned();
        let origin = match anchor {
            TextAnchor::TopLeft => span.bbox.top_left(),
            TextAnchor::Baseline => span.origin,
        };
        if text != span.text {
            log::debug!("Modified span {:?} -> {:?}", span.text, text);
        }
        texts.push(DrawnText {
            source: span.text.clone(),
            text,
            bbox: span.bbox,
            origin,
            size: span.size,
            style: resolve_style(span),
        });
    }

    TextPlan { texts, skipped }
}

/// Drives one reconstruction at a time.
#[derive(Debug)]
pub struct Reconstructor {
    options: ReconstructOptions,
    stage: Stage,
}

impl Reconstructor {
    pub fn new(options: ReconstructOptions) -> Self {
        Self {
            options,
            stage: Stage::Idle,
        }
    }

    pub fn options(&self) -> &ReconstructOptions {
        &self.options
    }

    /// Current stage; `Idle` between runs.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Derive the modification map from `companion` and reconstruct.
    pub fn run<P: AsRef<Path>>(
        &mut self,
        source: P,
        companion: &CompanionDocument,
        recognizer: &dyn EditRecognizer,
    ) -> Result<ReconstructReport> {
        let map = build_modification_map(companion, recognizer)?;
        self.run_with_map(source, &map)
    }

    /// Reconstruct the source page with `map` and write the output file.
    pub fn run_with_map<P: AsRef<Path>>(
        &mut self,
        source: P,
        map: &ModificationMap,
    ) -> Result<ReconstructReport> {
        let result = self.run_to_file(source.as_ref(), map);
        self.enter(Stage::Idle);
        result
    }

    /// Reconstruct a PDF held in memory and return the output bytes.
    pub fn run_bytes(
        &mut self,
        source: &[u8],
        map: &ModificationMap,
    ) -> Result<(Vec<u8>, ReconstructReport)> {
        let result = self.run_to_bytes(source, map);
        self.enter(Stage::Idle);
        result
    }

    fn run_to_file(&mut self, path: &Path, map: &ModificationMap) -> Result<ReconstructReport> {
        let source = SourceDocument::open(path).map_err(|e| {
            Error::Reconstruction(format!("opening source {}: {}", path.display(), e))
        })?;
        let (mut doc, mut report) = self.build(&source, map)?;

        let output = self.options.output.clone();
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Reconstruction(format!("creating {}: {}", parent.display(), e))
            })?;
        }
        doc.save(&output).map_err(|e| {
            Error::Reconstruction(format!("writing output {}: {}", output.display(), e))
        })?;
        self.enter(Stage::Persisted);

        report.output = Some(output);
        Ok(report)
    }

    fn run_to_bytes(
        &mut self,
        data: &[u8],
        map: &ModificationMap,
    ) -> Result<(Vec<u8>, ReconstructReport)> {
        let source = SourceDocument::from_bytes(data)
            .map_err(|e| Error::Reconstruction(format!("opening source: {}", e)))?;
        let (mut doc, report) = self.build(&source, map)?;

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|e| Error::Reconstruction(format!("writing output: {}", e)))?;
        self.enter(Stage::Persisted);
        Ok((buffer, report))
    }

    fn build(
        &mut self,
        source: &SourceDocument,
        map: &ModificationMap,
    ) -> Result<(LopdfDocument, ReconstructReport)> {
        self.enter(Stage::Extracting);
        let page = source.extract_page(&self.options.extract)?;

        self.enter(Stage::Substituting);
        let plan = plan_text(&page, map, self.options.anchor);

        self.enter(Stage::DrawingText);
        let mut output = OutputPage::new(page.width, page.height);
        for text in &plan.texts {
            output.draw_text(&text.text, text.origin.x, text.origin.y, text.size, &text.style);
        }

        self.enter(Stage::DrawingImages);
        let (image_references, images) = images::copy_images(source, &page.images, &mut output)?;
        let doc = output.finish(self.options.compress)?;

        let report = ReconstructReport {
            page: page.number,
            width: page.width,
            height: page.height,
            spans_drawn: plan.texts.len(),
            spans_modified: plan.texts.iter().filter(|t| t.is_modified()).count(),
            spans_skipped: plan.skipped,
            fonts_approximated: plan
                .texts
                .iter()
                .filter(|t| t.style.fidelity == Fidelity::Approximate)
                .count(),
            image_references,
            image_draws: images.len(),
            texts: plan.texts,
            images,
            output: None,
        };
        log::info!(
            "Drew {} spans ({} modified) and {} images from {} references",
            report.spans_drawn,
            report.spans_modified,
            report.image_draws,
            report.image_references
        );
        Ok((doc, report))
    }

    fn enter(&mut self, stage: Stage) {
        if self.stage != stage {
            log::info!("Reconstruction: {} -> {}", self.stage, stage);
            self.stage = stage;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Block, Line, Span};

    fn span(text: &str, font: &str, color: u32) -> Span {
        Span {
            text: text.to_string(),
            bbox: BBox::new(50.0, 50.0, 200.0, 70.0),
            origin: Point::new(50.0, 66.0),
            font: font.to_string(),
            size: 14.0,
            color,
        }
    }

    fn page_with(spans: Vec<Span>) -> Page {
        let mut page = Page::new(1, 612.0, 792.0);
        let line = Line::from_spans(spans).unwrap();
        page.blocks.push(Block::from_lines(vec![line]).unwrap());
        page
    }

    #[test]
    fn test_plan_substitutes_and_anchors_top_left() {
        let page = page_with(vec![
            span("123 Sample Street, Example City, EX 12345", "Helvetica", 0),
            span("   ", "Helvetica", 0),
        ]);
        let map: ModificationMap = [("123 Sample Street, Example City, EX 12345", "42 New Ave")]
            .into_iter()
            .collect();

        let plan = plan_text(&page, &map, TextAnchor::TopLeft);
        assert_eq!(plan.skipped, 1);
        assert_eq!(plan.texts.len(), 1);
        let drawn = &plan.texts[0];
        assert_eq!(drawn.text, "42 New Ave");
        assert_eq!(drawn.origin, Point::new(50.0, 50.0));
        assert_eq!(drawn.bbox, BBox::new(50.0, 50.0, 200.0, 70.0));
        assert_eq!(drawn.size, 14.0);
        assert!(drawn.is_modified());
    }

    #[test]
    fn test_plan_baseline_anchor() {
        let page = page_with(vec![span("x", "Helvetica-Bold", 139)]);
        let plan = plan_text(&page, &ModificationMap::new(), TextAnchor::Baseline);
        assert_eq!(plan.texts[0].origin, Point::new(50.0, 66.0));
        assert!(!plan.texts[0].is_modified());
    }

    #[test]
    fn test_options_defaults() {
        let options = ReconstructOptions::default();
        assert_eq!(options.output, PathBuf::from(DEFAULT_OUTPUT_PATH));
        assert_eq!(options.anchor, TextAnchor::TopLeft);
        assert!(options.compress);
        assert_eq!(options.extract.page, 1);

        let options = ReconstructOptions::new().with_page(3).with_compression(false);
        assert_eq!(options.extract.page, 3);
        assert!(!options.compress);
    }

    #[test]
    fn test_unopenable_source_is_reconstruction_error() {
        let mut reconstructor = Reconstructor::new(ReconstructOptions::default());
        let result = reconstructor.run_with_map("/nonexistent/source.pdf", &ModificationMap::new());
        assert!(matches!(result, Err(Error::Reconstruction(_))));
        assert_eq!(reconstructor.stage(), Stage::Idle);
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::DrawingImages.to_string(), "drawing images");
    }
}
