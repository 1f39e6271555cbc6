//! Page-level types: the block/line/span hierarchy.

use super::{BBox, ImagePlacement, Point};
use serde::{Deserialize, Serialize};

/// A single extracted page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Page number (1-indexed)
    pub number: u32,

    /// Page width in points (1 point = 1/72 inch)
    pub width: f32,

    /// Page height in points
    pub height: f32,

    /// Lower-left corner of the MediaBox in PDF user space
    #[serde(default)]
    pub media_origin: Point,

    /// Text blocks in content-stream order
    pub blocks: Vec<Block>,

    /// Every drawn occurrence of an image, in content-stream order
    pub images: Vec<ImagePlacement>,
}

impl Page {
    /// Create an empty page with the given dimensions.
    pub fn new(number: u32, width: f32, height: f32) -> Self {
        Self {
            number,
            width,
            height,
            media_origin: Point::default(),
            blocks: Vec::new(),
            images: Vec::new(),
        }
    }

    /// Iterate over all spans in block, line, span order.
    pub fn spans(&self) -> impl Iterator<Item = &Span> {
        self.blocks
            .iter()
            .flat_map(|b| b.lines.iter())
            .flat_map(|l| l.spans.iter())
    }

    /// Number of spans on the page.
    pub fn span_count(&self) -> usize {
        self.spans().count()
    }

    /// Plain text of the page, one line per extracted line.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(|b| b.text())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Get page dimensions as (width, height) tuple.
    pub fn dimensions(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// Check if the page has neither text nor images.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty() && self.images.is_empty()
    }
}

/// A text block: lines that belong together on the page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    /// Union of the line boxes
    pub bbox: BBox,
    pub lines: Vec<Line>,
}

impl Block {
    /// Build a block from lines. Returns `None` when `lines` is empty.
    pub fn from_lines(lines: Vec<Line>) -> Option<Self> {
        let bbox = BBox::union_all(lines.iter().map(|l| &l.bbox))?;
        Some(Self { bbox, lines })
    }

    /// Text of the block, lines joined by newlines.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A line of spans sharing a baseline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Line {
    /// Union of the span boxes
    pub bbox: BBox,
    pub spans: Vec<Span>,
}

impl Line {
    /// Build a line from spans. Returns `None` when `spans` is empty.
    pub fn from_spans(spans: Vec<Span>) -> Option<Self> {
        let bbox = BBox::union_all(spans.iter().map(|s| &s.bbox))?;
        Some(Self { bbox, spans })
    }

    /// Concatenated span text.
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

/// Smallest run of text with uniform font, size and color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// Decoded text
    pub text: String,

    /// Bounding box as extracted
    pub bbox: BBox,

    /// Baseline start point as extracted
    pub origin: Point,

    /// Font descriptor, the font's BaseFont (e.g. "Helvetica-Bold")
    pub font: String,

    /// Effective font size in points
    pub size: f32,

    /// Fill color as an sRGB integer 0xRRGGBB
    pub color: u32,
}

impl Span {
    /// Check if the span has only whitespace.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}
