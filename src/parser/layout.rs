//! Grouping of extracted spans into lines and blocks.
//!
//! Spans arrive in content-stream order. Consecutive spans on the same
//! baseline form a line; a block ends at every new text object (`BT`) or
//! where the vertical gap to the next line is large relative to the line
//! height.

use crate::model::{Block, Line, Span};

/// Baselines closer than this fraction of the font size share a line.
const BASELINE_TOLERANCE: f32 = 0.3;
/// Gaps larger than this multiple of the previous line height start a block.
const BLOCK_GAP_RATIO: f32 = 1.5;

/// A span tagged with the text object it was shown in.
#[derive(Debug, Clone)]
pub(crate) struct RawSpan {
    pub span: Span,
    pub segment: usize,
}

/// Group spans into blocks of lines, preserving order.
pub(crate) fn group_into_blocks(spans: Vec<RawSpan>) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut lines: Vec<Line> = Vec::new();
    let mut current: Vec<Span> = Vec::new();
    let mut segment = None;

    for raw in spans {
        let new_segment = segment != Some(raw.segment);
        let same_line = !new_segment
            && current
                .last()
                .is_some_and(|prev| on_same_baseline(prev, &raw.span));

        if !same_line {
            if let Some(line) = Line::from_spans(std::mem::take(&mut current)) {
                lines.push(line);
            }
            let gap_break = lines
                .last()
                .is_some_and(|prev| should_break_block(prev, &raw.span));
            if new_segment || gap_break {
                if let Some(block) = Block::from_lines(std::mem::take(&mut lines)) {
                    blocks.push(block);
                }
            }
        }

        segment = Some(raw.segment);
        current.push(raw.span);
    }

    if let Some(line) = Line::from_spans(current) {
        lines.push(line);
    }
    if let Some(block) = Block::from_lines(lines) {
        blocks.push(block);
    }
    blocks
}

fn on_same_baseline(prev: &Span, next: &Span) -> bool {
    let tolerance = prev.size.max(next.size) * BASELINE_TOLERANCE;
    (prev.origin.y - next.origin.y).abs() <= tolerance
}

/// Determine if the span starting a new line also starts a new block.
fn should_break_block(prev_line: &Line, next: &Span) -> bool {
    let prev = &prev_line.bbox;
    let gap = if next.bbox.y0 >= prev.y1 {
        next.bbox.y0 - prev.y1
    } else if next.bbox.y1 <= prev.y0 {
        prev.y0 - next.bbox.y1
    } else {
        0.0
    };
    gap > prev.height() * BLOCK_GAP_RATIO
}
