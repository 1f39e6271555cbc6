//! Mapping source font and color metadata onto the output font set.
//!
//! Output pages use the standard Helvetica family and two colors. Any source
//! font is classified by name into one of three faces; any color other than
//! the dark-blue accent becomes black.

use serde::{Deserialize, Serialize};

use crate::model::Span;

/// The accent color recognized in source pages (0x00008B).
pub const DARK_BLUE_SENTINEL: u32 = 139;

/// Output font face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontClass {
    Regular,
    Bold,
    Oblique,
}

impl FontClass {
    /// Standard Type1 font drawn for this face.
    pub fn base_font(self) -> &'static str {
        match self {
            FontClass::Regular => "Helvetica",
            FontClass::Bold => "Helvetica-Bold",
            FontClass::Oblique => "Helvetica-Oblique",
        }
    }

    /// Font resource name on the output page.
    pub(crate) fn resource_name(self) -> &'static str {
        match self {
            FontClass::Regular => "F1",
            FontClass::Bold => "F2",
            FontClass::Oblique => "F3",
        }
    }
}

/// Classify a font descriptor. "Bold" wins over "Oblique".
pub fn classify_font(descriptor: &str) -> FontClass {
    if descriptor.contains("Bold") {
        FontClass::Bold
    } else if descriptor.contains("Oblique") {
        FontClass::Oblique
    } else {
        FontClass::Regular
    }
}

/// An RGB fill color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    pub const DARK_BLUE: Rgb = Rgb {
        r: 0.0,
        g: 0.0,
        b: 139.0 / 255.0,
    };
}

/// Map a source color to an output color.
pub fn resolve_color(color: u32) -> Rgb {
    if color == DARK_BLUE_SENTINEL {
        Rgb::DARK_BLUE
    } else {
        Rgb::BLACK
    }
}

/// Whether the output font is the one the source named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fidelity {
    Exact,
    Approximate,
}

/// Font and color a span is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedStyle {
    pub font: FontClass,
    pub color: Rgb,
    pub fidelity: Fidelity,
}

/// Resolve the output style of a span.
pub fn resolve_style(span: &Span) -> ResolvedStyle {
    let font = classify_font(&span.font);
    let fidelity = if strip_subset_prefix(&span.font) == font.base_font() {
        Fidelity::Exact
    } else {
        log::debug!(
            "Font {:?} approximated as {}",
            span.font,
            font.base_font()
        );
        Fidelity::Approximate
    };

    ResolvedStyle {
        font,
        color: resolve_color(span.color),
        fidelity,
    }
}

/// Drop a subset tag such as `ABCDEF+` from a font name.
fn strip_subset_prefix(name: &str) -> &str {
    match name.split_once('+') {
        Some((tag, rest)) if tag.len() == 6 && tag.bytes().all(|b| b.is_ascii_uppercase()) => rest,
        _ => name,
    }
}
