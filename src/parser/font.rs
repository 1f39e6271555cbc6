//! Font lookup, glyph metrics and text decoding for content streams.

use lopdf::{Dictionary, Document as LopdfDocument, Object};

use super::resolve_object;

/// Default glyph width in 1/1000 text space units when a font has no widths.
const DEFAULT_GLYPH_WIDTH: f32 = 500.0;
/// Ascent/descent in 1/1000 units when the font descriptor has none.
const DEFAULT_ASCENT: f32 = 800.0;
const DEFAULT_DESCENT: f32 = -200.0;

/// A font resource resolved from a resource dictionary.
#[derive(Debug, Clone)]
pub(crate) struct LoadedFont<'a> {
    pub dict: &'a Dictionary,
    /// BaseFont name (e.g. "Helvetica-Bold")
    pub base_font: String,
    pub metrics: FontMetrics,
}

/// Glyph metrics in 1/1000 text space units.
#[derive(Debug, Clone)]
pub(crate) struct FontMetrics {
    pub first_char: i64,
    pub widths: Vec<f32>,
    pub missing_width: f32,
    pub ascent: f32,
    pub descent: f32,
    /// Composite (Type0) fonts use two-byte codes
    pub two_byte: bool,
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self {
            first_char: 0,
            widths: Vec::new(),
            missing_width: DEFAULT_GLYPH_WIDTH,
            ascent: DEFAULT_ASCENT,
            descent: DEFAULT_DESCENT,
            two_byte: false,
        }
    }
}

impl FontMetrics {
    /// Width of a character code.
    pub fn width(&self, code: u32) -> f32 {
        let index = code as i64 - self.first_char;
        if index >= 0 {
            if let Some(w) = self.widths.get(index as usize) {
                return *w;
            }
        }
        self.missing_width
    }

    /// Split a shown string into character codes.
    pub fn codes(&self, bytes: &[u8]) -> Vec<u32> {
        if self.two_byte {
            bytes
                .chunks(2)
                .map(|c| match c {
                    [hi, lo] => u32::from(*hi) << 8 | u32::from(*lo),
                    [single] => u32::from(*single),
                    _ => 0,
                })
                .collect()
        } else {
            bytes.iter().map(|&b| u32::from(b)).collect()
        }
    }
}

impl<'a> LoadedFont<'a> {
    /// Resolve a font dictionary into base font name and metrics.
    pub fn load(doc: &'a LopdfDocument, dict: &'a Dictionary) -> Self {
        let base_font = dict
            .get(b"BaseFont")
            .ok()
            .and_then(|o| o.as_name().ok())
            .map(|n| String::from_utf8_lossy(n).to_string())
            .unwrap_or_else(|| "Unknown".to_string());

        let two_byte = dict
            .get(b"Subtype")
            .ok()
            .and_then(|o| o.as_name_str().ok())
            == Some("Type0");

        let mut metrics = FontMetrics {
            two_byte,
            ..FontMetrics::default()
        };

        if !two_byte {
            metrics.first_char = dict
                .get(b"FirstChar")
                .ok()
                .and_then(|o| o.as_i64().ok())
                .unwrap_or(0);
            if let Some(Object::Array(widths)) = dict
                .get(b"Widths")
                .ok()
                .map(|o| resolve_object(doc, o))
            {
                metrics.widths = widths
                    .iter()
                    .map(|w| get_number(resolve_object(doc, w)).unwrap_or(0.0))
                    .collect();
            }
        }

        let descriptor = font_descriptor(doc, dict);
        if let Some(desc) = descriptor {
            if let Some(ascent) = desc.get(b"Ascent").ok().and_then(get_number) {
                if ascent > 0.0 {
                    metrics.ascent = ascent;
                }
            }
            if let Some(descent) = desc.get(b"Descent").ok().and_then(get_number) {
                if descent < 0.0 {
                    metrics.descent = descent;
                }
            }
            if let Some(missing) = desc.get(b"MissingWidth").ok().and_then(get_number) {
                if missing > 0.0 {
                    metrics.missing_width = missing;
                }
            }
        }

        Self {
            dict,
            base_font,
            metrics,
        }
    }

    /// Decode shown bytes with the font's encoding.
    /// Falls back to simple decoding if the encoding is unavailable.
    pub fn decode(&self, doc: &LopdfDocument, bytes: &[u8]) -> String {
        if let Ok(enc) = self.dict.get_font_encoding(doc) {
            if let Ok(text) = LopdfDocument::decode_text(&enc, bytes) {
                return text;
            }
        }
        decode_text_simple(bytes)
    }
}

/// The font descriptor of a simple font, or of a Type0 font's descendant.
fn font_descriptor<'a>(doc: &'a LopdfDocument, dict: &'a Dictionary) -> Option<&'a Dictionary> {
    if let Ok(desc) = dict.get(b"FontDescriptor") {
        return resolve_object(doc, desc).as_dict().ok();
    }
    let descendants = dict.get(b"DescendantFonts").ok()?;
    let first = resolve_object(doc, descendants).as_array().ok()?.first()?;
    let descendant = resolve_object(doc, first).as_dict().ok()?;
    let desc = descendant.get(b"FontDescriptor").ok()?;
    resolve_object(doc, desc).as_dict().ok()
}

/// Extract a number from an integer or real object.
pub(crate) fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Simple text decoding fallback when no encoding is available.
pub(crate) fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}
