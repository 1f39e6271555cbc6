//! JSON export of extracted pages.

use serde::Serialize;

use crate::error::{Error, Result};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Serialize a page, an analysis or a modification map to JSON.
pub fn to_json<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value),
        JsonFormat::Compact => serde_json::to_string(value),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, Block, Line, ModificationMap, Page, Point, Span};

    fn sample_page() -> Page {
        let span = Span {
            text: "Hello".to_string(),
            bbox: BBox::new(10.0, 10.0, 40.0, 22.0),
            origin: Point::new(10.0, 20.0),
            font: "Helvetica".to_string(),
            size: 12.0,
            color: 139,
        };
        let mut page = Page::new(1, 612.0, 792.0);
        let line = Line::from_spans(vec![span]).unwrap();
        page.blocks.push(Block::from_lines(vec![line]).unwrap());
        page
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&sample_page(), JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"font\": \"Helvetica\""));
        assert!(json.contains("\"color\": 139"));
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_to_json_compact() {
        let json = to_json(&sample_page(), JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));

        let parsed: Page = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.span_count(), 1);
    }

    #[test]
    fn test_modification_map_is_an_object() {
        let map: ModificationMap = [("b", "2"), ("a", "1")].into_iter().collect();
        assert_eq!(to_json(&map, JsonFormat::Compact).unwrap(), r#"{"b":"2","a":"1"}"#);
    }
}
