//! Image references and their placements on a page.

use super::BBox;
use serde::{Deserialize, Serialize};

/// Identifier of an image XObject: (object number, generation number).
pub type ImageId = (u32, u16);

/// One drawn occurrence of an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagePlacement {
    /// The image drawn
    pub image: ImageId,

    /// Resource name the image was drawn under (e.g. "Im0")
    pub name: String,

    /// Rectangle covered on the page
    pub rect: BBox,
}

/// An image's raw encoded bytes, fetched once per unique image.
#[derive(Debug, Clone)]
pub struct ImageReference {
    /// Source object id
    pub id: ImageId,

    /// Raw (still encoded) stream bytes
    pub data: Vec<u8>,

    /// Stream dictionary needed to replay `data` verbatim
    pub dict: lopdf::Dictionary,
}

impl ImageReference {
    /// Width in pixels, if declared.
    pub fn width(&self) -> Option<u32> {
        self.dict_int(b"Width")
    }

    /// Height in pixels, if declared.
    pub fn height(&self) -> Option<u32> {
        self.dict_int(b"Height")
    }

    fn dict_int(&self, key: &[u8]) -> Option<u32> {
        self.dict
            .get(key)
            .ok()
            .and_then(|o| o.as_i64().ok())
            .map(|v| v as u32)
    }

    /// First stream filter, e.g. "DCTDecode".
    pub fn filter(&self) -> Option<String> {
        let filter = self.dict.get(b"Filter").ok()?;
        match filter {
            lopdf::Object::Name(n) => Some(String::from_utf8_lossy(n).to_string()),
            lopdf::Object::Array(arr) => arr
                .first()
                .and_then(|o| o.as_name_str().ok())
                .map(String::from),
            _ => None,
        }
    }

    /// MIME type of the encoded bytes.
    ///
    /// Filters that leave a self-contained file (JPEG, JPEG 2000) are
    /// recognized; everything else is raw sample data.
    pub fn mime_type(&self) -> &'static str {
        match self.filter().as_deref() {
            Some("DCTDecode") => "image/jpeg",
            Some("JPXDecode") => "image/jp2",
            _ => detect_mime_type(&self.data).unwrap_or("application/octet-stream"),
        }
    }

    /// File extension matching [`mime_type`](Self::mime_type).
    pub fn extension(&self) -> &'static str {
        match self.mime_type() {
            "image/jpeg" => "jpg",
            "image/png" => "png",
            "image/jp2" => "jp2",
            "image/tiff" => "tiff",
            _ => "raw",
        }
    }

    /// Suggested filename for exporting the image.
    pub fn suggested_filename(&self) -> String {
        format!("image_{}_{}.{}", self.id.0, self.id.1, self.extension())
    }

    /// Size of the encoded data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Detect MIME type from data magic bytes.
fn detect_mime_type(data: &[u8]) -> Option<&'static str> {
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some("image/png");
    }
    if data.starts_with(&[0x49, 0x49, 0x2A, 0x00]) || data.starts_with(&[0x4D, 0x4D, 0x00, 0x2A])
    {
        return Some("image/tiff");
    }
    if data.starts_with(&[0x00, 0x00, 0x00, 0x0C, 0x6A, 0x50, 0x20, 0x20]) {
        return Some("image/jp2");
    }
    None
}
