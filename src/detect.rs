//! Input format detection for source pages and companion documents.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3; // e.g., "1.7"

/// ZIP local file header, the container of DOCX companion documents.
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Format of an input file as recognized from its leading bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputFormat {
    /// A PDF with its header version (e.g., "1.7")
    Pdf { version: String },
    /// A ZIP container, assumed to be DOCX
    Docx,
    /// Valid UTF-8 text
    Text,
}

impl std::fmt::Display for InputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputFormat::Pdf { version } => write!(f, "PDF {}", version),
            InputFormat::Docx => write!(f, "DOCX"),
            InputFormat::Text => write!(f, "text"),
        }
    }
}

/// Detect the format of a byte buffer.
///
/// PDF headers must carry a `d.d` version; anything after `%PDF-` that is not
/// a version is rejected with [`Error::UnsupportedVersion`].
pub fn detect_format_from_bytes(data: &[u8]) -> Result<InputFormat> {
    if data.starts_with(PDF_MAGIC) {
        return pdf_version(data).map(|version| InputFormat::Pdf { version });
    }
    if is_docx_bytes(data) {
        return Ok(InputFormat::Docx);
    }
    if !data.is_empty() && std::str::from_utf8(data).is_ok() {
        return Ok(InputFormat::Text);
    }
    Err(Error::UnknownFormat)
}

/// Detect the format of a file from its first bytes.
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<InputFormat> {
    let mut file = File::open(path)?;
    let mut header = Vec::with_capacity(16);
    file.by_ref().take(16).read_to_end(&mut header)?;
    match detect_format_from_bytes(&header) {
        // a 16-byte prefix may split a multi-byte UTF-8 sequence
        Err(Error::UnknownFormat) if !header.is_empty() => Ok(InputFormat::Text),
        other => other,
    }
}

/// Extract the header version of a PDF buffer.
fn pdf_version(data: &[u8]) -> Result<String> {
    let rest = &data[PDF_MAGIC.len()..];
    if rest.len() < VERSION_LEN {
        return Err(Error::UnknownFormat);
    }
    let version = String::from_utf8_lossy(&rest[..VERSION_LEN]).to_string();
    let bytes = version.as_bytes();
    if bytes.len() == VERSION_LEN
        && bytes[0].is_ascii_digit()
        && bytes[1] == b'.'
        && bytes[2].is_ascii_digit()
    {
        Ok(version)
    } else {
        Err(Error::UnsupportedVersion(version))
    }
}

/// Check if bytes represent a PDF with a valid header.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    matches!(detect_format_from_bytes(data), Ok(InputFormat::Pdf { .. }))
}

/// Check if bytes look like a DOCX (ZIP) container.
///
/// Only the container is checked; whether `word/document.xml` is present is
/// decided when the archive is opened.
pub fn is_docx_bytes(data: &[u8]) -> bool {
    data.starts_with(ZIP_MAGIC)
}

/// Check if a file is a PDF.
pub fn is_pdf<P: AsRef<Path>>(path: P) -> bool {
    matches!(detect_format_from_path(path), Ok(InputFormat::Pdf { .. }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_valid_pdf() {
        let data = b"%PDF-1.7\n%\xe2\xe3\xcf\xd3";
        let format = detect_format_from_bytes(data).unwrap();
        assert_eq!(
            format,
            InputFormat::Pdf {
                version: "1.7".to_string()
            }
        );
    }

    #[test]
    fn test_detect_bad_version() {
        let result = detect_format_from_bytes(b"%PDF-x.y\n");
        assert!(matches!(result, Err(Error::UnsupportedVersion(_))));
    }

    #[test]
    fn test_detect_too_short() {
        let result = detect_format_from_bytes(b"%PDF-1");
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_detect_docx_and_text() {
        assert_eq!(
            detect_format_from_bytes(b"PK\x03\x04\x14\x00").unwrap(),
            InputFormat::Docx
        );
        assert_eq!(
            detect_format_from_bytes(b"Address: 42 New Ave").unwrap(),
            InputFormat::Text
        );
        assert!(detect_format_from_bytes(&[0xFF, 0xFE, 0x00]).is_err());
        assert!(detect_format_from_bytes(b"").is_err());
    }

    #[test]
    fn test_is_docx_bytes() {
        assert!(is_docx_bytes(b"PK\x03\x04\x14\x00"));
        assert!(!is_docx_bytes(b"%PDF-1.4\n"));
        assert!(!is_docx_bytes(b"PK"));
    }

    #[test]
    fn test_is_pdf_bytes() {
        assert!(is_pdf_bytes(b"%PDF-1.4\n"));
        assert!(!is_pdf_bytes(b"Not a PDF"));
    }
}
