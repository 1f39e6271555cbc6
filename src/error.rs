//! Error types for repdf library.

use std::io;
use thiserror::Error;

/// Result type alias for repdf operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while extracting, editing or rebuilding a page.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// The source page content could not be decoded.
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// The companion document could not be read.
    #[error("Modification build error: {0}")]
    ModificationBuild(String),

    /// The source could not be opened or the output could not be written.
    #[error("Reconstruction error: {0}")]
    Reconstruction(String),

    /// Error during rendering (JSON analysis export).
    #[error("Rendering error: {0}")]
    Render(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ModificationBuild(format!("DOCX archive: {}", err))
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::ModificationBuild(format!("DOCX XML: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Extraction("bad operator".to_string());
        assert_eq!(err.to_string(), "Extraction error: bad operator");

        let err = Error::PageOutOfRange(3, 1);
        assert_eq!(
            err.to_string(),
            "Page 3 is out of range (document has 1 pages)"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_zip_error_is_modification_build() {
        let err: Error = zip::result::ZipError::FileNotFound.into();
        assert!(matches!(err, Error::ModificationBuild(_)));
    }
}
