//! Reading the edited companion document.

use std::io::{Cursor, Read, Seek};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use crate::detect::{detect_format_from_bytes, InputFormat};
use crate::error::{Error, Result};

const DOCUMENT_XML: &str = "word/document.xml";

/// An edited document, reduced to its ordered paragraph texts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanionDocument {
    paragraphs: Vec<String>,
}

impl CompanionDocument {
    /// Open a DOCX or plain text file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| {
            Error::ModificationBuild(format!("cannot read {}: {}", path.display(), e))
        })?;

        match detect_format_from_bytes(&data) {
            Ok(InputFormat::Docx) => Self::from_docx_bytes(&data),
            Ok(InputFormat::Text) => Ok(Self::from_text(&String::from_utf8_lossy(&data))),
            Ok(InputFormat::Pdf { .. }) | Err(Error::UnsupportedVersion(_)) => Err(
                Error::ModificationBuild(format!("{} is a PDF, not an edited document", path.display())),
            ),
            Err(_) if data.is_empty() => Ok(Self::default()),
            Err(_) => Err(Error::ModificationBuild(format!(
                "{} is neither DOCX nor UTF-8 text",
                path.display()
            ))),
        }
    }

    /// Read paragraphs from DOCX bytes.
    pub fn from_docx_bytes(data: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(data))?;
        let xml = read_document_xml(&mut archive)?;
        let paragraphs = parse_paragraphs(&xml)?;
        log::debug!("Read {} paragraphs from DOCX", paragraphs.len());
        Ok(Self { paragraphs })
    }

    /// Treat each line of `text` as one paragraph.
    pub fn from_text(text: &str) -> Self {
        Self {
            paragraphs: text.lines().map(str::to_string).collect(),
        }
    }

    pub fn from_paragraphs<I, S>(paragraphs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paragraphs: paragraphs.into_iter().map(Into::into).collect(),
        }
    }

    /// Paragraph texts in document order.
    pub fn paragraphs(&self) -> &[String] {
        &self.paragraphs
    }

    /// All paragraphs joined with single spaces.
    pub fn joined_text(&self) -> String {
        self.paragraphs.join(" ")
    }
}

fn read_document_xml<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<String> {
    let mut file = archive.by_name(DOCUMENT_XML)?;
    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| Error::ModificationBuild(format!("cannot read {}: {}", DOCUMENT_XML, e)))?;
    Ok(content)
}

/// Collect the text of every `w:p` element.
fn parse_paragraphs(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut paragraphs = Vec::new();
    let mut current: Option<String> = None;
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"p" => current = Some(String::new()),
                b"t" => in_text = true,
                b"tab" => push_char(&mut current, '\t'),
                b"br" | b"cr" => push_char(&mut current, '\n'),
                _ => {}
            },
            Event::Empty(ref e) => match e.local_name().as_ref() {
                b"p" => paragraphs.push(String::new()),
                b"tab" => push_char(&mut current, '\t'),
                b"br" | b"cr" => push_char(&mut current, '\n'),
                _ => {}
            },
            Event::End(ref e) => match e.local_name().as_ref() {
                b"p" => {
                    if let Some(text) = current.take() {
                        paragraphs.push(text);
                    }
                }
                b"t" => in_text = false,
                _ => {}
            },
            Event::Text(e) => {
                if in_text {
                    if let Some(text) = current.as_mut() {
                        text.push_str(&e.unescape()?);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs)
}

fn push_char(current: &mut Option<String>, c: char) {
    if let Some(text) = current.as_mut() {
        text.push(c);
    }
}
