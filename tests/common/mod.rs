//! Fixtures shared by the integration tests.

#![allow(dead_code)]

use std::io::{Cursor, Write};

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use zip::write::SimpleFileOptions;

pub const ADDRESS: &str = "123 Sample Street, Example City, EX 12345";

/// A JPEG marker followed by filler; never decoded.
pub const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0x01];

/// Bytes labelled FlateDecode that are not a zlib stream.
pub const CORRUPT_FLATE: &[u8] = b"BT /F1 10 Tf (not compressed) Tj ET";

/// Builds single-page PDFs in memory.
pub struct PdfBuilder {
    doc: Document,
    width: f32,
    height: f32,
    fonts: Dictionary,
    xobjects: Dictionary,
}

impl PdfBuilder {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            doc: Document::with_version("1.5"),
            width,
            height,
            fonts: Dictionary::new(),
            xobjects: Dictionary::new(),
        }
    }

    /// Standard Type1 font without widths.
    pub fn font(mut self, name: &str, base_font: &str) -> Self {
        self.fonts.set(
            name,
            dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => base_font,
            },
        );
        self
    }

    /// One-pixel-high DCT image holding `data`.
    pub fn image(&mut self, name: &str, data: &[u8]) -> ObjectId {
        let id = self.doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 2i64,
                "Height" => 1i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8i64,
                "Filter" => "DCTDecode",
            },
            data.to_vec(),
        ));
        self.xobjects.set(name, id);
        id
    }

    /// Form XObject with its own content and matrix, using the page fonts.
    pub fn form(&mut self, name: &str, content: &str, matrix: [f32; 6]) -> ObjectId {
        let id = self.doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Form",
                "BBox" => vec![0.into(), 0.into(), 1000.into(), 1000.into()],
                "Matrix" => matrix.iter().map(|v| Object::Real(*v)).collect::<Vec<_>>(),
            },
            content.as_bytes().to_vec(),
        ));
        self.xobjects.set(name, id);
        id
    }

    /// Form XObject whose FlateDecode data does not inflate.
    pub fn corrupt_form(&mut self, name: &str) -> ObjectId {
        let id = self.doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Form",
                "BBox" => vec![0.into(), 0.into(), 1000.into(), 1000.into()],
                "Filter" => "FlateDecode",
            },
            CORRUPT_FLATE.to_vec(),
        ));
        self.xobjects.set(name, id);
        id
    }

    pub fn build(self, content: &str) -> Vec<u8> {
        self.build_stream(Stream::new(dictionary! {}, content.as_bytes().to_vec()))
    }

    /// Build with a prepared page content stream, e.g. a filtered one.
    pub fn build_stream(self, content: Stream) -> Vec<u8> {
        let Self {
            mut doc,
            width,
            height,
            fonts,
            xobjects,
        } = self;

        let content_id = doc.add_object(content);
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => fonts,
                "XObject" => xobjects,
            },
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => 1i64,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).expect("failed to save test PDF");
        buf
    }
}

/// The sample letter page: a dark-blue bold title, three body lines, a
/// blank span and one image drawn at two rectangles.
///
/// At size 10 with the default 800/1000 ascent, the address baseline at
/// y = 734 puts its top-left corner at (50, 50).
pub fn sample_pdf() -> Vec<u8> {
    let mut builder = PdfBuilder::new(612.0, 792.0)
        .font("F1", "Helvetica-Bold")
        .font("F2", "Helvetica")
        .font("F3", "Times-Italic");
    builder.image("Im0", JPEG_BYTES);

    let content = format!(
        "BT /F1 18 Tf 0 0 0.545098 rg 50 760 Td (Enhanced Sample Document) Tj ET\n\
         BT /F2 10 Tf 0 g 50 734 Td ({}) Tj ET\n\
         BT /F2 10 Tf 50 700 Td (Phone: ) Tj (\\(555\\) 123-4567) Tj ET\n\
         BT /F3 10 Tf 50 660 Td (Lorem ipsum dolor sit amet) Tj ( ) Tj ET\n\
         q 100 0 0 80 50 400 cm /Im0 Do Q\n\
         q 100 0 0 80 300 400 cm /Im0 Do Q",
        ADDRESS
    );
    builder.build(&content)
}

/// A DOCX archive holding one `w:p` per paragraph.
pub fn docx(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|p| format!(r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#, xml_escape(p)))
        .collect();
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    );

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("[Content_Types].xml", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(b"<Types/>").unwrap();
    writer
        .start_file("word/document.xml", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(xml.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
