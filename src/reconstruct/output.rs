//! The single output page being drawn.

use chrono::Utc;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document as LopdfDocument, Object, ObjectId, Stream, StringFormat};

use super::encoding::encode_win_ansi;
use crate::error::{Error, Result};
use crate::model::BBox;
use crate::resolve::{FontClass, ResolvedStyle};

const PRODUCER: &str = concat!("repdf ", env!("CARGO_PKG_VERSION"));

/// A new one-page PDF under construction.
///
/// Coordinates passed in are top-left based, like the extracted page; they
/// are flipped into PDF user space as operators are emitted.
pub(crate) struct OutputPage {
    doc: LopdfDocument,
    width: f32,
    height: f32,
    operations: Vec<Operation>,
    fonts: Dictionary,
    xobjects: Dictionary,
}

impl OutputPage {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            doc: LopdfDocument::with_version("1.5"),
            width,
            height,
            operations: Vec::new(),
            fonts: Dictionary::new(),
            xobjects: Dictionary::new(),
        }
    }

    pub fn doc_mut(&mut self) -> &mut LopdfDocument {
        &mut self.doc
    }

    /// Draw `text` with its baseline starting at `(x, y)`.
    pub fn draw_text(&mut self, text: &str, x: f32, y: f32, size: f32, style: &ResolvedStyle) {
        let font = self.font_resource(style.font);
        let color = style.color;
        self.operations.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![Object::Name(font.as_bytes().to_vec()), size.into()]),
            Operation::new("rg", vec![color.r.into(), color.g.into(), color.b.into()]),
            Operation::new(
                "Tm",
                vec![
                    1.into(),
                    0.into(),
                    0.into(),
                    1.into(),
                    x.into(),
                    (self.height - y).into(),
                ],
            ),
            Operation::new(
                "Tj",
                vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]);
    }

    /// Register an image XObject and return its resource name.
    pub fn add_image(&mut self, id: ObjectId) -> String {
        let name = format!("Im{}", self.xobjects.len());
        self.xobjects.set(name.as_str(), id);
        name
    }

    /// Draw a registered image filling `rect`.
    pub fn draw_image(&mut self, name: &str, rect: &BBox) {
        self.operations.extend([
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    rect.width().into(),
                    0.into(),
                    0.into(),
                    rect.height().into(),
                    rect.x0.into(),
                    (self.height - rect.y1).into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ]);
    }

    /// Standard font resource for a face, added on first use.
    fn font_resource(&mut self, class: FontClass) -> &'static str {
        let name = class.resource_name();
        if !self.fonts.has(name.as_bytes()) {
            let id = self.doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => class.base_font(),
                "Encoding" => "WinAnsiEncoding",
            });
            self.fonts.set(name, id);
        }
        name
    }

    /// Assemble the page tree and document info.
    pub fn finish(self, compress: bool) -> Result<LopdfDocument> {
        let Self {
            mut doc,
            width,
            height,
            operations,
            fonts,
            xobjects,
        } = self;

        let content = Content { operations }
            .encode()
            .map_err(|e| Error::Reconstruction(format!("encoding page content: {}", e)))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));

        let mut resources = Dictionary::new();
        if !fonts.is_empty() {
            resources.set("Font", fonts);
        }
        if !xobjects.is_empty() {
            resources.set("XObject", xobjects);
        }

        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
            "Contents" => content_id,
            "Resources" => resources,
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
        let info_id = doc.add_object(dictionary! {
            "Producer" => Object::string_literal(PRODUCER),
            "CreationDate" => Object::string_literal(Utc::now().format("D:%Y%m%d%H%M%SZ").to_string()),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);

        if compress {
            doc.compress();
        }
        Ok(doc)
    }
}
