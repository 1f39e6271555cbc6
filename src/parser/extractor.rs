//! Structural extraction of a PDF page.
//!
//! The page's content stream is interpreted operator by operator, tracking
//! the graphics state stack, transformation matrices, text state and fill
//! color. Every text-showing operator yields one span; every image drawn
//! with `Do` yields one placement.

use std::collections::HashMap;
use std::path::Path;

use lopdf::content::Content;
use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId, Stream};

use crate::detect::{detect_format_from_path, is_pdf_bytes, InputFormat};
use crate::error::{Error, Result};
use crate::model::{BBox, ImageId, ImagePlacement, ImageReference, Page, Point, Span};

use super::font::{decode_text_simple, get_number, FontMetrics, LoadedFont};
use super::layout::{group_into_blocks, RawSpan};
use super::options::{ErrorMode, ExtractOptions};
use super::resolve_object;
use super::state::{components_to_srgb, GraphicsState, Matrix, TextState};

/// Nested form XObjects deeper than this are not interpreted.
const MAX_FORM_DEPTH: usize = 8;
/// Page tree levels searched for inherited attributes.
const MAX_INHERITANCE_DEPTH: usize = 32;
/// A `TJ` adjustment larger than this (in 1/1000 em) reads as a word space.
const WORD_GAP_THRESHOLD: f32 = 200.0;
/// Default page size (US Letter) when no MediaBox is present.
const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// A read-only source PDF, owned by a single run.
pub struct SourceDocument {
    doc: LopdfDocument,
}

impl SourceDocument {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        match detect_format_from_path(path)? {
            InputFormat::Pdf { .. } => {}
            _ => return Err(Error::UnknownFormat),
        }
        let doc = LopdfDocument::load(path).map_err(load_error)?;
        Ok(Self { doc })
    }

    /// Open a PDF held in memory.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if !is_pdf_bytes(data) {
            return Err(Error::UnknownFormat);
        }
        let doc = LopdfDocument::load_mem(data).map_err(load_error)?;
        Ok(Self { doc })
    }

    /// Get the number of pages.
    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Get PDF version.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    pub(crate) fn raw_doc(&self) -> &LopdfDocument {
        &self.doc
    }

    /// Extract the block/line/span hierarchy and image placements of a page.
    pub fn extract_page(&self, options: &ExtractOptions) -> Result<Page> {
        let pages = self.doc.get_pages();
        let page_id = *pages
            .get(&options.page)
            .ok_or(Error::PageOutOfRange(options.page, pages.len() as u32))?;

        let [x0, y0, x1, y1] = self.media_box(page_id);
        let content = self.page_content(page_id)?;
        let resources = self.page_resources(page_id);

        let mut interpreter = Interpreter::new(&self.doc, options, x0, y1);
        interpreter.run(&content, resources, GraphicsState::default(), 0)?;

        let mut page = Page::new(options.page, x1 - x0, y1 - y0);
        page.media_origin = Point::new(x0, y0);
        page.blocks = group_into_blocks(interpreter.spans);
        page.images = interpreter.images;

        log::debug!(
            "Extracted page {}: {} blocks, {} spans, {} image placements",
            page.number,
            page.blocks.len(),
            page.span_count(),
            page.images.len()
        );
        Ok(page)
    }

    /// Fetch the raw encoded bytes of an image XObject.
    pub fn image_reference(&self, id: ImageId) -> Result<ImageReference> {
        let stream = self
            .doc
            .get_object(id)
            .and_then(|o| o.as_stream())
            .map_err(|e| Error::Extraction(format!("image {} {} R: {}", id.0, id.1, e)))?;
        Ok(ImageReference {
            id,
            data: stream.content.clone(),
            dict: stream.dict.clone(),
        })
    }

    /// Look up a page attribute, following the page tree for inherited ones.
    fn inherited(&self, page_id: ObjectId, key: &[u8]) -> Option<&Object> {
        let mut dict = self.doc.get_dictionary(page_id).ok()?;
        for _ in 0..MAX_INHERITANCE_DEPTH {
            if let Ok(value) = dict.get(key) {
                return Some(resolve_object(&self.doc, value));
            }
            let parent = dict.get(b"Parent").ok()?.as_reference().ok()?;
            dict = self.doc.get_dictionary(parent).ok()?;
        }
        None
    }

    fn media_box(&self, page_id: ObjectId) -> [f32; 4] {
        let Some(array) = self
            .inherited(page_id, b"MediaBox")
            .and_then(|o| o.as_array().ok())
        else {
            return DEFAULT_MEDIA_BOX;
        };
        let values: Vec<f32> = array
            .iter()
            .filter_map(|o| get_number(resolve_object(&self.doc, o)))
            .collect();
        match values.as_slice() {
            [a, b, c, d] => [a.min(*c), b.min(*d), a.max(*c), b.max(*d)],
            _ => DEFAULT_MEDIA_BOX,
        }
    }

    fn page_resources(&self, page_id: ObjectId) -> Option<&Dictionary> {
        self.inherited(page_id, b"Resources")
            .and_then(|o| o.as_dict().ok())
    }

    /// Get the page's content bytes, concatenating content arrays.
    fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self
            .doc
            .get_dictionary(page_id)
            .map_err(|e| Error::Extraction(e.to_string()))?;

        let Ok(contents) = page_dict.get(b"Contents") else {
            return Ok(Vec::new());
        };

        match resolve_object(&self.doc, contents) {
            Object::Stream(s) => stream_bytes(s),
            Object::Array(arr) => {
                let mut content = Vec::new();
                for obj in arr {
                    match resolve_object(&self.doc, obj) {
                        Object::Stream(s) => {
                            content.extend_from_slice(&stream_bytes(s)?);
                            content.push(b'\n');
                        }
                        _ => {
                            return Err(Error::Extraction(
                                "content array entry is not a stream".to_string(),
                            ))
                        }
                    }
                }
                Ok(content)
            }
            _ => Err(Error::Extraction("Invalid content stream".to_string())),
        }
    }
}

/// I/O failures stay I/O errors; anything else means the bytes are unreadable.
fn load_error(err: lopdf::Error) -> Error {
    match err {
        lopdf::Error::IO(e) => Error::Io(e),
        other => Error::Extraction(format!("cannot load PDF: {}", other)),
    }
}

/// Decoded stream bytes; unfiltered streams are returned as stored.
///
/// A filtered stream that fails to decode, or decodes to nothing from
/// non-empty data, is an extraction error.
fn stream_bytes(stream: &Stream) -> Result<Vec<u8>> {
    if !stream.dict.has(b"Filter") {
        return Ok(stream.content.clone());
    }
    match stream.decompressed_content() {
        Ok(data) if data.is_empty() && !stream.content.is_empty() && !is_zlib(&stream.content) => {
            Err(Error::Extraction(
                "filtered stream decoded to no data".to_string(),
            ))
        }
        Ok(data) => Ok(data),
        Err(e) => Err(Error::Extraction(format!("cannot decode stream: {}", e))),
    }
}

/// Whether `data` starts with a valid zlib header (an empty deflate stream
/// legitimately decodes to nothing).
fn is_zlib(data: &[u8]) -> bool {
    match data {
        [cmf, flg, ..] => cmf & 0x0F == 8 && (u16::from(*cmf) << 8 | u16::from(*flg)) % 31 == 0,
        _ => false,
    }
}

/// Whether `data` holds anything besides whitespace and comments.
fn has_content(data: &[u8]) -> bool {
    data.split(|&b| b == b'\n' || b == b'\r').any(|line| {
        matches!(line.iter().find(|b| !b.is_ascii_whitespace()), Some(&b) if b != b'%')
    })
}

/// Read six numeric operands as a matrix.
fn matrix_from(objects: &[Object]) -> Option<Matrix> {
    let values: Vec<f32> = objects.iter().filter_map(get_number).collect();
    match values.as_slice() {
        [a, b, c, d, e, f] => Some(Matrix::new(*a, *b, *c, *d, *e, *f)),
        _ => None,
    }
}

/// A piece of a text-showing operator.
enum Shown<'o> {
    Text(&'o [u8]),
    /// `TJ` position adjustment in 1/1000 em
    Adjust(f32),
}

/// Content stream interpreter for one page and the forms it draws.
struct Interpreter<'a> {
    doc: &'a LopdfDocument,
    options: &'a ExtractOptions,
    /// MediaBox left edge in default user space
    left: f32,
    /// MediaBox top edge in default user space
    top: f32,
    spans: Vec<RawSpan>,
    images: Vec<ImagePlacement>,
    /// Incremented at every `BT`; spans of different segments never share a block
    segment: usize,
}

impl<'a> Interpreter<'a> {
    fn new(doc: &'a LopdfDocument, options: &'a ExtractOptions, left: f32, top: f32) -> Self {
        Self {
            doc,
            options,
            left,
            top,
            spans: Vec::new(),
            images: Vec::new(),
            segment: 0,
        }
    }

    fn run(
        &mut self,
        data: &[u8],
        resources: Option<&'a Dictionary>,
        initial: GraphicsState,
        depth: usize,
    ) -> Result<()> {
        let content = Content::decode(data)
            .map_err(|e| Error::Extraction(format!("content stream: {}", e)))?;
        if content.operations.is_empty() && has_content(data) {
            return Err(Error::Extraction(
                "content stream holds no operators".to_string(),
            ));
        }

        let mut fonts: HashMap<Vec<u8>, Option<LoadedFont<'a>>> = HashMap::new();
        let mut stack: Vec<GraphicsState> = Vec::new();
        let mut gs = initial;
        let mut text_matrix = Matrix::IDENTITY;
        let mut line_matrix = Matrix::IDENTITY;

        for op in &content.operations {
            let operands = op.operands.as_slice();
            let number = |i: usize| operands.get(i).and_then(get_number);

            match op.operator.as_str() {
                "q" => stack.push(gs.clone()),
                "Q" => {
                    if let Some(saved) = stack.pop() {
                        gs = saved;
                    }
                }
                "cm" => {
                    if let Some(m) = matrix_from(operands) {
                        gs.ctm = m.then(&gs.ctm);
                    }
                }
                "BT" => {
                    text_matrix = Matrix::IDENTITY;
                    line_matrix = Matrix::IDENTITY;
                    self.segment += 1;
                }
                "Tf" => {
                    if let (Some(Object::Name(name)), Some(size)) = (operands.first(), number(1))
                    {
                        gs.text.font = name.clone();
                        gs.text.size = size;
                    }
                }
                "Tc" => gs.text.char_spacing = number(0).unwrap_or(gs.text.char_spacing),
                "Tw" => gs.text.word_spacing = number(0).unwrap_or(gs.text.word_spacing),
                "Tz" => {
                    gs.text.horizontal_scale =
                        number(0).map_or(gs.text.horizontal_scale, |v| v / 100.0)
                }
                "TL" => gs.text.leading = number(0).unwrap_or(gs.text.leading),
                "Ts" => gs.text.rise = number(0).unwrap_or(gs.text.rise),
                "Td" | "TD" => {
                    if let (Some(tx), Some(ty)) = (number(0), number(1)) {
                        if op.operator == "TD" {
                            gs.text.leading = -ty;
                        }
                        line_matrix = Matrix::translation(tx, ty).then(&line_matrix);
                        text_matrix = line_matrix;
                    }
                }
                "Tm" => {
                    if let Some(m) = matrix_from(operands) {
                        line_matrix = m;
                        text_matrix = m;
                    }
                }
                "T*" => next_line(&gs.text, &mut line_matrix, &mut text_matrix),
                "Tj" | "'" | "\"" | "TJ" => {
                    let pieces = match op.operator.as_str() {
                        "Tj" => shown_string(operands.first()),
                        "'" => {
                            next_line(&gs.text, &mut line_matrix, &mut text_matrix);
                            shown_string(operands.first())
                        }
                        "\"" => {
                            gs.text.word_spacing = number(0).unwrap_or(gs.text.word_spacing);
                            gs.text.char_spacing = number(1).unwrap_or(gs.text.char_spacing);
                            next_line(&gs.text, &mut line_matrix, &mut text_matrix);
                            shown_string(operands.get(2))
                        }
                        _ => shown_array(operands.first()),
                    };
                    let font = fonts
                        .entry(gs.text.font.clone())
                        .or_insert_with(|| self.load_font(resources, &gs.text.font));
                    let span = self.show(font.as_ref(), &gs, &mut text_matrix, &pieces);
                    if let Some(span) = span {
                        self.spans.push(RawSpan {
                            span,
                            segment: self.segment,
                        });
                    }
                }
                "g" | "rg" | "k" | "sc" | "scn" => {
                    let components: Vec<f32> = operands.iter().filter_map(get_number).collect();
                    if !components.is_empty() {
                        gs.fill = components_to_srgb(&components);
                    }
                }
                "cs" => gs.fill = 0,
                "Do" => {
                    if let Some(Object::Name(name)) = operands.first() {
                        self.draw_xobject(name, resources, &gs, depth)?;
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }

    fn load_font(&self, resources: Option<&'a Dictionary>, name: &[u8]) -> Option<LoadedFont<'a>> {
        let doc = self.doc;
        let fonts = resolve_object(doc, resources?.get(b"Font").ok()?)
            .as_dict()
            .ok()?;
        let dict = resolve_object(doc, fonts.get(name).ok()?).as_dict().ok()?;
        Some(LoadedFont::load(doc, dict))
    }

    /// Show text, advancing the text matrix, and build the resulting span.
    fn show(
        &self,
        font: Option<&LoadedFont<'a>>,
        gs: &GraphicsState,
        text_matrix: &mut Matrix,
        pieces: &[Shown<'_>],
    ) -> Option<Span> {
        let fallback = FontMetrics::default();
        let metrics = font.map_or(&fallback, |f| &f.metrics);
        let ts = &gs.text;

        let start = text_matrix.then(&gs.ctm);
        let (sx, sy) = start.transform(0.0, ts.rise);
        let mut text = String::new();

        for piece in pieces {
            match piece {
                Shown::Text(bytes) => {
                    match font {
                        Some(f) => text.push_str(&f.decode(self.doc, bytes)),
                        None => text.push_str(&decode_text_simple(bytes)),
                    }
                    let mut advance = 0.0;
                    for code in metrics.codes(bytes) {
                        let mut w = metrics.width(code) / 1000.0 * ts.size + ts.char_spacing;
                        if !metrics.two_byte && code == 32 {
                            w += ts.word_spacing;
                        }
                        advance += w * ts.horizontal_scale;
                    }
                    *text_matrix = Matrix::translation(advance, 0.0).then(text_matrix);
                }
                Shown::Adjust(n) => {
                    let advance = -n / 1000.0 * ts.size * ts.horizontal_scale;
                    *text_matrix = Matrix::translation(advance, 0.0).then(text_matrix);
                    if -n > WORD_GAP_THRESHOLD
                        && !text.is_empty()
                        && !text.ends_with(' ')
                        && !text.ends_with('\u{00A0}')
                    {
                        text.push(' ');
                    }
                }
            }
        }

        if text.is_empty() {
            return None;
        }

        let (ex, _) = text_matrix.then(&gs.ctm).transform(0.0, ts.rise);
        let size = ts.size * start.vertical_scale();
        let ascent = metrics.ascent / 1000.0 * size;
        let descent = metrics.descent / 1000.0 * size;
        let font_name = font.map_or_else(
            || String::from_utf8_lossy(&ts.font).to_string(),
            |f| f.base_font.clone(),
        );

        Some(Span {
            text,
            bbox: BBox::new(
                sx.min(ex) - self.left,
                self.top - (sy + ascent),
                sx.max(ex) - self.left,
                self.top - (sy + descent),
            ),
            origin: Point::new(sx - self.left, self.top - sy),
            font: font_name,
            size,
            color: gs.fill,
        })
    }

    fn draw_xobject(
        &mut self,
        name: &[u8],
        resources: Option<&'a Dictionary>,
        gs: &GraphicsState,
        depth: usize,
    ) -> Result<()> {
        let Some((id, stream)) = self.lookup_xobject(resources, name) else {
            log::debug!("XObject /{} not found", String::from_utf8_lossy(name));
            return Ok(());
        };

        match stream.dict.get(b"Subtype").and_then(|o| o.as_name_str()) {
            Ok("Image") => {
                let Some(id) = id else {
                    log::warn!(
                        "Image /{} is a direct object and cannot be referenced; skipped",
                        String::from_utf8_lossy(name)
                    );
                    return Ok(());
                };
                let (x0, y0, x1, y1) = gs.ctm.unit_square_bounds();
                self.images.push(ImagePlacement {
                    image: id,
                    name: String::from_utf8_lossy(name).to_string(),
                    rect: BBox::new(
                        x0 - self.left,
                        self.top - y1,
                        x1 - self.left,
                        self.top - y0,
                    ),
                });
            }
            Ok("Form") if self.options.follow_forms => {
                if depth >= MAX_FORM_DEPTH {
                    log::warn!("Form XObject nesting exceeds {}; skipped", MAX_FORM_DEPTH);
                    return Ok(());
                }
                let matrix = stream
                    .dict
                    .get(b"Matrix")
                    .ok()
                    .and_then(|o| o.as_array().ok())
                    .and_then(|arr| matrix_from(arr))
                    .unwrap_or(Matrix::IDENTITY);
                let form_resources = stream
                    .dict
                    .get(b"Resources")
                    .ok()
                    .and_then(|o| resolve_object(self.doc, o).as_dict().ok())
                    .or(resources);
                let form_state = GraphicsState {
                    ctm: matrix.then(&gs.ctm),
                    ..gs.clone()
                };

                let result = stream_bytes(stream)
                    .and_then(|content| self.run(&content, form_resources, form_state, depth + 1));
                if let Err(e) = result {
                    match self.options.error_mode {
                        ErrorMode::Lenient => log::warn!(
                            "Skipping form XObject /{}: {}",
                            String::from_utf8_lossy(name),
                            e
                        ),
                        ErrorMode::Strict => return Err(e),
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn lookup_xobject(
        &self,
        resources: Option<&'a Dictionary>,
        name: &[u8],
    ) -> Option<(Option<ObjectId>, &'a Stream)> {
        let doc = self.doc;
        let xobjects = resolve_object(doc, resources?.get(b"XObject").ok()?)
            .as_dict()
            .ok()?;
        match xobjects.get(name).ok()? {
            Object::Reference(id) => {
                let stream = resolve_object(doc, xobjects.get(name).ok()?).as_stream().ok()?;
                Some((Some(*id), stream))
            }
            Object::Stream(stream) => Some((None, stream)),
            _ => None,
        }
    }
}

fn next_line(text: &TextState, line_matrix: &mut Matrix, text_matrix: &mut Matrix) {
    *line_matrix = Matrix::translation(0.0, -text.leading).then(line_matrix);
    *text_matrix = *line_matrix;
}

fn shown_string(operand: Option<&Object>) -> Vec<Shown<'_>> {
    match operand {
        Some(Object::String(bytes, _)) => vec![Shown::Text(bytes)],
        _ => Vec::new(),
    }
}

fn shown_array(operand: Option<&Object>) -> Vec<Shown<'_>> {
    let Some(Object::Array(items)) = operand else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Object::String(bytes, _) => Some(Shown::Text(bytes)),
            other => get_number(other).map(Shown::Adjust),
        })
        .collect()
}
