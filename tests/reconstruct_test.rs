//! End-to-end reconstruction tests.

mod common;

use common::{docx, sample_pdf, PdfBuilder, ADDRESS, CORRUPT_FLATE, JPEG_BYTES};
use lopdf::content::Content;
use lopdf::{dictionary, Document as LopdfDocument, Stream};
use repdf::edit::{CompanionDocument, LabelRecognizer};
use repdf::model::Point;
use repdf::resolve::{FontClass, Rgb};
use repdf::{
    Error, ExtractOptions, ModificationMap, ReconstructOptions, Reconstructor, SourceDocument,
    TextAnchor,
};

fn operations(pdf: &[u8]) -> Vec<lopdf::content::Operation> {
    let doc = LopdfDocument::load_mem(pdf).unwrap();
    let page_id = *doc.get_pages().get(&1).unwrap();
    Content::decode(&doc.get_page_content(page_id).unwrap())
        .unwrap()
        .operations
}

fn floats(op: &lopdf::content::Operation) -> Vec<f32> {
    op.operands.iter().map(|o| o.as_float().unwrap()).collect()
}

#[test]
fn test_address_replaced_at_original_top_left() {
    let dir = tempfile::tempdir().unwrap();
    let source_path = dir.path().join("sample.pdf");
    let companion_path = dir.path().join("modified.docx");
    let output_path = dir.path().join("out").join("reconstructed.pdf");
    std::fs::write(&source_path, sample_pdf()).unwrap();
    std::fs::write(&companion_path, docx(&["Address: 42 New Ave"])).unwrap();

    let companion = CompanionDocument::open(&companion_path).unwrap();
    let recognizer = LabelRecognizer::new().unwrap();
    let options = ReconstructOptions::new()
        .with_output(&output_path)
        .with_compression(false);
    let report = Reconstructor::new(options)
        .run(&source_path, &companion, &recognizer)
        .unwrap();

    assert_eq!(report.output.as_deref(), Some(output_path.as_path()));
    assert_eq!(report.spans_drawn, 5);
    assert_eq!(report.spans_skipped, 1);
    assert_eq!(report.spans_modified, 1);
    // Times-Italic has no exact counterpart
    assert_eq!(report.fonts_approximated, 1);

    let drawn = report.texts.iter().find(|t| t.source == ADDRESS).unwrap();
    assert_eq!(drawn.text, "42 New Ave");
    assert_eq!(drawn.origin, Point::new(50.0, 50.0));
    assert_eq!(drawn.size, 10.0);
    assert_eq!(drawn.style.font, FontClass::Regular);
    assert_eq!(drawn.style.color, Rgb::BLACK);

    let title = &report.texts[0];
    assert_eq!(title.text, "Enhanced Sample Document");
    assert_eq!(title.style.font, FontClass::Bold);
    assert_eq!(title.style.color, Rgb::DARK_BLUE);

    // the output page draws the replacement at x = 50, y = 792 - 50
    let output = std::fs::read(&output_path).unwrap();
    let ops = operations(&output);
    let tj = ops
        .iter()
        .position(|op| {
            op.operator == "Tj" && op.operands[0].as_str().ok() == Some(b"42 New Ave".as_slice())
        })
        .unwrap();
    let tm = ops[..tj].iter().rev().find(|op| op.operator == "Tm").unwrap();
    assert_eq!(floats(tm), vec![1.0, 0.0, 0.0, 1.0, 50.0, 742.0]);

    let rebuilt = SourceDocument::from_bytes(&output).unwrap();
    let page = rebuilt.extract_page(&ExtractOptions::default()).unwrap();
    assert_eq!(page.dimensions(), (612.0, 792.0));
    let texts: Vec<_> = page.spans().map(|s| s.text.as_str()).collect();
    assert_eq!(
        texts,
        vec![
            "Enhanced Sample Document",
            "42 New Ave",
            "Phone: ",
            "(555) 123-4567",
            "Lorem ipsum dolor sit amet",
        ]
    );
    let replaced = page.spans().find(|s| s.text == "42 New Ave").unwrap();
    assert_eq!(replaced.origin, Point::new(50.0, 50.0));
    assert_eq!(replaced.size, 10.0);
    assert_eq!(replaced.font, "Helvetica");
}

#[test]
fn test_image_drawn_at_every_rectangle() {
    let mut reconstructor = Reconstructor::new(ReconstructOptions::default());
    let (output, report) = reconstructor
        .run_bytes(&sample_pdf(), &ModificationMap::new())
        .unwrap();

    assert_eq!(report.image_references, 1);
    assert_eq!(report.image_draws, 2);
    assert!(report.output.is_none());

    let source = SourceDocument::from_bytes(&sample_pdf()).unwrap();
    let source_page = source.extract_page(&ExtractOptions::default()).unwrap();

    let rebuilt = SourceDocument::from_bytes(&output).unwrap();
    let page = rebuilt.extract_page(&ExtractOptions::default()).unwrap();
    assert_eq!(page.images.len(), 2);
    assert_eq!(page.images[0].image, page.images[1].image);
    for (out, src) in page.images.iter().zip(&source_page.images) {
        assert_eq!(out.rect, src.rect);
    }

    let image = rebuilt.image_reference(page.images[0].image).unwrap();
    assert_eq!(image.data, JPEG_BYTES);
    assert_eq!(image.filter().as_deref(), Some("DCTDecode"));
}

#[test]
fn test_empty_map_reproduces_spans() {
    let options = ReconstructOptions::new()
        .with_anchor(TextAnchor::Baseline)
        .with_compression(false);
    let (output, report) = Reconstructor::new(options)
        .run_bytes(&sample_pdf(), &ModificationMap::new())
        .unwrap();
    assert_eq!(report.spans_modified, 0);

    let source = SourceDocument::from_bytes(&sample_pdf()).unwrap();
    let source_page = source.extract_page(&ExtractOptions::default()).unwrap();
    let expected: Vec<_> = source_page.spans().filter(|s| !s.is_blank()).collect();

    // the drawn text keeps the extracted text and box
    assert_eq!(report.texts.len(), expected.len());
    for (drawn, span) in report.texts.iter().zip(&expected) {
        assert_eq!(drawn.text, span.text);
        assert_eq!(drawn.bbox, span.bbox);
    }

    // drawing from the baseline with same-metric fonts reproduces the boxes
    let rebuilt = SourceDocument::from_bytes(&output).unwrap();
    let page = rebuilt.extract_page(&ExtractOptions::default()).unwrap();
    let actual: Vec<_> = page.spans().collect();
    assert_eq!(actual.len(), expected.len());
    for (out, src) in actual.iter().zip(&expected) {
        assert_eq!(out.text, src.text);
        assert_eq!(out.bbox, src.bbox);
        assert_eq!(out.size, src.size);
    }
}

#[test]
fn test_unwritable_output() {
    let dir = tempfile::tempdir().unwrap();
    let source_path = dir.path().join("sample.pdf");
    std::fs::write(&source_path, sample_pdf()).unwrap();
    // a file where the output directory should be
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"").unwrap();

    let options = ReconstructOptions::new().with_output(blocker.join("out.pdf"));
    let result = Reconstructor::new(options).run_with_map(&source_path, &ModificationMap::new());
    assert!(matches!(result, Err(Error::Reconstruction(_))));
}

#[test]
fn test_non_pdf_source() {
    let mut reconstructor = Reconstructor::new(ReconstructOptions::default());
    let result = reconstructor.run_bytes(b"not a pdf", &ModificationMap::new());
    assert!(matches!(result, Err(Error::Reconstruction(_))));
}

fn undecodable_pdf() -> Vec<u8> {
    PdfBuilder::new(612.0, 792.0)
        .font("F1", "Helvetica")
        .build_stream(Stream::new(
            dictionary! { "Filter" => "FlateDecode" },
            CORRUPT_FLATE.to_vec(),
        ))
}

#[test]
fn test_undecodable_source_writes_nothing() {
    let mut reconstructor = Reconstructor::new(ReconstructOptions::default());
    let result = reconstructor.run_bytes(&undecodable_pdf(), &ModificationMap::new());
    assert!(matches!(result, Err(Error::Extraction(_))));

    let dir = tempfile::tempdir().unwrap();
    let source_path = dir.path().join("broken.pdf");
    let output_path = dir.path().join("out").join("reconstructed.pdf");
    std::fs::write(&source_path, undecodable_pdf()).unwrap();

    let options = ReconstructOptions::new().with_output(&output_path);
    let result = Reconstructor::new(options).run_with_map(&source_path, &ModificationMap::new());
    assert!(matches!(result, Err(Error::Extraction(_))));
    assert!(!output_path.exists());
}
