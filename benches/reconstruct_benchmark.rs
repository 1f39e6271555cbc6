//! Benchmarks for extraction and reconstruction.
//!
//! Run with: cargo bench
//!
//! A synthetic page with many text objects and repeated image draws is
//! built in memory with lopdf.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lopdf::{dictionary, Document, Object, Stream};
use repdf::{ExtractOptions, ModificationMap, ReconstructOptions, Reconstructor, SourceDocument};

/// Creates a page with `lines` text lines and an image drawn `draws` times.
fn create_test_pdf(lines: usize, draws: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");

    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 1i64,
            "Height" => 1i64,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8i64,
        },
        vec![0x80],
    ));

    let mut content = String::new();
    for i in 0..lines {
        let y = 780.0 - (i % 70) as f32 * 11.0;
        content.push_str(&format!(
            "BT /F1 9 Tf 40 {} Td (Line {} - 123 Sample Street, Example City, EX 12345) Tj ET\n",
            y, i
        ));
    }
    for i in 0..draws {
        content.push_str(&format!(
            "q 20 0 0 20 {} {} cm /Im0 Do Q\n",
            40 + (i % 25) * 22,
            40 + (i / 25) * 22
        ));
    }

    let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
    let pages_id = doc.new_object_id();
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "Font" => dictionary! {
                "F1" => dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type1",
                    "BaseFont" => "Helvetica",
                },
            },
            "XObject" => dictionary! { "Im0" => image_id },
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
    doc.save_to(&mut buf).expect("failed to build benchmark PDF");
    buf
}

fn bench_extract(c: &mut Criterion) {
    let small = create_test_pdf(20, 2);
    let large = create_test_pdf(500, 100);

    c.bench_function("extract_page_20_lines", |b| {
        b.iter(|| {
            let source = SourceDocument::from_bytes(black_box(&small)).unwrap();
            source.extract_page(&ExtractOptions::default()).unwrap()
        })
    });

    c.bench_function("extract_page_500_lines", |b| {
        b.iter(|| {
            let source = SourceDocument::from_bytes(black_box(&large)).unwrap();
            source.extract_page(&ExtractOptions::default()).unwrap()
        })
    });
}

fn bench_reconstruct(c: &mut Criterion) {
    let pdf = create_test_pdf(500, 100);
    let map: ModificationMap = [("123 Sample Street, Example City, EX 12345", "42 New Ave")]
        .into_iter()
        .collect();

    c.bench_function("reconstruct_500_lines_100_images", |b| {
        b.iter(|| {
            let mut reconstructor = Reconstructor::new(ReconstructOptions::default());
            reconstructor.run_bytes(black_box(&pdf), &map).unwrap()
        })
    });
}

criterion_group!(benches, bench_extract, bench_reconstruct);
criterion_main!(benches);
