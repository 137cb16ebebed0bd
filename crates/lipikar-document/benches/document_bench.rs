// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the lipikar-document crate: page enhancement and
// DOCX serialization on synthetic input.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, Rgb, RgbImage};

use lipikar_core::types::PageIndex;
use lipikar_document::{DocumentSink, DocxDocument, PageEnhancer, PageImage};

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Enhance a letter-sized page at 100 DPI: off-white paper with rows of dark
/// "text" bars, roughly what a scanned typed page looks like after rendering.
fn bench_page_enhancement(c: &mut Criterion) {
    let (width, height) = (850u32, 1100u32);
    let mut img = RgbImage::from_pixel(width, height, Rgb([238, 232, 220]));
    for line in 0..40 {
        let top = 60 + line * 25;
        for y in top..top + 12 {
            for x in (70..780).filter(|x| (x / 9) % 5 != 0) {
                img.put_pixel(x, y, Rgb([30, 28, 35]));
            }
        }
    }
    let dynamic = DynamicImage::ImageRgb8(img);
    let index = PageIndex::from_zero_based(0);

    c.bench_function("enhance (850x1100)", |b| {
        b.iter(|| {
            let page = PageImage {
                index,
                image: black_box(dynamic.clone()),
                dpi: 100,
            };
            let enhanced = PageEnhancer::new().enhance(page);
            black_box(enhanced.map(|e| e.threshold()).ok());
        });
    });
}

/// Serialize a 50-page document of mixed-script paragraphs.
fn bench_docx_serialization(c: &mut Criterion) {
    let mut doc = DocxDocument::new("bench");
    for page in 0..50 {
        doc.append_paragraph(&format!(
            "Page {page}\nআমার সোনার বাংলা, আমি তোমায় ভালোবাসি।\nThe quick brown fox <jumps> & runs.\x0c"
        ));
    }

    c.bench_function("docx serialize (50 paragraphs)", |b| {
        b.iter(|| black_box(doc.to_bytes().map(|bytes| bytes.len()).ok()));
    });
}

criterion_group!(benches, bench_page_enhancement, bench_docx_serialization);
criterion_main!(benches);
