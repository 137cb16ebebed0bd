// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// lipikar-document: the page-processing half of Lipikar.
//
// Provides PDF inspection and rasterization, scan enhancement (grayscale,
// Gaussian smoothing, Otsu binarization), Bengali/English text recognition
// with per-page pass resolution, and editable document output (DOCX, text).

pub mod output;
pub mod pdf;
pub mod scan;

// Re-export the primary types so callers can use `lipikar_document::PageEnhancer` etc.
pub use output::{DocumentAssembler, DocumentSink, DocxDocument, PlainTextDocument, sink_for};
pub use pdf::raster::{PageImage, PdftoppmRasterizer, Rasterizer};
pub use pdf::reader::PdfReader;
pub use scan::enhance::{EnhancedImage, PageEnhancer};
pub use scan::ocr::{TesseractConfig, TesseractEngine, TextRecognizer};
pub use scan::resolve::{OcrResolver, ResolveState};
