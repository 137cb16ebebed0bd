// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanning pipeline: page enhancement, text recognition and per-page
// resolution of which recognition pass to keep.

pub mod enhance;
pub mod ocr;
pub mod resolve;

pub use enhance::{EnhancedImage, PageEnhancer};
pub use ocr::{TesseractConfig, TesseractEngine, TextRecognizer};
pub use resolve::{DEFAULT_MIN_COMBINED_CHARS, OcrResolver, ResolveState, pick_longer};
