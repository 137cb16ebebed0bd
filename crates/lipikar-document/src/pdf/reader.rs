// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader: open and inspect source documents using the `lopdf` crate.

use std::path::Path;

use lipikar_core::error::LipikarError;
use lopdf::Document;
#[cfg(test)]
use lopdf::{Dictionary, Object, Stream, dictionary};
use tracing::{debug, info, instrument};

/// Structural view of a source PDF, parsed with `lopdf`.
///
/// `lopdf` insists on a consistent cross-reference table; documents poppler
/// would repair on the fly are rejected here, so callers fall back to
/// [`scan_page_count`].
pub struct PdfReader {
    document: Document,
}

impl PdfReader {
    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LipikarError> {
        let path_ref = path.as_ref();
        info!("Opening PDF: {}", path_ref.display());

        let document = Document::load(path_ref).map_err(|err| {
            LipikarError::PdfError(format!("failed to open {}: {}", path_ref.display(), err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded");
        Ok(Self { document })
    }

    /// Number of pages reachable from the catalog.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }
}

/// Count `/Type /Page` dictionaries by scanning the raw bytes, ignoring the
/// cross-reference table entirely.
///
/// Last resort for damaged files. Pages packed into compressed object streams
/// are invisible to the scan.
pub fn scan_page_count(data: &[u8]) -> usize {
    const TYPE: &[u8] = b"/Type";
    const PAGE: &[u8] = b"/Page";

    let mut count = 0;
    let mut pos = 0;
    while let Some(offset) = find(&data[pos..], TYPE) {
        let mut cursor = pos + offset + TYPE.len();
        while cursor < data.len() && data[cursor].is_ascii_whitespace() {
            cursor += 1;
        }
        if data[cursor..].starts_with(PAGE) {
            let after = cursor + PAGE.len();
            // `/Pages` is the page tree node, not a page.
            if data.get(after).is_none_or(|b| !b.is_ascii_alphanumeric()) {
                count += 1;
            }
        }
        pos = cursor;
    }
    count
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Build a minimal PDF with `pages` empty pages.
#[cfg(test)]
pub(crate) fn blank_pdf(pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids = Vec::with_capacity(pages);
    for _ in 0..pages {
        let content_id = doc.add_object(Stream::new(Dictionary::new(), Vec::new()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(595),
                Object::Integer(842),
            ],
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

/// Point `startxref` at a bogus offset, as a truncated rewrite would.
#[cfg(test)]
pub(crate) fn with_broken_startxref(mut pdf: Vec<u8>) -> Vec<u8> {
    let marker = b"startxref";
    let at = find(&pdf, marker).map(|i| i + marker.len()).unwrap();
    let digits_start = at + pdf[at..].iter().take_while(|b| b.is_ascii_whitespace()).count();
    let digits_len = pdf[digits_start..].iter().take_while(|b| b.is_ascii_digit()).count();
    pdf.splice(digits_start..digits_start + digits_len, b"12".iter().copied());
    pdf
}
