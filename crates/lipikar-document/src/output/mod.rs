// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Output documents: an append-only paragraph sink with format-specific
// serializers, plus the assembler that persists it with a fallback location.

pub mod assembler;
pub mod docx;
pub mod text;

use std::path::Path;

use lipikar_core::error::Result;
use lipikar_core::types::OutputFormat;

pub use assembler::DocumentAssembler;
pub use docx::DocxDocument;
pub use text::PlainTextDocument;

/// An editable document built one paragraph at a time.
pub trait DocumentSink {
    /// Append `text` as a new paragraph. Never reorders earlier paragraphs.
    fn append_paragraph(&mut self, text: &str);

    fn paragraph_count(&self) -> usize;

    /// Serialize to `path`, failing with `LipikarError::Save`.
    fn save(&self, path: &Path) -> Result<()>;
}

impl<T: DocumentSink + ?Sized> DocumentSink for Box<T> {
    fn append_paragraph(&mut self, text: &str) {
        (**self).append_paragraph(text)
    }

    fn paragraph_count(&self) -> usize {
        (**self).paragraph_count()
    }

    fn save(&self, path: &Path) -> Result<()> {
        (**self).save(path)
    }
}

/// Empty sink for `format`, titled after the source document.
pub fn sink_for(format: OutputFormat, title: &str) -> Box<dyn DocumentSink> {
    match format {
        OutputFormat::Docx => Box::new(DocxDocument::new(title)),
        OutputFormat::PlainText => Box::new(PlainTextDocument::new()),
    }
}

/// Write `bytes` to `path`, mapping any failure to a `Save` error.
pub(crate) fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes).map_err(|err| {
        lipikar_core::LipikarError::Save(format!("failed to write {}: {}", path.display(), err))
    })
}
