// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plain UTF-8 text output, one blank line between paragraphs.

use std::path::Path;

use lipikar_core::error::Result;
use tracing::{info, instrument};

use super::{DocumentSink, write_output};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlainTextDocument {
    paragraphs: Vec<String>,
}

impl PlainTextDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paragraphs(&self) -> &[String] {
        &self.paragraphs
    }

    pub fn render(&self) -> String {
        self.paragraphs.join("\n\n")
    }
}

impl DocumentSink for PlainTextDocument {
    fn append_paragraph(&mut self, text: &str) {
        self.paragraphs.push(text.to_string());
    }

    fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    fn save(&self, path: &Path) -> Result<()> {
        write_output(path, self.render().as_bytes())?;
        info!(paragraphs = self.paragraphs.len(), "Text document saved");
        Ok(())
    }
}
