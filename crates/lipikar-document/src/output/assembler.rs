// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document assembly: collects page results in order and persists the final
// document, retrying once at a fallback location.

use std::path::{Path, PathBuf};

use lipikar_core::error::{LipikarError, Result};
use lipikar_core::types::{OutputFormat, PageResult, SaveLocation};
use tracing::{error, info, instrument, warn};

use super::{DocumentSink, sink_for};

/// Owns the output document for one run.
pub struct DocumentAssembler<S = Box<dyn DocumentSink>> {
    sink: S,
    primary: PathBuf,
    fallback_dir: Option<PathBuf>,
}

impl DocumentAssembler {
    /// Assembler whose format follows the extension of `primary`.
    pub fn for_path(primary: impl Into<PathBuf>, fallback_dir: Option<PathBuf>, title: &str) -> Self {
        let primary = primary.into();
        let sink = sink_for(OutputFormat::for_path(&primary), title);
        Self::new(sink, primary, fallback_dir)
    }
}

impl<S: DocumentSink> DocumentAssembler<S> {
    pub fn new(sink: S, primary: impl Into<PathBuf>, fallback_dir: Option<PathBuf>) -> Self {
        Self {
            sink,
            primary: primary.into(),
            fallback_dir,
        }
    }

    /// Where a failed primary save is retried, if anywhere.
    pub fn fallback_path(&self) -> Option<PathBuf> {
        let dir = self.fallback_dir.as_ref()?;
        let name = self.primary.file_name()?;
        Some(dir.join(name))
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn paragraph_count(&self) -> usize {
        self.sink.paragraph_count()
    }

    /// Append the page's text (or failure marker) as the next paragraph.
    pub fn append(&mut self, result: &PageResult) {
        self.sink.append_paragraph(result.text());
    }

    /// Save at the primary path, or exactly once more at the fallback.
    #[instrument(skip(self), fields(primary = %self.primary.display()))]
    pub fn persist(&self) -> Result<SaveLocation> {
        let primary_err = match self.sink.save(&self.primary) {
            Ok(()) => {
                info!(path = %self.primary.display(), "Document saved");
                return Ok(SaveLocation::Primary(self.primary.clone()));
            }
            Err(err) => err,
        };

        let Some(fallback) = self.fallback_path() else {
            error!(error = %primary_err, "Save failed and no fallback location is available");
            return Err(LipikarError::Save(format!(
                "could not save {}: {}",
                self.primary.display(),
                primary_err
            )));
        };

        warn!(
            error = %primary_err,
            fallback = %fallback.display(),
            "Primary save failed, retrying at fallback location"
        );
        match self.sink.save(&fallback) {
            Ok(()) => {
                info!(path = %fallback.display(), "Document saved to fallback location");
                Ok(SaveLocation::Fallback(fallback))
            }
            Err(fallback_err) => {
                error!(error = %fallback_err, "Fallback save failed");
                Err(LipikarError::Save(format!(
                    "could not save {} ({}) or {} ({})",
                    self.primary.display(),
                    primary_err,
                    fallback.display(),
                    fallback_err
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::output::PlainTextDocument;
    use lipikar_core::types::{LanguageMode, OcrAttempt, PageIndex};

    /// Sink that counts save attempts and fails on the first `failures`.
    #[derive(Default)]
    struct FlakySink {
        paragraphs: Vec<String>,
        failures: usize,
        attempts: Cell<usize>,
    }

    impl DocumentSink for FlakySink {
        fn append_paragraph(&mut self, text: &str) {
            self.paragraphs.push(text.to_string());
        }

        fn paragraph_count(&self) -> usize {
            self.paragraphs.len()
        }

        fn save(&self, path: &Path) -> Result<()> {
            let attempt = self.attempts.get();
            self.attempts.set(attempt + 1);
            if attempt < self.failures {
                Err(LipikarError::Save(format!("locked: {}", path.display())))
            } else {
                Ok(())
            }
        }
    }

    fn page(n: u32) -> PageIndex {
        PageIndex::new(n).unwrap()
    }

    #[test]
    fn results_become_paragraphs_in_order() {
        let mut asm = DocumentAssembler::new(PlainTextDocument::new(), "out.txt", None);
        asm.append(&PageResult::recognized(page(1), OcrAttempt::new(LanguageMode::Combined, "Hello world")));
        asm.append(&PageResult::failed(page(2)));
        asm.append(&PageResult::recognized(page(3), OcrAttempt::new(LanguageMode::English, "cat")));

        assert_eq!(
            asm.sink().paragraphs(),
            ["Hello world", "[OCR failed for page 2]", "cat"]
        );
    }

    #[test]
    fn primary_save_reports_primary_location() {
        let dir = tempfile::tempdir().unwrap();
        let primary = dir.path().join("scan.docx");
        let asm = DocumentAssembler::for_path(&primary, None, "scan");

        assert_eq!(asm.persist().unwrap(), SaveLocation::Primary(primary.clone()));
        assert!(primary.exists());
    }

    #[test]
    fn failed_primary_retries_once_at_fallback() {
        let sink = FlakySink {
            failures: 1,
            ..FlakySink::default()
        };
        let asm = DocumentAssembler::new(sink, "/locked/scan.docx", Some(PathBuf::from("/home/u/Desktop")));

        let location = asm.persist().unwrap();
        assert_eq!(location, SaveLocation::Fallback(PathBuf::from("/home/u/Desktop/scan.docx")));
        assert!(location.is_fallback());
        assert_eq!(asm.sink().attempts.get(), 2);
    }

    #[test]
    fn double_failure_is_an_error_not_a_third_attempt() {
        let sink = FlakySink {
            failures: usize::MAX,
            ..FlakySink::default()
        };
        let asm = DocumentAssembler::new(sink, "/locked/scan.docx", Some(PathBuf::from("/also/locked")));

        let err = asm.persist().unwrap_err();
        assert!(matches!(err, LipikarError::Save(_)));
        assert!(err.to_string().contains("/also/locked/scan.docx"));
        assert_eq!(asm.sink().attempts.get(), 2);
    }

    #[test]
    fn no_fallback_dir_means_single_attempt() {
        let sink = FlakySink {
            failures: 1,
            ..FlakySink::default()
        };
        let asm = DocumentAssembler::new(sink, "/locked/scan.docx", None);
        assert!(asm.persist().is_err());
        assert_eq!(asm.sink().attempts.get(), 1);
    }

    #[test]
    fn real_fallback_directory_receives_the_file() {
        let fallback = tempfile::tempdir().unwrap();
        let asm = DocumentAssembler::for_path(
            "/nonexistent/lipikar/out.txt",
            Some(fallback.path().to_path_buf()),
            "out",
        );
        let location = asm.persist().unwrap();
        assert_eq!(location.path(), fallback.path().join("out.txt"));
        assert!(location.path().exists());
    }
}
