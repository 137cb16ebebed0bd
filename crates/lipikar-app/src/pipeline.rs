// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline driver. Runs every page of a source PDF through
// render → enhance → resolve, strictly in order, and hands the assembled
// document to the assembler for saving.
//
// Only run-level errors end a run unsuccessfully: the source cannot be
// opened, counted or read any more, or the document cannot be saved
// anywhere. Everything else that goes wrong inside a page becomes that
// page's failure marker.

use std::path::{Path, PathBuf};

use lipikar_core::AppConfig;
use lipikar_core::error::Result;
use lipikar_core::types::{PageIndex, PageResult, SaveLocation};
use lipikar_document::{
    DocumentAssembler, OcrResolver, PageEnhancer, PdftoppmRasterizer, Rasterizer,
    TesseractConfig, TesseractEngine, TextRecognizer,
};
use tracing::{error, info, instrument, warn};

use crate::services::paths::document_title;
use crate::services::scratch::ScratchDir;

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// One entry per source page, in page order.
    pub pages: Vec<PageResult>,
    pub saved_to: SaveLocation,
}

impl RunReport {
    pub fn failed_pages(&self) -> impl Iterator<Item = &PageResult> {
        self.pages.iter().filter(|page| page.is_failed())
    }
}

/// Emitted after each page is resolved.
#[derive(Debug, Clone, Copy)]
pub struct PageProgress<'a> {
    pub total: u32,
    pub result: &'a PageResult,
}

/// Converts one PDF at a time.
pub struct Pipeline<Ra, Re> {
    rasterizer: Ra,
    enhancer: PageEnhancer,
    resolver: OcrResolver<Re>,
    fallback_dir: Option<PathBuf>,
    scratch_root: Option<PathBuf>,
}

impl Pipeline<PdftoppmRasterizer, TesseractEngine> {
    /// Production pipeline: pdftoppm and tesseract as configured.
    pub fn from_config(config: &AppConfig) -> Self {
        let mut rasterizer = PdftoppmRasterizer::new(&config.pdftoppm_path, config.dpi);
        if let Some(pdfinfo) = &config.pdfinfo_path {
            rasterizer = rasterizer.with_pdfinfo(pdfinfo);
        }
        let engine = TesseractEngine::new(TesseractConfig::from_app_config(config));
        Self::new(rasterizer, engine)
            .with_min_combined_chars(config.min_combined_chars)
            .with_fallback_dir(config.fallback_dir.clone())
            .with_scratch_root(config.scratch_root.clone())
    }
}

impl<Ra: Rasterizer, Re: TextRecognizer> Pipeline<Ra, Re> {
    pub fn new(rasterizer: Ra, recognizer: Re) -> Self {
        Self {
            rasterizer,
            enhancer: PageEnhancer::new(),
            resolver: OcrResolver::new(recognizer),
            fallback_dir: None,
            scratch_root: None,
        }
    }

    pub fn with_min_combined_chars(mut self, min: usize) -> Self {
        self.resolver = self.resolver.with_min_combined_chars(min);
        self
    }

    /// Directory a failed save is retried in. Replaces any previous value,
    /// so `None` leaves a run with a single save attempt.
    pub fn with_fallback_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.fallback_dir = dir;
        self
    }

    pub fn with_scratch_root(mut self, root: Option<PathBuf>) -> Self {
        self.scratch_root = root;
        self
    }

    pub fn fallback_dir(&self) -> Option<&Path> {
        self.fallback_dir.as_deref()
    }

    pub fn recognizer(&self) -> &Re {
        self.resolver.recognizer()
    }

    /// Convert `source` into an editable document at `output`.
    pub fn run(&self, source: &Path, output: &Path) -> Result<RunReport> {
        self.run_with(source, output, |_| {})
    }

    /// Like [`Pipeline::run`], calling `on_page` as each page completes.
    #[instrument(skip(self, on_page), fields(source = %source.display(), output = %output.display()))]
    pub fn run_with(
        &self,
        source: &Path,
        output: &Path,
        on_page: impl FnMut(PageProgress<'_>),
    ) -> Result<RunReport> {
        self.rasterizer.probe()?;
        let total = self.rasterizer.page_count(source)?;

        let scratch = ScratchDir::create(self.scratch_root.as_deref())?;
        let outcome = self.convert(source, output, total, scratch.path(), on_page);
        scratch.close();

        let report = outcome?;
        info!(
            pages = report.pages.len(),
            failed = report.failed_pages().count(),
            saved_to = %report.saved_to.path().display(),
            "Conversion finished"
        );
        Ok(report)
    }

    fn convert(
        &self,
        source: &Path,
        output: &Path,
        total: u32,
        scratch: &Path,
        mut on_page: impl FnMut(PageProgress<'_>),
    ) -> Result<RunReport> {
        let mut assembler =
            DocumentAssembler::for_path(output, self.fallback_dir.clone(), &document_title(source));
        let mut pages = Vec::with_capacity(total as usize);

        for position in 0..total {
            let page = PageIndex::from_zero_based(position);
            let result = self.process_page(source, page, scratch)?;
            assembler.append(&result);
            on_page(PageProgress {
                total,
                result: &result,
            });
            pages.push(result);
        }

        info!(paragraphs = assembler.paragraph_count(), "Document assembled");
        let saved_to = assembler.persist()?;
        Ok(RunReport { pages, saved_to })
    }

    /// Resolve one page, turning any page-level error into its failure
    /// marker. Run-level errors escalate.
    fn process_page(&self, source: &Path, page: PageIndex, scratch: &Path) -> Result<PageResult> {
        match self.recognize_page(source, page, scratch) {
            Ok(result) => Ok(result),
            Err(err) if err.is_fatal() => {
                error!(page = %page, error = %err, "run-level failure while processing page");
                Err(err)
            }
            Err(err) => {
                warn!(page = %page, error = %err, "page could not be processed");
                Ok(PageResult::failed(page))
            }
        }
    }

    fn recognize_page(&self, source: &Path, page: PageIndex, scratch: &Path) -> Result<PageResult> {
        let raw = self.rasterizer.render_page(source, page, scratch)?;
        let enhanced = self.enhancer.enhance(raw)?.persist(scratch)?;
        Ok(self.resolver.resolve(&enhanced))
    }
}
