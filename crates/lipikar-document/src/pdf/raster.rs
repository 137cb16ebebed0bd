// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page rasterization: turns a source PDF into one decoded image per page,
// rendered on demand so only a single page is held in memory at a time.

use std::path::{Path, PathBuf};
use std::process::Command;

use image::DynamicImage;
use lipikar_core::error::{LipikarError, Result};
use lipikar_core::types::PageIndex;
use tracing::{debug, info, instrument, warn};

use super::reader::{PdfReader, scan_page_count};

/// A single rasterized page, owned by the pipeline for one processing step.
#[derive(Debug, Clone)]
pub struct PageImage {
    pub index: PageIndex,
    pub image: DynamicImage,
    /// Resolution the page was rendered at.
    pub dpi: u32,
}

/// Source of page images for a document.
pub trait Rasterizer {
    /// Confirm the rasterizer can run at all. Called once per run.
    fn probe(&self) -> Result<()> {
        Ok(())
    }

    /// Number of pages in `source`. Failure here is fatal for the run.
    fn page_count(&self, source: &Path) -> Result<u32>;

    /// Render one page. Intermediate files go in `scratch_dir` and are
    /// removed before returning.
    fn render_page(&self, source: &Path, page: PageIndex, scratch_dir: &Path) -> Result<PageImage>;
}

impl<T: Rasterizer + ?Sized> Rasterizer for &T {
    fn probe(&self) -> Result<()> {
        (**self).probe()
    }

    fn page_count(&self, source: &Path) -> Result<u32> {
        (**self).page_count(source)
    }

    fn render_page(&self, source: &Path, page: PageIndex, scratch_dir: &Path) -> Result<PageImage> {
        (**self).render_page(source, page, scratch_dir)
    }
}

/// Rasterizer backed by poppler's `pdftoppm`, with pages counted by
/// poppler's `pdfinfo` so that counting and rendering agree on damaged files.
#[derive(Debug, Clone)]
pub struct PdftoppmRasterizer {
    executable: PathBuf,
    pdfinfo: PathBuf,
    dpi: u32,
}

impl PdftoppmRasterizer {
    /// `pdfinfo` is looked up next to `executable`.
    pub fn new(executable: impl Into<PathBuf>, dpi: u32) -> Self {
        let executable = executable.into();
        let pdfinfo = sibling_tool(&executable, "pdfinfo");
        Self {
            executable,
            pdfinfo,
            dpi,
        }
    }

    /// Use an explicit `pdfinfo` instead of the one next to `pdftoppm`.
    pub fn with_pdfinfo(mut self, pdfinfo: impl Into<PathBuf>) -> Self {
        self.pdfinfo = pdfinfo.into();
        self
    }

    /// Page count as poppler sees it.
    fn pdfinfo_pages(&self, source: &Path) -> Result<u32> {
        let output = Command::new(&self.pdfinfo)
            .arg(source)
            .output()
            .map_err(|err| {
                LipikarError::Rasterization(format!(
                    "failed to run {}: {}",
                    self.pdfinfo.display(),
                    err
                ))
            })?;
        if !output.status.success() {
            return Err(LipikarError::Rasterization(format!(
                "pdfinfo exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        parse_pdfinfo_pages(&String::from_utf8_lossy(&output.stdout)).ok_or_else(|| {
            LipikarError::Rasterization("pdfinfo output has no `Pages:` line".into())
        })
    }

    /// Page count from the file itself, for when poppler is unavailable.
    fn local_pages(source: &Path) -> Result<u32> {
        let count = match PdfReader::open(source) {
            Ok(reader) => reader.page_count(),
            Err(err) => {
                warn!(error = %err, "lopdf rejected the document, scanning for page objects");
                let data = std::fs::read(source).map_err(|err| {
                    LipikarError::Rasterization(format!(
                        "failed to read {}: {}",
                        source.display(),
                        err
                    ))
                })?;
                match scan_page_count(&data) {
                    0 => {
                        return Err(LipikarError::Rasterization(format!(
                            "{} is not a readable PDF: {}",
                            source.display(),
                            err
                        )));
                    }
                    pages => pages,
                }
            }
        };
        u32::try_from(count).map_err(|_| {
            LipikarError::Rasterization(format!("{} has too many pages", source.display()))
        })
    }

    /// Arguments rendering exactly `page` of `source` to `<prefix>.png`.
    fn build_command(&self, source: &Path, page: PageIndex, prefix: &Path) -> Command {
        let number = page.get().to_string();
        let mut cmd = Command::new(&self.executable);
        cmd.arg("-png")
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg("-f")
            .arg(&number)
            .arg("-l")
            .arg(&number)
            .arg("-singlefile")
            .arg(source)
            .arg(prefix);
        cmd
    }
}

impl Rasterizer for PdftoppmRasterizer {
    fn probe(&self) -> Result<()> {
        Command::new(&self.executable)
            .arg("-v")
            .output()
            .map(|_| ())
            .map_err(|err| {
                LipikarError::Rasterization(format!(
                    "failed to run {}: {}",
                    self.executable.display(),
                    err
                ))
            })
    }

    #[instrument(skip(self), fields(source = %source.display()))]
    fn page_count(&self, source: &Path) -> Result<u32> {
        let count = match self.pdfinfo_pages(source) {
            Ok(count) => count,
            Err(err) => {
                debug!(error = %err, "pdfinfo unavailable, counting pages locally");
                Self::local_pages(source)?
            }
        };
        info!(pages = count, "Source document opened");
        Ok(count)
    }

    #[instrument(skip(self, scratch_dir), fields(page = %page, dpi = self.dpi))]
    fn render_page(&self, source: &Path, page: PageIndex, scratch_dir: &Path) -> Result<PageImage> {
        let prefix = scratch_dir.join(format!("page_{:03}", page.get()));
        let output = self
            .build_command(source, page, &prefix)
            .output()
            .map_err(|err| {
                LipikarError::PdfError(format!(
                    "failed to run {}: {}",
                    self.executable.display(),
                    err
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LipikarError::PdfError(format!(
                "pdftoppm failed on page {} with {}: {}",
                page,
                output.status,
                stderr.trim()
            )));
        }

        let image_path = prefix.with_extension("png");
        let decoded = image::open(&image_path);
        if let Err(err) = std::fs::remove_file(&image_path) {
            warn!(path = %image_path.display(), error = %err, "could not remove raw page image");
        }
        let image = decoded.map_err(|err| {
            LipikarError::ImageError(format!(
                "failed to decode rendered page {} ({}): {}",
                page,
                image_path.display(),
                err
            ))
        })?;

        debug!(width = image.width(), height = image.height(), "Page rendered");
        Ok(PageImage {
            index: page,
            image,
            dpi: self.dpi,
        })
    }
}

/// Value of the `Pages:` line in `pdfinfo` output.
fn parse_pdfinfo_pages(stdout: &str) -> Option<u32> {
    stdout.lines().find_map(|line| {
        line.strip_prefix("Pages:")
            .and_then(|value| value.trim().parse().ok())
    })
}

/// `name` in the same directory as `tool`, or bare `name` for PATH lookup.
fn sibling_tool(tool: &Path, name: &str) -> PathBuf {
    match tool.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            let mut sibling = dir.join(name);
            if let Some(ext) = tool.extension() {
                sibling.set_extension(ext);
            }
            sibling
        }
        _ => PathBuf::from(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::reader::{blank_pdf, with_broken_startxref};

    #[test]
    fn command_selects_a_single_page() {
        let raster = PdftoppmRasterizer::new("/usr/bin/pdftoppm", 300);
        let page = PageIndex::new(4).unwrap();
        let cmd = raster.build_command(Path::new("in.pdf"), page, Path::new("/tmp/x/page_004"));

        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(
            args,
            [
                "-png", "-r", "300", "-f", "4", "-l", "4", "-singlefile", "in.pdf",
                "/tmp/x/page_004"
            ]
        );
        assert_eq!(cmd.get_program(), "/usr/bin/pdftoppm");
    }

    /// Rasterizer whose `pdfinfo` cannot be found, forcing local counting.
    fn without_pdfinfo() -> PdftoppmRasterizer {
        PdftoppmRasterizer::new("pdftoppm", 200).with_pdfinfo("/nonexistent/bin/pdfinfo")
    }

    #[test]
    fn pdfinfo_lives_next_to_pdftoppm() {
        let raster = PdftoppmRasterizer::new("/opt/poppler/bin/pdftoppm", 200);
        assert_eq!(raster.pdfinfo, PathBuf::from("/opt/poppler/bin/pdfinfo"));
        let raster = PdftoppmRasterizer::new("C:/poppler/bin/pdftoppm.exe", 200);
        assert_eq!(raster.pdfinfo, PathBuf::from("C:/poppler/bin/pdfinfo.exe"));
        let raster = PdftoppmRasterizer::new("pdftoppm", 200);
        assert_eq!(raster.pdfinfo, PathBuf::from("pdfinfo"));
    }

    #[test]
    fn pages_line_is_parsed() {
        let stdout = "Title:          scan\nProducer:       scanner\nPages:          12\nEncrypted:      no\n";
        assert_eq!(parse_pdfinfo_pages(stdout), Some(12));
        assert_eq!(parse_pdfinfo_pages("Title: x\n"), None);
    }

    #[test]
    fn page_count_reads_the_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.pdf");
        std::fs::write(&path, blank_pdf(5)).unwrap();

        assert_eq!(without_pdfinfo().page_count(&path).unwrap(), 5);
    }

    #[test]
    fn broken_trailer_still_counts_pages() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.pdf");
        std::fs::write(&path, with_broken_startxref(blank_pdf(3))).unwrap();

        assert_eq!(without_pdfinfo().page_count(&path).unwrap(), 3);
    }

    #[test]
    fn unreadable_source_is_a_rasterization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"%PDF-garbage").unwrap();

        assert!(matches!(
            without_pdfinfo().page_count(&path),
            Err(LipikarError::Rasterization(_))
        ));
    }

    #[test]
    fn missing_executable_fails_probe() {
        let raster = PdftoppmRasterizer::new("/nonexistent/bin/pdftoppm", 200);
        let err = raster.probe().unwrap_err();
        assert!(err.to_string().contains("failed to run"));
    }
}
