// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan enhancement: grayscale, 5x5 Gaussian smoothing and Otsu binarization
// of rasterized pages ahead of text recognition.

use std::path::{Path, PathBuf};

use image::{DynamicImage, GrayImage, ImageFormat};
use imageproc::contrast::{ThresholdType, otsu_level, threshold};
use imageproc::filter::separable_filter_equal;
use lipikar_core::error::{LipikarError, Result};
use lipikar_core::types::PageIndex;
use tracing::{debug, info, instrument, warn};

use crate::pdf::raster::PageImage;

/// Normalised 5-tap binomial kernel, applied along both axes for a 5x5
/// Gaussian with automatic sigma.
const GAUSSIAN_5_TAP: [f32; 5] = [0.0625, 0.25, 0.375, 0.25, 0.0625];

/// A binarized page ready for recognition.
///
/// Pixels are either 0 or 255. Once [`persist`](Self::persist)ed, the scratch
/// file is removed when the image is dropped, so nothing about a page
/// outlives its processing step.
#[derive(Debug)]
pub struct EnhancedImage {
    index: PageIndex,
    image: GrayImage,
    /// Otsu level the page was thresholded at.
    threshold: u8,
    /// Scratch copy for file-based recognizers.
    file: Option<PathBuf>,
}

impl EnhancedImage {
    pub fn new(index: PageIndex, image: GrayImage, threshold: u8) -> Self {
        Self {
            index,
            image,
            threshold,
            file: None,
        }
    }

    pub fn index(&self) -> PageIndex {
        self.index
    }

    pub fn image(&self) -> &GrayImage {
        &self.image
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Scratch file path, if the image has been persisted.
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// Write the image as `processed_<page>.png` inside `dir`.
    #[instrument(skip(self), fields(page = %self.index, dir = %dir.display()))]
    pub fn persist(mut self, dir: &Path) -> Result<Self> {
        let path = dir.join(format!("processed_{}.png", self.index.get()));
        self.image
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|err| {
                LipikarError::Enhancement(format!(
                    "failed to write {}: {}",
                    path.display(),
                    err
                ))
            })?;
        debug!(path = %path.display(), "Enhanced page persisted");
        self.file = Some(path);
        Ok(self)
    }
}

impl Drop for EnhancedImage {
    fn drop(&mut self) {
        if let Some(path) = self.file.take()
            && let Err(err) = std::fs::remove_file(&path)
        {
            warn!(path = %path.display(), error = %err, "could not remove enhanced page image");
        }
    }
}

/// Prepares rasterized pages for OCR.
///
/// The transform is fixed and deterministic: there is no tunable threshold,
/// Otsu's method picks one per page from the smoothed histogram.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageEnhancer;

impl PageEnhancer {
    pub fn new() -> Self {
        Self
    }

    /// Grayscale → 5x5 Gaussian blur → Otsu binary threshold.
    ///
    /// Consumes the page image; only the binarized derivative survives.
    #[instrument(skip_all, fields(page = %page.index))]
    pub fn enhance(&self, page: PageImage) -> Result<EnhancedImage> {
        let PageImage { index, image, .. } = page;
        if image.width() == 0 || image.height() == 0 {
            return Err(LipikarError::Enhancement(format!(
                "page {} rendered to an empty image",
                index
            )));
        }

        let gray = to_grayscale(&image);
        drop(image);
        let smoothed = smooth(&gray);
        let (binary, level) = binarize_otsu(&smoothed);

        info!(
            page = %index,
            width = binary.width(),
            height = binary.height(),
            threshold = level,
            "Page enhanced"
        );
        Ok(EnhancedImage::new(index, binary, level))
    }
}

/// Single-channel luminance.
pub fn to_grayscale(image: &DynamicImage) -> GrayImage {
    image.to_luma8()
}

/// Fixed 5x5 Gaussian blur to suppress scan noise.
pub fn smooth(gray: &GrayImage) -> GrayImage {
    separable_filter_equal(gray, &GAUSSIAN_5_TAP)
}

/// Global binarization at Otsu's level: pixels above the level become white,
/// the rest black. Returns the image and the level used.
pub fn binarize_otsu(gray: &GrayImage) -> (GrayImage, u8) {
    let level = otsu_level(gray);
    debug!(level, "Otsu threshold computed");
    (threshold(gray, level, ThresholdType::Binary), level)
}
