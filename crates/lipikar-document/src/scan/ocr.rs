// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// OCR (Optical Character Recognition) service for Lipikar.
//
// Recognition is an opaque collaborator behind the [`TextRecognizer`] trait.
// The production implementation drives the Tesseract command-line engine,
// which must be installed together with the `eng` and `ben` traineddata:
//
// - Debian/Ubuntu: `apt install tesseract-ocr tesseract-ocr-ben`
// - macOS: `brew install tesseract tesseract-lang`
// - Windows: <https://github.com/UB-Mannheim/tesseract/wiki>
//
// The engine location is explicit configuration handed to
// [`TesseractEngine::new`]; nothing is read from process-wide state.

use std::path::{Path, PathBuf};
use std::process::Command;

use lipikar_core::AppConfig;
use lipikar_core::error::{LipikarError, Result};
use lipikar_core::types::{Language, LanguageMode};
use tracing::{debug, instrument};

use super::enhance::EnhancedImage;

/// Anything that can read text off an enhanced page.
pub trait TextRecognizer {
    /// Recognize `image` with the languages of `mode`, returning the raw
    /// engine output (possibly empty).
    fn recognize(&self, image: &EnhancedImage, mode: LanguageMode) -> Result<String>;
}

impl<T: TextRecognizer + ?Sized> TextRecognizer for &T {
    fn recognize(&self, image: &EnhancedImage, mode: LanguageMode) -> Result<String> {
        (**self).recognize(image, mode)
    }
}

impl<T: TextRecognizer + ?Sized> TextRecognizer for Box<T> {
    fn recognize(&self, image: &EnhancedImage, mode: LanguageMode) -> Result<String> {
        (**self).recognize(image, mode)
    }
}

/// Configuration for constructing a [`TesseractEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TesseractConfig {
    /// Path to the `tesseract` executable.
    pub executable: PathBuf,
    /// Optional `--tessdata-dir` override.
    pub tessdata_dir: Option<PathBuf>,
}

impl Default for TesseractConfig {
    fn default() -> Self {
        Self {
            executable: PathBuf::from("tesseract"),
            tessdata_dir: None,
        }
    }
}

impl TesseractConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            executable: config.tesseract_path.clone(),
            tessdata_dir: config.tessdata_dir.clone(),
        }
    }

    /// Verify an explicit tessdata directory has the traineddata both
    /// languages need.
    pub fn validate(&self) -> Result<()> {
        let Some(dir) = &self.tessdata_dir else {
            return Ok(());
        };
        for language in [Language::English, Language::Bengali] {
            let file = dir.join(format!("{}.traineddata", language.code()));
            if !file.exists() {
                return Err(LipikarError::Recognition(format!(
                    "{} not found; install the language data or fix `tessdata_dir`",
                    file.display()
                )));
            }
        }
        Ok(())
    }
}

/// Text recognizer backed by the Tesseract CLI.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    config: TesseractConfig,
}

impl TesseractEngine {
    pub fn new(config: TesseractConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TesseractConfig {
        &self.config
    }

    /// Run `tesseract --version` and return its first line.
    pub fn check_available(&self) -> Result<String> {
        let output = Command::new(&self.config.executable)
            .arg("--version")
            .output()
            .map_err(|err| self.spawn_error(err))?;
        // Older releases print the banner on stderr.
        let banner = if output.stdout.is_empty() {
            output.stderr
        } else {
            output.stdout
        };
        Ok(String::from_utf8_lossy(&banner)
            .lines()
            .next()
            .unwrap_or_default()
            .to_string())
    }

    fn build_command(&self, image: &Path, mode: LanguageMode) -> Command {
        let mut cmd = Command::new(&self.config.executable);
        cmd.arg(image)
            .arg("stdout")
            .arg("-l")
            .arg(mode.engine_languages());
        if let Some(dir) = &self.config.tessdata_dir {
            cmd.arg("--tessdata-dir").arg(dir);
        }
        cmd
    }

    fn spawn_error(&self, err: std::io::Error) -> LipikarError {
        LipikarError::Recognition(format!(
            "failed to run {}: {}",
            self.config.executable.display(),
            err
        ))
    }
}

impl TextRecognizer for TesseractEngine {
    #[instrument(skip_all, fields(page = %image.index(), mode = %mode))]
    fn recognize(&self, image: &EnhancedImage, mode: LanguageMode) -> Result<String> {
        let file = image.file().ok_or_else(|| {
            LipikarError::Recognition(format!(
                "enhanced page {} has not been written to scratch storage",
                image.index()
            ))
        })?;

        let output = self
            .build_command(file, mode)
            .output()
            .map_err(|err| self.spawn_error(err))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LipikarError::Recognition(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(chars = text.chars().count(), "Recognition pass complete");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GrayImage;
    use lipikar_core::types::PageIndex;

    fn args(cmd: &Command) -> Vec<String> {
        cmd.get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn combined_pass_asks_for_both_languages() {
        let engine = TesseractEngine::new(TesseractConfig::default());
        let cmd = engine.build_command(Path::new("/tmp/p.png"), LanguageMode::Combined);
        assert_eq!(args(&cmd), ["/tmp/p.png", "stdout", "-l", "ben+eng"]);
    }

    #[test]
    fn tessdata_dir_is_forwarded() {
        let engine = TesseractEngine::new(TesseractConfig {
            executable: PathBuf::from("/opt/tess/bin/tesseract"),
            tessdata_dir: Some(PathBuf::from("/opt/tess/share")),
        });
        let cmd = engine.build_command(Path::new("p.png"), LanguageMode::Bengali);
        assert_eq!(
            args(&cmd),
            ["p.png", "stdout", "-l", "ben", "--tessdata-dir", "/opt/tess/share"]
        );
        assert_eq!(cmd.get_program(), "/opt/tess/bin/tesseract");
    }

    #[test]
    fn config_comes_from_app_config() {
        let app = AppConfig {
            tesseract_path: PathBuf::from("C:/Tesseract-OCR/tesseract.exe"),
            ..AppConfig::default()
        };
        let config = TesseractConfig::from_app_config(&app);
        assert_eq!(config.executable, PathBuf::from("C:/Tesseract-OCR/tesseract.exe"));
        assert!(config.tessdata_dir.is_none());
    }

    #[test]
    fn missing_traineddata_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("eng.traineddata"), b"").unwrap();
        let config = TesseractConfig {
            tessdata_dir: Some(dir.path().to_path_buf()),
            ..TesseractConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("ben.traineddata"));

        std::fs::write(dir.path().join("ben.traineddata"), b"").unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unpersisted_image_is_a_recognition_error() {
        let engine = TesseractEngine::new(TesseractConfig::default());
        let image = EnhancedImage::new(PageIndex::new(2).unwrap(), GrayImage::new(4, 4), 128);
        let err = engine.recognize(&image, LanguageMode::English).unwrap_err();
        assert!(matches!(err, LipikarError::Recognition(_)));
        assert!(err.to_string().contains("page 2"));
    }

    #[test]
    fn missing_executable_is_a_recognition_error() {
        let dir = tempfile::tempdir().unwrap();
        let image = EnhancedImage::new(PageIndex::new(1).unwrap(), GrayImage::new(4, 4), 128)
            .persist(dir.path())
            .unwrap();
        let engine = TesseractEngine::new(TesseractConfig {
            executable: PathBuf::from("/nonexistent/bin/tesseract"),
            tessdata_dir: None,
        });

        let err = engine.recognize(&image, LanguageMode::Combined).unwrap_err();
        assert!(err.to_string().contains("failed to run"));
        assert!(engine.check_available().is_err());
    }
}
