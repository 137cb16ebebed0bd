// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{LipikarError, Result};

/// Persistent converter settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Tesseract executable (bare name resolves through `PATH`).
    pub tesseract_path: PathBuf,
    /// Directory holding `eng.traineddata` / `ben.traineddata`, if not the
    /// engine's built-in location.
    pub tessdata_dir: Option<PathBuf>,
    /// Poppler `pdftoppm` executable.
    pub pdftoppm_path: PathBuf,
    /// Poppler `pdfinfo` executable, used for page counting. Defaults to the
    /// one next to `pdftoppm_path`.
    pub pdfinfo_path: Option<PathBuf>,
    /// Rasterization resolution in dots per inch.
    pub dpi: u32,
    /// Minimum trimmed length for the combined pass to be accepted.
    pub min_combined_chars: usize,
    /// Where to save when the primary output path fails. Defaults to the
    /// user's desktop.
    pub fallback_dir: Option<PathBuf>,
    /// Parent directory for per-run scratch storage. Defaults to the system
    /// temp directory.
    pub scratch_root: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tesseract_path: PathBuf::from("tesseract"),
            tessdata_dir: None,
            pdftoppm_path: PathBuf::from("pdftoppm"),
            pdfinfo_path: None,
            dpi: 200,
            min_combined_chars: 10,
            fallback_dir: None,
            scratch_root: None,
        }
    }
}

impl AppConfig {
    /// Read a config file. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`AppConfig::load`], but a malformed file is logged and replaced
    /// by defaults.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ignoring unreadable config");
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.dpi == 0 {
            return Err(LipikarError::Config("dpi must be greater than zero".into()));
        }
        if self.tesseract_path.as_os_str().is_empty() {
            return Err(LipikarError::Config("tesseract_path is empty".into()));
        }
        if self.pdftoppm_path.as_os_str().is_empty() {
            return Err(LipikarError::Config("pdftoppm_path is empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = AppConfig::default();
        assert_eq!(config.dpi, 200);
        assert_eq!(config.min_combined_chars, 10);
        assert_eq!(config.tesseract_path, PathBuf::from("tesseract"));
        assert!(config.fallback_dir.is_none());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "dpi": 300, "tessdata_dir": "/opt/tessdata" }"#).unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.dpi, 300);
        assert_eq!(config.tessdata_dir, Some(PathBuf::from("/opt/tessdata")));
        assert_eq!(config.min_combined_chars, 10);
    }

    #[test]
    fn zero_dpi_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "dpi": 0 }"#).unwrap();

        assert!(matches!(AppConfig::load(&path), Err(LipikarError::Config(_))));
        assert_eq!(AppConfig::load_or_default(&path), AppConfig::default());
    }

    #[test]
    fn malformed_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(AppConfig::load(&path), Err(LipikarError::Serialization(_))));
        assert_eq!(AppConfig::load_or_default(&path), AppConfig::default());
    }

    #[test]
    fn poppler_paths_are_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "pdftoppm_path": "/opt/poppler/bin/pdftoppm", "pdfinfo_path": "/usr/local/bin/pdfinfo" }"#,
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.pdftoppm_path, PathBuf::from("/opt/poppler/bin/pdftoppm"));
        assert_eq!(config.pdfinfo_path, Some(PathBuf::from("/usr/local/bin/pdfinfo")));
    }
}
