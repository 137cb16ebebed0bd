// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Lipikar OCR pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 1-based page number, in rasterization order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PageIndex(u32);

impl PageIndex {
    /// Build from a 1-based page number. Returns `None` for zero.
    pub fn new(number: u32) -> Option<Self> {
        (number > 0).then_some(Self(number))
    }

    /// Build from a 0-based position in a page sequence.
    pub fn from_zero_based(position: u32) -> Self {
        Self(position + 1)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for PageIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two scripts the recognizer is asked to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    English,
    Bengali,
}

impl Language {
    /// Tesseract traineddata code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::English => "eng",
            Self::Bengali => "ben",
        }
    }
}

/// Which languages a single recognition pass runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageMode {
    /// Both scripts enabled in one pass.
    Combined,
    English,
    Bengali,
}

impl LanguageMode {
    /// Short tag used in logs and reports.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Combined => "combined",
            Self::English => "english",
            Self::Bengali => "bengali",
        }
    }

    /// Language list in the `a+b` form the recognition engine accepts.
    pub fn engine_languages(&self) -> String {
        self.languages()
            .iter()
            .map(Language::code)
            .collect::<Vec<_>>()
            .join("+")
    }

    /// Languages enabled for this mode. Bengali is listed first in the
    /// combined pass so it is the primary model.
    pub fn languages(&self) -> &'static [Language] {
        match self {
            Self::Combined => &[Language::Bengali, Language::English],
            Self::English => &[Language::English],
            Self::Bengali => &[Language::Bengali],
        }
    }
}

impl From<Language> for LanguageMode {
    fn from(language: Language) -> Self {
        match language {
            Language::English => Self::English,
            Language::Bengali => Self::Bengali,
        }
    }
}

impl std::fmt::Display for LanguageMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Output of one successful recognition pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrAttempt {
    pub mode: LanguageMode,
    /// Raw engine output, whitespace untouched.
    pub text: String,
}

impl OcrAttempt {
    pub fn new(mode: LanguageMode, text: impl Into<String>) -> Self {
        Self {
            mode,
            text: text.into(),
        }
    }

    /// Character count after trimming surrounding whitespace.
    pub fn stripped_len(&self) -> usize {
        self.text.trim().chars().count()
    }

    /// Character count of the raw text.
    pub fn raw_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// How a page was resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PageOutcome {
    Recognized { mode: LanguageMode, text: String },
    Failed { marker: String },
}

/// The single resolved paragraph for one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult {
    pub page: PageIndex,
    pub outcome: PageOutcome,
}

impl PageResult {
    pub fn recognized(page: PageIndex, attempt: OcrAttempt) -> Self {
        Self {
            page,
            outcome: PageOutcome::Recognized {
                mode: attempt.mode,
                text: attempt.text,
            },
        }
    }

    /// Placeholder for a page nothing could be read from.
    pub fn failed(page: PageIndex) -> Self {
        Self {
            page,
            outcome: PageOutcome::Failed {
                marker: failure_marker(page),
            },
        }
    }

    /// Paragraph text, whichever way the page was resolved.
    pub fn text(&self) -> &str {
        match &self.outcome {
            PageOutcome::Recognized { text, .. } => text,
            PageOutcome::Failed { marker } => marker,
        }
    }

    /// Winning language mode, if recognition succeeded.
    pub fn mode(&self) -> Option<LanguageMode> {
        match &self.outcome {
            PageOutcome::Recognized { mode, .. } => Some(*mode),
            PageOutcome::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, PageOutcome::Failed { .. })
    }
}

/// Marker text substituted for an unreadable page.
pub fn failure_marker(page: PageIndex) -> String {
    format!("[OCR failed for page {page}]")
}

/// Where the output document ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaveLocation {
    Primary(PathBuf),
    Fallback(PathBuf),
}

impl SaveLocation {
    pub fn path(&self) -> &Path {
        match self {
            Self::Primary(path) | Self::Fallback(path) => path,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

/// Supported output container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Docx,
    PlainText,
}

impl OutputFormat {
    /// Infer the format from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "docx" => Some(Self::Docx),
            "txt" | "text" => Some(Self::PlainText),
            _ => None,
        }
    }

    /// Infer the format from a path, defaulting to DOCX.
    pub fn for_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .unwrap_or(Self::Docx)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Docx => "docx",
            Self::PlainText => "txt",
        }
    }
}
