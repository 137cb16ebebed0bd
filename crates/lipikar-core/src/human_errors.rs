// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the end-of-run report.
//
// Every technical error is mapped to plain English with a clear suggestion.

use crate::error::LipikarError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Might work if run again unchanged.
    Transient,
    /// User must do something (install a tool, fix a path, free disk space).
    ActionRequired,
    /// Cannot be fixed by retrying; the input itself is the problem.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// One-line summary.
    pub message: String,
    /// What the user should try.
    pub suggestion: String,
    pub severity: Severity,
}

impl std::fmt::Display for HumanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.message, self.suggestion)
    }
}

/// Convert a `LipikarError` into a `HumanError`.
pub fn humanize_error(err: &LipikarError) -> HumanError {
    match err {
        LipikarError::Rasterization(detail) => humanize_tool_error(
            detail,
            "pdftoppm",
            "The PDF pages couldn't be turned into images.",
            "Install poppler-utils (it provides pdftoppm), or set `pdftoppm_path` in the config file.",
        ),

        LipikarError::InvalidInput(detail) => HumanError {
            message: "That input can't be converted.".into(),
            suggestion: format!("Check the path points at a PDF file. ({detail})"),
            severity: Severity::ActionRequired,
        },

        LipikarError::PdfError(_) => HumanError {
            message: "There's a problem with this PDF file.".into(),
            suggestion: "The file may be damaged or password-protected. Try opening it in a PDF viewer first.".into(),
            severity: Severity::Permanent,
        },

        LipikarError::ImageError(_) | LipikarError::Enhancement(_) => HumanError {
            message: "A page image couldn't be prepared for text recognition.".into(),
            suggestion: "The page may be blank or damaged. Other pages are still converted.".into(),
            severity: Severity::Permanent,
        },

        LipikarError::Recognition(detail) => humanize_recognition_error(detail),

        LipikarError::Save(_) => HumanError {
            message: "The document couldn't be saved.".into(),
            suggestion: "Neither the output path nor the fallback folder was writable. Choose another output path or free up disk space.".into(),
            severity: Severity::ActionRequired,
        },

        LipikarError::Config(detail) => HumanError {
            message: "The configuration file has a bad value.".into(),
            suggestion: format!("Fix or delete the config file. ({detail})"),
            severity: Severity::ActionRequired,
        },

        LipikarError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError {
                message: "The file couldn't be found.".into(),
                suggestion: "It may have been moved or deleted. Check the path and try again.".into(),
                severity: Severity::ActionRequired,
            },
            std::io::ErrorKind::PermissionDenied => HumanError {
                message: "Permission was denied for a file.".into(),
                suggestion: "Check the file permissions, or copy the file somewhere you own first.".into(),
                severity: Severity::ActionRequired,
            },
            _ => HumanError {
                message: "There was a problem reading or writing a file.".into(),
                suggestion: "Try again. If this keeps happening, your disk may be full.".into(),
                severity: Severity::Transient,
            },
        },

        LipikarError::Serialization(_) => HumanError {
            message: "The converter had an internal data problem.".into(),
            suggestion: "Try again. If this keeps happening, please report it.".into(),
            severity: Severity::Transient,
        },
    }
}

/// Shared shape for "an external tool didn't run" errors.
fn humanize_tool_error(detail: &str, tool: &str, message: &str, install_hint: &str) -> HumanError {
    let lower = detail.to_ascii_lowercase();
    if lower.contains("failed to run") || (lower.contains("not found") && lower.contains(tool)) {
        HumanError {
            message: format!("`{tool}` is not installed or not on PATH."),
            suggestion: install_hint.into(),
            severity: Severity::ActionRequired,
        }
    } else {
        HumanError {
            message: message.into(),
            suggestion: format!("The file may be damaged or not a PDF. (Detail: {detail})"),
            severity: Severity::Permanent,
        }
    }
}

/// Parse recognition-engine details into human-readable messages.
fn humanize_recognition_error(detail: &str) -> HumanError {
    let lower = detail.to_ascii_lowercase();

    if lower.contains("failed loading language") || lower.contains(".traineddata") {
        HumanError {
            message: "A language pack for text recognition is missing.".into(),
            suggestion: "Install the Tesseract Bengali and English data (e.g. tesseract-ocr-ben, tesseract-ocr-eng), or set `tessdata_dir` in the config file.".into(),
            severity: Severity::ActionRequired,
        }
    } else if lower.contains("failed to run") {
        HumanError {
            message: "`tesseract` is not installed or not on PATH.".into(),
            suggestion: "Install tesseract-ocr, or set `tesseract_path` in the config file.".into(),
            severity: Severity::ActionRequired,
        }
    } else {
        HumanError {
            message: "Text recognition didn't work on this page.".into(),
            suggestion: "A higher scan resolution (`dpi` in the config file) sometimes helps.".into(),
            severity: Severity::Transient,
        }
    }
}
