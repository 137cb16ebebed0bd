// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Lipikar.

use thiserror::Error;

/// Top-level error type for all Lipikar operations.
#[derive(Debug, Error)]
pub enum LipikarError {
    // -- Run-level errors --
    #[error("rasterization failed: {0}")]
    Rasterization(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    // -- Page-level errors --
    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("enhancement failed: {0}")]
    Enhancement(String),

    #[error("recognition failed: {0}")]
    Recognition(String),

    // -- Output --
    #[error("saving document failed: {0}")]
    Save(String),

    // -- Configuration / persistence --
    #[error("configuration error: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LipikarError {
    /// Whether this error ends the whole run rather than a single page.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Rasterization(_) | Self::InvalidInput(_) | Self::Save(_)
        )
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LipikarError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_level_errors_are_not_fatal() {
        assert!(!LipikarError::Recognition("boom".into()).is_fatal());
        assert!(!LipikarError::Enhancement("boom".into()).is_fatal());
        assert!(!LipikarError::ImageError("boom".into()).is_fatal());
    }

    #[test]
    fn run_level_errors_are_fatal() {
        assert!(LipikarError::Rasterization("no pages".into()).is_fatal());
        assert!(LipikarError::Save("disk full".into()).is_fatal());
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: LipikarError = io.into();
        assert!(err.to_string().contains("denied"));
    }
}
