// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// OCR resolution. Decides which recognition pass to trust for a page whose
// mix of Bengali and English is unknown.
//
// Decision table, per page:
//
// | State        | Action                         | Outcome                                  |
// |--------------|--------------------------------|------------------------------------------|
// | TryCombined  | `ben+eng` pass                 | trimmed len >= min → accept combined     |
// |              |                                | trimmed len <  min → Disambiguate        |
// |              |                                | error              → Degrade             |
// | Disambiguate | `eng` pass, then `ben` pass    | raw-longer wins, English on ties         |
// | Degrade      | `eng`, then `ben` until one ok | first success wins                       |
// | Failed       | none                           | failure marker naming the page           |

use lipikar_core::types::{Language, LanguageMode, OcrAttempt, PageResult};
use tracing::{debug, error, info, instrument, warn};

use super::enhance::EnhancedImage;
use super::ocr::TextRecognizer;

/// Trimmed length at which the combined pass is trusted as real content.
pub const DEFAULT_MIN_COMBINED_CHARS: usize = 10;

/// Order single-language passes run in, both when disambiguating and when
/// degrading after a combined-pass error.
const SINGLE_LANGUAGE_ORDER: [Language; 2] = [Language::English, Language::Bengali];

/// Where the resolver is in its per-page decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveState {
    TryCombined,
    /// The combined pass succeeded but looked like noise.
    Disambiguate { combined: OcrAttempt },
    /// The combined pass errored.
    Degrade,
    Failed,
    Resolved(PageResult),
}

/// Chooses one text per page from one or more recognition passes.
pub struct OcrResolver<R> {
    recognizer: R,
    min_combined_chars: usize,
}

impl<R: TextRecognizer> OcrResolver<R> {
    pub fn new(recognizer: R) -> Self {
        Self {
            recognizer,
            min_combined_chars: DEFAULT_MIN_COMBINED_CHARS,
        }
    }

    pub fn with_min_combined_chars(mut self, min_combined_chars: usize) -> Self {
        self.min_combined_chars = min_combined_chars;
        self
    }

    pub fn recognizer(&self) -> &R {
        &self.recognizer
    }

    /// Resolve one page. Always yields a result; recognition failures end in
    /// a failure marker rather than an error.
    #[instrument(skip_all, fields(page = %image.index()))]
    pub fn resolve(&self, image: &EnhancedImage) -> PageResult {
        let mut state = ResolveState::TryCombined;
        loop {
            state = match self.step(image, state) {
                ResolveState::Resolved(result) => return result,
                next => next,
            };
        }
    }

    /// Advance the state machine by one transition.
    pub fn step(&self, image: &EnhancedImage, state: ResolveState) -> ResolveState {
        let page = image.index();
        match state {
            ResolveState::TryCombined => match self.attempt(image, LanguageMode::Combined) {
                Ok(combined) if combined.stripped_len() >= self.min_combined_chars => {
                    info!(page = %page, "Used ben+eng OCR for page {page}");
                    ResolveState::Resolved(PageResult::recognized(page, combined))
                }
                Ok(combined) => {
                    debug!(
                        page = %page,
                        stripped = combined.stripped_len(),
                        min = self.min_combined_chars,
                        "combined pass below threshold"
                    );
                    ResolveState::Disambiguate { combined }
                }
                Err(err) => {
                    warn!(page = %page, error = %err, "combined pass failed, degrading");
                    ResolveState::Degrade
                }
            },

            ResolveState::Disambiguate { combined } => {
                let winner = self.disambiguate(image, combined);
                info!(page = %page, mode = %winner.mode, "Used fallback OCR for page {page}");
                ResolveState::Resolved(PageResult::recognized(page, winner))
            }

            ResolveState::Degrade => {
                for language in SINGLE_LANGUAGE_ORDER {
                    match self.attempt(image, language.into()) {
                        Ok(attempt) => {
                            info!(page = %page, mode = %attempt.mode, "Used degraded OCR for page {page}");
                            return ResolveState::Resolved(PageResult::recognized(page, attempt));
                        }
                        Err(err) => {
                            warn!(page = %page, language = language.code(), error = %err, "single-language pass failed");
                        }
                    }
                }
                ResolveState::Failed
            }

            ResolveState::Failed => {
                error!(page = %page, "OCR failed for page {page}");
                ResolveState::Resolved(PageResult::failed(page))
            }

            resolved @ ResolveState::Resolved(_) => resolved,
        }
    }

    /// Run both single-language passes and keep the longer raw text.
    ///
    /// A pass that errors simply loses; if both error the combined text is
    /// all there is.
    fn disambiguate(&self, image: &EnhancedImage, combined: OcrAttempt) -> OcrAttempt {
        let [first, second] = SINGLE_LANGUAGE_ORDER.map(|language| {
            self.attempt(image, language.into())
                .inspect_err(|err| {
                    warn!(page = %image.index(), language = language.code(), error = %err, "fallback pass failed");
                })
                .ok()
        });
        match (first, second) {
            (Some(english), Some(bengali)) => pick_longer(english, bengali),
            (Some(only), None) | (None, Some(only)) => only,
            (None, None) => combined,
        }
    }

    fn attempt(&self, image: &EnhancedImage, mode: LanguageMode) -> lipikar_core::error::Result<OcrAttempt> {
        let text = self.recognizer.recognize(image, mode)?;
        debug!(page = %image.index(), mode = %mode, chars = text.chars().count(), "pass finished");
        Ok(OcrAttempt::new(mode, text))
    }
}

/// Length-as-confidence tie-break between the single-language passes.
///
/// Compares raw, untrimmed character counts. Bengali wins only when strictly
/// longer; equal lengths (including both empty) go to English.
pub fn pick_longer(english: OcrAttempt, bengali: OcrAttempt) -> OcrAttempt {
    if bengali.raw_len() > english.raw_len() {
        bengali
    } else {
        english
    }
}
