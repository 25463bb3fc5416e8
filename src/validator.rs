//! Heuristic quality validation of extraction results.
//!
//! There is no ground truth for "correct text", so acceptance is built from
//! proxies: the fraction of ordinary characters, the fraction of degenerate
//! tokens, output length plausibility against the page fingerprint, and the
//! backend's own confidence. The accept predicate is monotonic by
//! construction: with everything else fixed, a higher `clean_ratio` can
//! never turn an accept into a reject.

use crate::adapters::ExtractionResult;
use crate::fingerprint::PageFingerprint;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    /// Alphabetic token of garble length with no vowels, e.g. "xvqpzkl".
    /// Checked case-insensitively against each whitespace token.
    static ref NO_VOWEL_RE: Regex = Regex::new(r"^[b-df-hj-np-tv-xz]+$").unwrap();
}

/// Thresholds for the quality heuristics.
///
/// Defaults are tuning knobs, not derived constants; override via
/// [`crate::config::ExtractionConfig`] without recompiling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Minimum fraction of alphanumeric/space/common-punctuation characters.
    pub min_clean_ratio: f32,
    /// Maximum fraction of degenerate tokens.
    pub max_garbled_ratio: f32,
    /// Minimum backend self-confidence.
    pub confidence_floor: f32,
    /// Tokens shorter than this are never counted as no-vowel garble
    /// ("tv", "nth" and similar are ordinary English).
    pub min_garble_token_len: usize,
    /// A character repeated more than this many times in a row marks the
    /// token as degenerate.
    pub max_char_repeat: usize,
    /// Length plausibility applies only when the fingerprint estimates at
    /// least this many embedded characters.
    pub min_expected_chars: usize,
    /// Extracted length below this fraction of the fingerprint estimate is
    /// implausibly small.
    pub min_length_fraction: f32,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            min_clean_ratio: 0.85,
            max_garbled_ratio: 0.15,
            confidence_floor: 0.3,
            min_garble_token_len: 5,
            max_char_repeat: 3,
            min_expected_chars: 20,
            min_length_fraction: 0.05,
        }
    }
}

/// Why a result was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectReason {
    /// Output implausibly short for a page the fingerprint says has content.
    TooShort,
    /// Too many unusual characters.
    LowCleanRatio,
    /// Too many degenerate tokens.
    HighGarbledRatio,
    /// Backend self-confidence below the floor.
    LowConfidence,
}

/// Verdict on one extraction result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidationVerdict {
    /// Whether the result is accepted.
    pub accepted: bool,
    /// Fraction of clean characters in the extracted text.
    pub clean_ratio: f32,
    /// Fraction of degenerate tokens in the extracted text.
    pub garbled_ratio: f32,
    /// Rejection reason; `None` when accepted.
    pub reason: Option<RejectReason>,
}

/// Heuristic accept/reject gate for extraction results.
///
/// Stateless and pure: safe to share across concurrently running
/// orchestrators without locking.
#[derive(Debug, Clone, Default)]
pub struct QualityValidator {
    config: ValidatorConfig,
}

impl QualityValidator {
    /// Validator with default thresholds.
    pub fn new() -> Self {
        Self::with_config(ValidatorConfig::default())
    }

    /// Validator with custom thresholds.
    pub fn with_config(config: ValidatorConfig) -> Self {
        Self { config }
    }

    /// Thresholds in use.
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validate one extraction result against the page fingerprint.
    ///
    /// Checks run in a fixed order: length plausibility, clean ratio,
    /// garbled ratio, confidence floor. The first failing check names the
    /// rejection reason.
    pub fn validate(
        &self,
        result: &ExtractionResult,
        fingerprint: &PageFingerprint,
    ) -> ValidationVerdict {
        let text: String = result
            .blocks
            .iter()
            .map(|b| b.content.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        let clean_ratio = self.clean_ratio(&text);
        let garbled_ratio = self.garbled_ratio(&text);

        let reason = self.reject_reason(result, fingerprint, &text, clean_ratio, garbled_ratio);

        let verdict = ValidationVerdict {
            accepted: reason.is_none(),
            clean_ratio,
            garbled_ratio,
            reason,
        };

        log::debug!(
            "validate '{}': clean={:.3} garbled={:.3} confidence={:.2} -> {:?}",
            result.adapter_id,
            clean_ratio,
            garbled_ratio,
            result.confidence,
            verdict.reason
        );

        verdict
    }

    fn reject_reason(
        &self,
        result: &ExtractionResult,
        fingerprint: &PageFingerprint,
        text: &str,
        clean_ratio: f32,
        garbled_ratio: f32,
    ) -> Option<RejectReason> {
        let extracted_chars = text.chars().filter(|c| !c.is_whitespace()).count();
        let expected = fingerprint.estimated_char_count;
        if expected >= self.config.min_expected_chars
            && (extracted_chars as f32) < expected as f32 * self.config.min_length_fraction
            && !result.reports_blank()
        {
            return Some(RejectReason::TooShort);
        }

        if clean_ratio < self.config.min_clean_ratio {
            return Some(RejectReason::LowCleanRatio);
        }

        if garbled_ratio > self.config.max_garbled_ratio {
            return Some(RejectReason::HighGarbledRatio);
        }

        if result.confidence < self.config.confidence_floor {
            return Some(RejectReason::LowConfidence);
        }

        None
    }

    /// Fraction of characters that are alphanumeric, whitespace, or common
    /// punctuation. Empty text is 1.0 by convention so the length check
    /// alone owns rejection of empty output.
    pub fn clean_ratio(&self, text: &str) -> f32 {
        let total = text.chars().count();
        if total == 0 {
            return 1.0;
        }
        let clean = text
            .chars()
            .filter(|c| c.is_alphanumeric() || c.is_whitespace() || is_common_punctuation(*c))
            .count();
        clean as f32 / total as f32
    }

    /// Fraction of whitespace tokens matching a degenerate pattern: an
    /// alphabetic no-vowel run at or above the garble length, or a character
    /// immediately repeated past the repeat cap. Empty text is 0.0.
    pub fn garbled_ratio(&self, text: &str) -> f32 {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.is_empty() {
            return 0.0;
        }
        let garbled = tokens.iter().filter(|t| self.is_garbled_token(t)).count();
        garbled as f32 / tokens.len() as f32
    }

    fn is_garbled_token(&self, token: &str) -> bool {
        if token.chars().count() >= self.config.min_garble_token_len {
            let lowered = token.to_lowercase();
            if NO_VOWEL_RE.is_match(&lowered) {
                return true;
            }
        }
        has_excessive_repetition(token, self.config.max_char_repeat)
    }
}

/// Punctuation that ordinary prose is allowed to contain freely.
fn is_common_punctuation(c: char) -> bool {
    matches!(
        c,
        '.' | ',' | ';' | ':' | '!' | '?' | '\'' | '"' | '(' | ')' | '[' | ']' | '-' | '–' | '—'
            | '/' | '%' | '&' | '$' | '#' | '@' | '*' | '+' | '=' | '_' | '…' | '\u{2018}'
            | '\u{2019}' | '\u{201C}' | '\u{201D}'
    )
}

/// Any character immediately repeated more than `max_repeat` times.
fn has_excessive_repetition(token: &str, max_repeat: usize) -> bool {
    let mut run = 0usize;
    let mut prev: Option<char> = None;
    for c in token.chars() {
        if Some(c) == prev {
            run += 1;
            if run > max_repeat {
                return true;
            }
        } else {
            run = 1;
            prev = Some(c);
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{ExtractWarning, TextBlock};

    fn fingerprint(chars: usize) -> PageFingerprint {
        PageFingerprint {
            text_coverage: 0.2,
            image_coverage: 0.1,
            estimated_char_count: chars,
            is_scanned: false,
        }
    }

    fn result_with_text(text: &str) -> ExtractionResult {
        ExtractionResult::new("test", vec![TextBlock::text_only(text)]).with_confidence(0.9)
    }

    #[test]
    fn test_accepts_ordinary_prose() {
        let validator = QualityValidator::new();
        let result = result_with_text(
            "The committee reviewed the proposal on Tuesday. \
             Funding was approved for the next fiscal year, pending audit.",
        );
        let verdict = validator.validate(&result, &fingerprint(120));
        assert!(verdict.accepted, "rejected: {:?}", verdict.reason);
        assert!(verdict.clean_ratio > 0.95);
        assert!(verdict.garbled_ratio < 0.05);
    }

    #[test]
    fn test_rejects_gibberish() {
        let validator = QualityValidator::new();
        let result = result_with_text("xvqpz kljfdw qwrtpsk bcdfghj mnpqrst vwxzbcd");
        let verdict = validator.validate(&result, &fingerprint(0));
        assert!(!verdict.accepted);
        assert_eq!(verdict.reason, Some(RejectReason::HighGarbledRatio));
    }

    #[test]
    fn test_rejects_symbol_noise() {
        let validator = QualityValidator::new();
        let result = result_with_text("~~~ ^^^ <<>> ||| {{{ }}} \\\\ ~~~ ^^ <>");
        let verdict = validator.validate(&result, &fingerprint(0));
        assert!(!verdict.accepted);
        assert_eq!(verdict.reason, Some(RejectReason::LowCleanRatio));
    }

    #[test]
    fn test_rejects_short_output_for_nontrivial_page() {
        let validator = QualityValidator::new();
        let result = result_with_text("Hi");
        let verdict = validator.validate(&result, &fingerprint(5000));
        assert!(!verdict.accepted);
        assert_eq!(verdict.reason, Some(RejectReason::TooShort));
    }

    #[test]
    fn test_blank_report_bypasses_length_check() {
        let validator = QualityValidator::new();
        let result = ExtractionResult::new("test", vec![])
            .with_confidence(0.9)
            .with_warning(ExtractWarning::BlankPage);
        let verdict = validator.validate(&result, &fingerprint(5000));
        assert!(verdict.accepted, "rejected: {:?}", verdict.reason);
    }

    #[test]
    fn test_rejects_low_confidence() {
        let validator = QualityValidator::new();
        let result = ExtractionResult::new(
            "test",
            vec![TextBlock::text_only("Perfectly ordinary readable sentence here.")],
        )
        .with_confidence(0.1);
        let verdict = validator.validate(&result, &fingerprint(40));
        assert!(!verdict.accepted);
        assert_eq!(verdict.reason, Some(RejectReason::LowConfidence));
    }

    #[test]
    fn test_clean_ratio_boundary_rejected() {
        // clean_ratio below the 0.85 default is rejected regardless of
        // confidence.
        let validator = QualityValidator::new();
        // 8 clean chars out of 10 -> 0.80
        let result = ExtractionResult::new("test", vec![TextBlock::text_only("abcdefgh~^")])
            .with_confidence(1.0);
        let verdict = validator.validate(&result, &fingerprint(0));
        assert!((verdict.clean_ratio - 0.80).abs() < 1e-6);
        assert!(!verdict.accepted);
        assert_eq!(verdict.reason, Some(RejectReason::LowCleanRatio));
    }

    #[test]
    fn test_repetition_is_garbled() {
        let validator = QualityValidator::new();
        assert!(validator.is_garbled_token("aaaaaa"));
        assert!(validator.is_garbled_token("heeeeey"));
        assert!(!validator.is_garbled_token("bookkeeper"));
    }

    #[test]
    fn test_short_no_vowel_tokens_are_fine() {
        let validator = QualityValidator::new();
        assert!(!validator.is_garbled_token("tv"));
        assert!(!validator.is_garbled_token("nth"));
        assert!(validator.is_garbled_token("bcdfghj"));
    }

    #[test]
    fn test_empty_text_conventions() {
        let validator = QualityValidator::new();
        assert_eq!(validator.clean_ratio(""), 1.0);
        assert_eq!(validator.garbled_ratio(""), 0.0);
    }

    #[test]
    fn test_monotonic_in_clean_ratio() {
        // Same garble profile and confidence; adding clean characters can
        // only help. "abc~" repeated vs mostly clean text.
        let validator = QualityValidator::new();
        let dirty = result_with_text("ab~~ cd^^ ef<< gh>>");
        let cleaner = result_with_text("abcdefgh words more words ab~~");
        let fp = fingerprint(0);

        let dirty_verdict = validator.validate(&dirty, &fp);
        let cleaner_verdict = validator.validate(&cleaner, &fp);
        assert!(cleaner_verdict.clean_ratio > dirty_verdict.clean_ratio);
        // Dirty rejected, cleaner accepted: accept never flips back as the
        // ratio rises.
        assert!(!dirty_verdict.accepted);
        assert!(cleaner_verdict.accepted);
    }
}
