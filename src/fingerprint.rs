//! Page fingerprinting for extraction routing.
//!
//! Classifies a page from structural facts (embedded text coverage, image
//! coverage) before any extraction runs. The fingerprint is derived once per
//! page, is immutable, and drives method selection: a scanned page wants OCR
//! first, a text-rich digital page wants the native extractor first.

use crate::page::PageDescriptor;
use serde::{Deserialize, Serialize};

/// Nominal area of one rendered glyph in square points, used to turn a
/// character count into an approximate text coverage fraction.
const NOMINAL_GLYPH_AREA: f32 = 10.0;

/// Thresholds for fingerprint classification.
///
/// Heuristic tuning knobs, not a fixed contract; calibrate against a labeled
/// corpus before trusting them on a new document population.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FingerprintConfig {
    /// A page is scanned when text coverage is below this...
    pub scanned_text_coverage_max: f32,
    /// ...and image coverage is above this.
    pub scanned_image_coverage_min: f32,
    /// Text coverage at or above this classifies a page as text-rich.
    pub rich_text_coverage_min: f32,
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            scanned_text_coverage_max: 0.02,
            scanned_image_coverage_min: 0.5,
            rich_text_coverage_min: 0.15,
        }
    }
}

/// Derived summary of a page's text/image composition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageFingerprint {
    /// Fraction of the page area covered by embedded text, in [0, 1].
    pub text_coverage: f32,
    /// Fraction of the page area covered by raster images, in [0, 1].
    pub image_coverage: f32,
    /// Embedded character count reported by the parser.
    pub estimated_char_count: usize,
    /// True when the page looks like a scan: almost no embedded text over a
    /// large image.
    pub is_scanned: bool,
}

impl PageFingerprint {
    /// Classify this fingerprint for method selection.
    pub fn class(&self, config: &FingerprintConfig) -> PageClass {
        if self.is_scanned {
            PageClass::Scanned
        } else if self.text_coverage >= config.rich_text_coverage_min {
            PageClass::NativeTextRich
        } else {
            PageClass::Mixed
        }
    }

    /// Whether the fingerprint indicates non-trivial page content.
    ///
    /// Used by the output contract: a non-trivial page never yields an empty
    /// document unless every attempted adapter itself returned zero blocks.
    pub fn has_content(&self) -> bool {
        self.estimated_char_count > 0 || self.image_coverage > 0.0
    }
}

/// Page classification driving fallback-chain selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageClass {
    /// Low text coverage over a dominant image: a scanned page.
    Scanned,
    /// Digital-native page with substantial embedded text.
    NativeTextRich,
    /// Neither clearly scanned nor clearly text-rich.
    Mixed,
}

/// Derives a [`PageFingerprint`] from parser facts.
///
/// Pure and deterministic: no I/O, no shared state, safe to call
/// concurrently.
#[derive(Debug, Clone, Default)]
pub struct PageFingerprinter {
    config: FingerprintConfig,
}

impl PageFingerprinter {
    /// Create a fingerprinter with default thresholds.
    pub fn new() -> Self {
        Self::with_config(FingerprintConfig::default())
    }

    /// Create a fingerprinter with custom thresholds.
    pub fn with_config(config: FingerprintConfig) -> Self {
        Self { config }
    }

    /// Thresholds in use.
    pub fn config(&self) -> &FingerprintConfig {
        &self.config
    }

    /// Derive the fingerprint for one page.
    ///
    /// Text coverage is estimated as character count times a nominal glyph
    /// area over the page area; both coverages are clamped to [0, 1]. The
    /// caller must have validated the descriptor first.
    pub fn fingerprint(&self, descriptor: &PageDescriptor) -> PageFingerprint {
        let text_area = descriptor.embedded_char_count as f32 * NOMINAL_GLYPH_AREA;
        let text_coverage = (text_area / descriptor.area()).clamp(0.0, 1.0);
        let image_coverage = descriptor.image_area_fraction.clamp(0.0, 1.0);

        let is_scanned = text_coverage < self.config.scanned_text_coverage_max
            && image_coverage > self.config.scanned_image_coverage_min;

        let fp = PageFingerprint {
            text_coverage,
            image_coverage,
            estimated_char_count: descriptor.embedded_char_count,
            is_scanned,
        };

        log::debug!(
            "fingerprint: text={:.3} image={:.3} chars={} class={:?}",
            fp.text_coverage,
            fp.image_coverage,
            fp.estimated_char_count,
            fp.class(&self.config)
        );

        fp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(chars: usize, image_fraction: f32) -> PageDescriptor {
        PageDescriptor::new(chars, image_fraction, 612.0, 792.0)
    }

    #[test]
    fn test_scanned_page() {
        // Almost no embedded text, full-page image
        let fp = PageFingerprinter::new().fingerprint(&descriptor(10, 0.95));
        assert!(fp.is_scanned);
        assert_eq!(fp.class(&FingerprintConfig::default()), PageClass::Scanned);
    }

    #[test]
    fn test_text_rich_page() {
        // 30k chars on US Letter is well past the rich threshold
        let fp = PageFingerprinter::new().fingerprint(&descriptor(30_000, 0.05));
        assert!(!fp.is_scanned);
        assert_eq!(
            fp.class(&FingerprintConfig::default()),
            PageClass::NativeTextRich
        );
    }

    #[test]
    fn test_mixed_page() {
        let fp = PageFingerprinter::new().fingerprint(&descriptor(500, 0.3));
        assert!(!fp.is_scanned);
        assert_eq!(fp.class(&FingerprintConfig::default()), PageClass::Mixed);
    }

    #[test]
    fn test_coverage_clamped() {
        // Absurd char count must still clamp to 1.0
        let fp = PageFingerprinter::new().fingerprint(&descriptor(10_000_000, 1.5));
        assert_eq!(fp.text_coverage, 1.0);
        assert_eq!(fp.image_coverage, 1.0);
    }

    #[test]
    fn test_coverages_are_independent() {
        // Text and image coverage need not sum to 1
        let fp = PageFingerprinter::new().fingerprint(&descriptor(30_000, 0.9));
        assert!(fp.text_coverage + fp.image_coverage > 1.0);
    }

    #[test]
    fn test_empty_page_has_no_content() {
        let fp = PageFingerprinter::new().fingerprint(&descriptor(0, 0.0));
        assert!(!fp.has_content());
        assert!(!fp.is_scanned);
    }

    #[test]
    fn test_deterministic() {
        let fingerprinter = PageFingerprinter::new();
        let desc = descriptor(1234, 0.42);
        assert_eq!(fingerprinter.fingerprint(&desc), fingerprinter.fingerprint(&desc));
    }

    #[test]
    fn test_custom_thresholds() {
        let config = FingerprintConfig {
            scanned_text_coverage_max: 0.5,
            scanned_image_coverage_min: 0.1,
            rich_text_coverage_min: 0.9,
        };
        let fp = PageFingerprinter::with_config(config).fingerprint(&descriptor(500, 0.3));
        assert!(fp.is_scanned);
    }
}
