//! Page-level inputs from the structural parser collaborator.
//!
//! The extraction pipeline never parses document bytes itself. The parser
//! hands it a [`PageDescriptor`] of structural facts, and adapters receive a
//! [`PageHandle`] that identifies the page to their own backend.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Structural facts about one rendered page, produced by the parser.
///
/// These are facts, not judgements: classification happens in
/// [`crate::fingerprint::PageFingerprinter`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageDescriptor {
    /// Number of embedded text characters reported by the parser.
    pub embedded_char_count: usize,
    /// Fraction of the page area covered by raster images, in [0, 1].
    pub image_area_fraction: f32,
    /// Page width in points.
    pub width: f32,
    /// Page height in points.
    pub height: f32,
}

impl PageDescriptor {
    /// Create a descriptor from parser facts.
    pub fn new(embedded_char_count: usize, image_area_fraction: f32, width: f32, height: f32) -> Self {
        Self {
            embedded_char_count,
            image_area_fraction,
            width,
            height,
        }
    }

    /// Check descriptor preconditions.
    ///
    /// A descriptor with non-finite fields, a negative image fraction, or a
    /// non-positive page area cannot be fingerprinted; this is the one hard
    /// failure the pipeline surfaces to the caller.
    pub fn validate(&self) -> Result<()> {
        if !self.width.is_finite() || !self.height.is_finite() {
            return Err(Error::InvalidPage("non-finite page dimensions".to_string()));
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(Error::InvalidPage(format!(
                "non-positive page area: {} x {}",
                self.width, self.height
            )));
        }
        if !self.image_area_fraction.is_finite() || self.image_area_fraction < 0.0 {
            return Err(Error::InvalidPage(format!(
                "invalid image area fraction: {}",
                self.image_area_fraction
            )));
        }
        Ok(())
    }

    /// Page area in square points.
    pub fn area(&self) -> f32 {
        self.width * self.height
    }
}

/// Identifies one page to an adapter backend.
///
/// Adapters hold their own warm backend state (renderer, model session) and
/// resolve the page through it using this handle; the handle itself carries
/// no backend resources, so it is cheap to copy between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageHandle {
    /// Zero-based page index within the source document.
    pub index: usize,
    /// Structural facts for this page.
    pub descriptor: PageDescriptor,
}

impl PageHandle {
    /// Create a handle for the given page index and descriptor.
    pub fn new(index: usize, descriptor: PageDescriptor) -> Self {
        Self { index, descriptor }
    }
}
