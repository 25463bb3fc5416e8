//! # textlift
//!
//! Adaptive text extraction for rendered document pages when no single
//! extraction backend can be trusted fully: some backends produce accurate
//! geometry but garbled text, others accurate text but no layout, others are
//! reliable only on certain page types (scanned vs. digital-native).
//!
//! ## How it works
//!
//! 1. **Fingerprint** the page from structural facts (text/image coverage).
//! 2. **Select** an ordered fallback chain of backends for that fingerprint.
//! 3. **Attempt** each backend in turn, with per-attempt timeout budgets.
//! 4. **Validate** output heuristically — there is no ground truth, so
//!    acceptance is built from character cleanliness, degenerate-token
//!    ratios, length plausibility, and backend confidence.
//! 5. **Fuse** trustworthy geometry from one rejected result with
//!    trustworthy text from another when neither alone validates.
//! 6. **Degrade** gracefully: the caller always receives a [`Document`],
//!    at worst the best-effort attempt flagged `degraded`, never an error
//!    for a recoverable condition.
//!
//! The document parser, rasterizer, OCR models, and UI are external
//! collaborators: backends plug in through the
//! [`ExtractionAdapter`](adapters::ExtractionAdapter) trait and are
//! enumerated by an [`AdapterRegistry`](adapters::AdapterRegistry).
//!
//! ## Quick start
//!
//! ```ignore
//! use textlift::{AdapterRegistry, Orchestrator, PageDescriptor, PageHandle};
//!
//! let mut registry = AdapterRegistry::new();
//! registry.register(my_native_text_adapter);
//! registry.register(my_ocr_adapter);
//!
//! let orchestrator = Orchestrator::new(registry);
//! let page = PageHandle::new(0, PageDescriptor::new(1850, 0.12, 612.0, 792.0));
//! let document = orchestrator.extract_page(&page)?;
//! for block in &document.blocks {
//!     println!("{}", block.content);
//! }
//! # Ok::<(), textlift::Error>(())
//! ```

#![warn(missing_docs)]

// Error handling
pub mod error;

// Geometric primitives
pub mod geometry;

// Collaborator inputs
pub mod page;

// Page classification
pub mod fingerprint;

// Backend capability interface and registry
pub mod adapters;

// Fallback-chain selection
pub mod selector;

// Heuristic quality validation
pub mod validator;

// Geometry/text fusion
pub mod fusion;

// The extraction state machine
pub mod orchestrator;

// Configuration
pub mod config;

// Re-exports
pub use adapters::{
    AdapterDescriptor, AdapterFamily, AdapterRegistry, BlockOrigin, ConcurrencyMode,
    ExtractWarning, ExtractionAdapter, ExtractionResult, LatencyClass, TextBlock, WarningSet,
};
pub use config::{ExtractionConfig, TimeoutConfig};
pub use error::{Error, Result};
pub use fingerprint::{FingerprintConfig, PageClass, PageFingerprint, PageFingerprinter};
pub use fusion::{FusionConfig, LayoutFuser};
pub use orchestrator::{Document, Orchestrator};
pub use page::{PageDescriptor, PageHandle};
pub use selector::MethodSelector;
pub use validator::{QualityValidator, RejectReason, ValidationVerdict, ValidatorConfig};

// Version info
/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(VERSION.starts_with("0."));
    }

    #[test]
    fn test_name() {
        assert_eq!(NAME, "textlift");
    }
}
