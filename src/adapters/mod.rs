//! The capability interface wrapped around each extraction backend.
//!
//! Every backend family (native text, OCR, structural layout) is wrapped in
//! one [`ExtractionAdapter`] implementation. The orchestrator only ever sees
//! this trait plus the capability tags in [`AdapterDescriptor`]; backend
//! variants are selected by registry lookup, never by downcasting or
//! subclass-style dispatch.
//!
//! Adapters may hold expensive warm state (a loaded model, a renderer
//! session) across calls. That state is owned by the adapter instance and
//! injected at construction, never ambient, so orchestrators stay
//! independently testable. Per-page state must not leak between unrelated
//! `attempt` calls.

pub mod registry;

pub use registry::AdapterRegistry;

use crate::error::Result;
use crate::geometry::Rect;
use crate::page::PageHandle;
use crate::validator::RejectReason;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Self-confidence an adapter reports when its backend has no native notion
/// of confidence.
pub const DEFAULT_CONFIDENCE: f32 = 0.5;

/// Which source a block's content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockOrigin {
    /// Produced by a geometry-reliable backend.
    Geometry,
    /// Produced by a text-reliable backend.
    Text,
    /// Geometry from one backend, content from another.
    Fused,
}

/// One extracted block of text, with page-space geometry when the backend
/// provides it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Extracted content. May be empty for an unmatched fused block.
    pub content: String,
    /// Bounding box in page space, if the backend reports geometry.
    pub bbox: Option<Rect>,
    /// Provenance of the content.
    pub origin: BlockOrigin,
}

impl TextBlock {
    /// Block with geometry and content from the same backend.
    pub fn new(content: impl Into<String>, bbox: Option<Rect>, origin: BlockOrigin) -> Self {
        Self {
            content: content.into(),
            bbox,
            origin,
        }
    }

    /// Content-only block from a backend with no layout.
    pub fn text_only(content: impl Into<String>) -> Self {
        Self::new(content, None, BlockOrigin::Text)
    }
}

/// Non-fatal conditions recorded while producing a result.
///
/// Warnings are itemized (a fusion gap carries the index of the geometry
/// block it left empty) and collected in insertion-ordered sets, so callers
/// can both count and display them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExtractWarning {
    /// The adapter explicitly reports the page as blank.
    BlankPage,
    /// Fusion found no text for the geometry block at this index.
    FusionGap {
        /// Index of the geometry block left without content.
        block: usize,
    },
    /// An adapter in the chain was skipped because its backend was not
    /// initialized.
    AdapterUnavailable {
        /// Adapter that was skipped.
        adapter: String,
    },
    /// An adapter in the chain ran but failed.
    AdapterFailed {
        /// Adapter that failed.
        adapter: String,
    },
    /// An adapter exceeded its per-attempt budget.
    AdapterTimedOut {
        /// Adapter that timed out.
        adapter: String,
    },
    /// An adapter produced output that did not validate.
    ValidationRejected {
        /// Adapter whose output was rejected.
        adapter: String,
        /// Why the validator rejected it.
        reason: RejectReason,
    },
    /// The document-level deadline expired before the chain finished.
    DocumentTimeout,
}

/// Set of warnings, deduplicated, in first-seen order.
pub type WarningSet = IndexSet<ExtractWarning>;

/// Output of one adapter attempt.
///
/// Discarded unless accepted by the validator or retained as a fusion
/// candidate after rejection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Adapter that produced this result.
    pub adapter_id: String,
    /// Extracted blocks in reading order. Possibly empty.
    pub blocks: Vec<TextBlock>,
    /// Backend self-confidence in [0, 1].
    pub confidence: f32,
    /// Non-fatal conditions hit while extracting.
    pub warnings: WarningSet,
    /// Wall-clock time the attempt took.
    #[serde(skip)]
    pub elapsed: Duration,
}

impl ExtractionResult {
    /// Result with the default self-confidence.
    pub fn new(adapter_id: impl Into<String>, blocks: Vec<TextBlock>) -> Self {
        Self {
            adapter_id: adapter_id.into(),
            blocks,
            confidence: DEFAULT_CONFIDENCE,
            warnings: WarningSet::new(),
            elapsed: Duration::ZERO,
        }
    }

    /// Set the backend's self-confidence, clamped to [0, 1].
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    /// Record a warning.
    pub fn with_warning(mut self, warning: ExtractWarning) -> Self {
        self.warnings.insert(warning);
        self
    }

    /// Total extracted character count across all blocks.
    pub fn char_count(&self) -> usize {
        self.blocks.iter().map(|b| b.content.chars().count()).sum()
    }

    /// Whether the adapter explicitly reported the page as blank.
    pub fn reports_blank(&self) -> bool {
        self.warnings.contains(&ExtractWarning::BlankPage)
    }

    /// Whether every block carries a bounding box (and there is at least
    /// one block). Fusion needs this on the geometry side.
    pub fn has_full_geometry(&self) -> bool {
        !self.blocks.is_empty() && self.blocks.iter().all(|b| b.bbox.is_some())
    }
}

/// Backend family an adapter wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdapterFamily {
    /// Embedded-text extraction from the document's own content.
    NativeText,
    /// Optical character recognition over a rasterized page.
    Ocr,
    /// Structural/layout understanding: trustworthy geometry, weak text.
    HybridLayout,
}

/// Rough cost class of an adapter, mapped to a timeout budget by
/// [`crate::config::TimeoutConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LatencyClass {
    /// Native-text class: milliseconds per page.
    Fast,
    /// Layout analysis class.
    Moderate,
    /// Model inference class (OCR).
    Heavy,
}

/// How an adapter handles concurrent `attempt` calls over its shared
/// backend resource. Documented per adapter in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConcurrencyMode {
    /// Safe to call from multiple orchestrators at once.
    Concurrent,
    /// Internally serializes access to a shared resource.
    Serialized,
}

/// Capability tags for one registered adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdapterDescriptor {
    /// Unique adapter identifier, e.g. `"native-text"`.
    pub id: String,
    /// Backend family.
    pub family: AdapterFamily,
    /// Whether results carry trustworthy bounding boxes.
    pub provides_geometry: bool,
    /// Whether results carry trustworthy content.
    pub provides_text: bool,
    /// Cost class, used for the per-attempt timeout budget.
    pub latency: LatencyClass,
    /// Concurrency contract of the backing resource.
    pub concurrency: ConcurrencyMode,
}

impl AdapterDescriptor {
    /// Descriptor with the typical tags for a backend family: native text
    /// and OCR provide text, layout backends provide geometry; latency
    /// follows the family's usual cost.
    pub fn for_family(id: impl Into<String>, family: AdapterFamily) -> Self {
        let (provides_geometry, provides_text, latency) = match family {
            AdapterFamily::NativeText => (false, true, LatencyClass::Fast),
            AdapterFamily::Ocr => (false, true, LatencyClass::Heavy),
            AdapterFamily::HybridLayout => (true, false, LatencyClass::Moderate),
        };
        Self {
            id: id.into(),
            family,
            provides_geometry,
            provides_text,
            latency,
            concurrency: ConcurrencyMode::Concurrent,
        }
    }

    /// Override the geometry capability tag.
    pub fn with_geometry(mut self, provides_geometry: bool) -> Self {
        self.provides_geometry = provides_geometry;
        self
    }

    /// Override the text capability tag.
    pub fn with_text(mut self, provides_text: bool) -> Self {
        self.provides_text = provides_text;
        self
    }

    /// Override the latency class.
    pub fn with_latency(mut self, latency: LatencyClass) -> Self {
        self.latency = latency;
        self
    }

    /// Override the concurrency contract.
    pub fn with_concurrency(mut self, concurrency: ConcurrencyMode) -> Self {
        self.concurrency = concurrency;
        self
    }
}

/// Uniform wrapper around one extraction backend.
///
/// # Contract
///
/// - `attempt` is a bounded, blocking unit of work; implementations must
///   honor `timeout` even when the backend parallelizes internally.
/// - Failure is [`crate::Error::AdapterUnavailable`] (backend not
///   initialized) or [`crate::Error::ExtractionFailed`] (ran but errored);
///   both are non-fatal to the orchestrator.
/// - A successful result always reports blocks (possibly empty), a
///   confidence in [0, 1] ([`DEFAULT_CONFIDENCE`] when the backend has
///   none), and bounding boxes when available.
/// - Implementations must be `Send + Sync`; a shared expensive resource is
///   either safe for concurrent calls or internally serialized, as declared
///   by [`AdapterDescriptor::concurrency`].
pub trait ExtractionAdapter: Send + Sync {
    /// Capability tags for this adapter.
    fn descriptor(&self) -> &AdapterDescriptor;

    /// Run one extraction attempt against a page.
    fn attempt(&self, page: &PageHandle, timeout: Duration) -> Result<ExtractionResult>;
}
