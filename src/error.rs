//! Error types for the extraction library.
//!
//! Most conditions in the extraction pipeline are recoverable and are handled
//! internally by the orchestrator (a failed adapter advances the fallback
//! chain, a rejected result is retained for fusion). The variants here cover
//! those recoverable adapter failures plus the few hard preconditions that
//! are surfaced to the caller.

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during adaptive extraction.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Adapter backend is not initialized or not present on this system.
    ///
    /// Non-fatal to the orchestrator: the attempt is skipped and the
    /// fallback chain advances.
    #[error("adapter unavailable: {0}")]
    AdapterUnavailable(String),

    /// Adapter ran but failed to produce a result.
    ///
    /// Non-fatal to the orchestrator: the attempt is skipped and the
    /// fallback chain advances.
    #[error("extraction failed: {0}")]
    ExtractionFailed(String),

    /// Adapter exceeded its per-attempt time budget.
    ///
    /// Treated exactly like [`Error::ExtractionFailed`] by the orchestrator.
    #[error("extraction timed out after {elapsed_ms} ms (budget {budget_ms} ms)")]
    Timeout {
        /// Time the attempt actually took, in milliseconds.
        elapsed_ms: u64,
        /// Budget the attempt was given, in milliseconds.
        budget_ms: u64,
    },

    /// Page descriptor violates preconditions (non-finite or negative
    /// structural facts, non-positive page area).
    ///
    /// This is the only hard failure surfaced to the caller.
    #[error("invalid page descriptor: {0}")]
    InvalidPage(String),

    /// No adapters are registered; a fallback chain cannot be built.
    #[error("adapter registry is empty")]
    EmptyRegistry,

    /// Adapter referenced by a fallback chain is not in the registry.
    #[error("unknown adapter id: {0}")]
    UnknownAdapter(String),
}

impl Error {
    /// Whether the orchestrator may skip past this error to the next
    /// adapter in the fallback chain.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::AdapterUnavailable(_) | Error::ExtractionFailed(_) | Error::Timeout { .. }
        )
    }
}
