//! Configuration for adaptive extraction.
//!
//! Every numeric knob in the pipeline lives here so deployments can override
//! thresholds and budgets without recompiling: fingerprint classification
//! gates, validator thresholds, the fusion overlap cutoff, and timeout
//! budgets per adapter latency class.

use crate::adapters::LatencyClass;
use crate::fingerprint::FingerprintConfig;
use crate::fusion::FusionConfig;
use crate::validator::ValidatorConfig;
use std::time::Duration;

/// Per-attempt timeout budgets by adapter latency class.
///
/// OCR and other model-backed adapters need far larger budgets than
/// native-text extraction; the class is declared in the adapter's registry
/// descriptor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeoutConfig {
    /// Budget for [`LatencyClass::Fast`] adapters.
    pub fast: Duration,
    /// Budget for [`LatencyClass::Moderate`] adapters.
    pub moderate: Duration,
    /// Budget for [`LatencyClass::Heavy`] adapters.
    pub heavy: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            fast: Duration::from_secs(2),
            moderate: Duration::from_secs(10),
            heavy: Duration::from_secs(30),
        }
    }
}

impl TimeoutConfig {
    /// Budget for a latency class.
    pub fn budget(&self, latency: LatencyClass) -> Duration {
        match latency {
            LatencyClass::Fast => self.fast,
            LatencyClass::Moderate => self.moderate,
            LatencyClass::Heavy => self.heavy,
        }
    }
}

/// Top-level configuration for one orchestrator.
#[derive(Debug, Clone, Default)]
pub struct ExtractionConfig {
    /// Fingerprint classification thresholds.
    pub fingerprint: FingerprintConfig,
    /// Quality validation thresholds.
    pub validator: ValidatorConfig,
    /// Fusion overlap threshold.
    pub fusion: FusionConfig,
    /// Per-attempt timeout budgets.
    pub timeouts: TimeoutConfig,
    /// Optional whole-page deadline. When it expires the orchestrator
    /// returns the best result obtained so far through the degraded path;
    /// it never raises a hard error.
    pub document_timeout: Option<Duration>,
}

impl ExtractionConfig {
    /// Configuration with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override fingerprint thresholds.
    pub fn with_fingerprint(mut self, fingerprint: FingerprintConfig) -> Self {
        self.fingerprint = fingerprint;
        self
    }

    /// Override validator thresholds.
    pub fn with_validator(mut self, validator: ValidatorConfig) -> Self {
        self.validator = validator;
        self
    }

    /// Override the fusion overlap threshold.
    pub fn with_fusion(mut self, fusion: FusionConfig) -> Self {
        self.fusion = fusion;
        self
    }

    /// Override timeout budgets.
    pub fn with_timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Set a whole-page deadline.
    pub fn with_document_timeout(mut self, timeout: Duration) -> Self {
        self.document_timeout = Some(timeout);
        self
    }
}
