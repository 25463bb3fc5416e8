//! Fallback-chain selection from a page fingerprint.
//!
//! Maps a fingerprint class to a preference order over backend families,
//! then expands that to concrete adapter IDs from the registry. Pure and
//! deterministic: the same `(fingerprint, registry)` pair always yields the
//! same chain, which is what makes extraction runs reproducible.

use crate::adapters::{AdapterFamily, AdapterRegistry};
use crate::error::{Error, Result};
use crate::fingerprint::{FingerprintConfig, PageClass, PageFingerprint};

/// Builds the ordered fallback chain for one page.
#[derive(Debug, Clone, Default)]
pub struct MethodSelector {
    fingerprint_config: FingerprintConfig,
}

impl MethodSelector {
    /// Selector using default fingerprint classification thresholds.
    pub fn new() -> Self {
        Self::with_config(FingerprintConfig::default())
    }

    /// Selector with custom classification thresholds.
    pub fn with_config(fingerprint_config: FingerprintConfig) -> Self {
        Self { fingerprint_config }
    }

    /// Family preference order for a page class.
    ///
    /// - Scanned: OCR first (the embedded text is absent or junk), layout
    ///   second, native last.
    /// - Text-rich: native first, layout as the second opinion.
    /// - Mixed/uncertain: layout first, then native, then OCR.
    fn family_preference(class: PageClass) -> &'static [AdapterFamily] {
        match class {
            PageClass::Scanned => &[
                AdapterFamily::Ocr,
                AdapterFamily::HybridLayout,
                AdapterFamily::NativeText,
            ],
            PageClass::NativeTextRich => {
                &[AdapterFamily::NativeText, AdapterFamily::HybridLayout]
            },
            PageClass::Mixed => &[
                AdapterFamily::HybridLayout,
                AdapterFamily::NativeText,
                AdapterFamily::Ocr,
            ],
        }
    }

    /// Build the fallback chain of adapter IDs for a fingerprint.
    ///
    /// The chain lists, for each preferred family in order, every registered
    /// adapter of that family in registration order. A native-text adapter
    /// is appended last as the guaranteed baseline when the preference order
    /// did not already include one. If no preferred family has a registered
    /// adapter at all, every registered adapter is used in registration
    /// order — the chain is never empty for a non-empty registry.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyRegistry`] when no adapters are registered.
    pub fn select(
        &self,
        fingerprint: &PageFingerprint,
        registry: &AdapterRegistry,
    ) -> Result<Vec<String>> {
        if registry.is_empty() {
            return Err(Error::EmptyRegistry);
        }

        let class = fingerprint.class(&self.fingerprint_config);
        let preference = Self::family_preference(class);

        let mut chain: Vec<String> = Vec::new();
        for family in preference {
            for descriptor in registry.descriptors() {
                if descriptor.family == *family && !chain.contains(&descriptor.id) {
                    chain.push(descriptor.id.clone());
                }
            }
        }

        // Guaranteed baseline: any native-text adapter the preference order
        // missed is appended at the end of the chain.
        for descriptor in registry.descriptors() {
            if descriptor.family == AdapterFamily::NativeText && !chain.contains(&descriptor.id) {
                chain.push(descriptor.id.clone());
            }
        }

        if chain.is_empty() {
            // Registry has adapters, just none of the preferred families.
            chain.extend(registry.descriptors().map(|d| d.id.clone()));
        }

        log::debug!("selected chain for {:?} page: {:?}", class, chain);
        Ok(chain)
    }
}
