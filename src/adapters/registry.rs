//! Adapter registry: the collaborator-provided catalog of backends.
//!
//! Insertion order is preserved and meaningful: the selector enumerates
//! adapters of a family in registry order, so two runs over the same
//! registry always build the same fallback chain.

use crate::adapters::{AdapterDescriptor, ExtractionAdapter};
use indexmap::IndexMap;
use std::sync::Arc;

/// Registry of available extraction adapters, keyed by adapter ID.
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: IndexMap<String, Arc<dyn ExtractionAdapter>>,
}

impl AdapterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            adapters: IndexMap::new(),
        }
    }

    /// Register an adapter under its descriptor ID.
    ///
    /// Re-registering an ID replaces the previous adapter; the last
    /// registration wins.
    pub fn register(&mut self, adapter: Arc<dyn ExtractionAdapter>) {
        let id = adapter.descriptor().id.clone();
        if self.adapters.insert(id.clone(), adapter).is_some() {
            log::warn!("adapter '{}' re-registered, replacing previous instance", id);
        }
    }

    /// Look up an adapter by ID.
    pub fn get(&self, id: &str) -> Option<&Arc<dyn ExtractionAdapter>> {
        self.adapters.get(id)
    }

    /// Look up an adapter's capability tags by ID.
    pub fn descriptor(&self, id: &str) -> Option<&AdapterDescriptor> {
        self.adapters.get(id).map(|a| a.descriptor())
    }

    /// Capability tags of every registered adapter, in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &AdapterDescriptor> {
        self.adapters.values().map(|a| a.descriptor())
    }

    /// Number of registered adapters.
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    /// Whether the registry has no adapters.
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("adapters", &self.adapters.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{AdapterFamily, ExtractionResult};
    use crate::error::Result;
    use crate::page::PageHandle;
    use std::time::Duration;

    struct NoopAdapter {
        descriptor: AdapterDescriptor,
    }

    impl NoopAdapter {
        fn new(id: &str, family: AdapterFamily) -> Arc<Self> {
            Arc::new(Self {
                descriptor: AdapterDescriptor::for_family(id, family),
            })
        }
    }

    impl ExtractionAdapter for NoopAdapter {
        fn descriptor(&self) -> &AdapterDescriptor {
            &self.descriptor
        }

        fn attempt(&self, _page: &PageHandle, _timeout: Duration) -> Result<ExtractionResult> {
            Ok(ExtractionResult::new(self.descriptor.id.clone(), vec![]))
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = AdapterRegistry::new();
        registry.register(NoopAdapter::new("native-text", AdapterFamily::NativeText));
        registry.register(NoopAdapter::new("ocr", AdapterFamily::Ocr));

        assert_eq!(registry.len(), 2);
        assert!(registry.get("ocr").is_some());
        assert!(registry.get("missing").is_none());
        assert_eq!(
            registry.descriptor("native-text").map(|d| d.family),
            Some(AdapterFamily::NativeText)
        );
    }

    #[test]
    fn test_registration_order_preserved() {
        let mut registry = AdapterRegistry::new();
        registry.register(NoopAdapter::new("c", AdapterFamily::Ocr));
        registry.register(NoopAdapter::new("a", AdapterFamily::NativeText));
        registry.register(NoopAdapter::new("b", AdapterFamily::HybridLayout));

        let ids: Vec<&str> = registry.descriptors().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_duplicate_id_replaces() {
        let mut registry = AdapterRegistry::new();
        registry.register(NoopAdapter::new("x", AdapterFamily::NativeText));
        registry.register(NoopAdapter::new("x", AdapterFamily::Ocr));

        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.descriptor("x").map(|d| d.family),
            Some(AdapterFamily::Ocr)
        );
    }

    #[test]
    fn test_empty_registry() {
        let registry = AdapterRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }
}
