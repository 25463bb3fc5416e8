//! The adaptive extraction state machine.
//!
//! Drives one page through `Fingerprinting -> Selecting -> Attempting(i) ->
//! Validating(i) -> {Accepted | NextAttempt | Fusing | Exhausted}`. States
//! are explicit tags rather than nested conditionals so transition coverage
//! stays testable.
//!
//! The orchestrator never loses work: rejected results are retained as
//! fusion candidates, fusion runs at most once per page, and when nothing
//! validates the caller still receives the highest-confidence attempt with
//! `degraded = true`. The only hard failure surfaced here is an invalid
//! page descriptor.

use crate::adapters::{
    AdapterRegistry, ExtractWarning, ExtractionResult, TextBlock, WarningSet,
};
use crate::config::ExtractionConfig;
use crate::error::{Error, Result};
use crate::fingerprint::{PageFingerprint, PageFingerprinter};
use crate::fusion::LayoutFuser;
use crate::page::{PageDescriptor, PageHandle};
use crate::selector::MethodSelector;
use crate::validator::QualityValidator;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Final output for one page, owned by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Extracted blocks in reading order.
    pub blocks: Vec<TextBlock>,
    /// True when no attempt validated and this is the best-effort fallback.
    pub degraded: bool,
    /// Every non-fatal condition hit along the way, itemized.
    pub warnings: WarningSet,
    /// Adapter (or fused pair) that produced the blocks, when any attempt
    /// produced output.
    pub source: Option<String>,
}

/// One page's pass through the extraction state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Derive the page fingerprint from structural facts.
    Fingerprinting,
    /// Build the fallback chain for the fingerprint.
    Selecting,
    /// Invoke chain entry `i`.
    Attempting(usize),
    /// Judge the result of chain entry `i`.
    Validating(usize),
    /// Merge a retained geometry result with a retained text result, then
    /// resume the chain at `i` if the merge does not validate.
    Fusing(usize),
    /// Nothing validated; return the best attempt, degraded.
    Exhausted,
}

/// A rejected or fused-and-rejected result retained for fusion and for the
/// degraded fallback.
#[derive(Debug, Clone)]
struct RetainedAttempt {
    result: ExtractionResult,
    provides_geometry: bool,
    provides_text: bool,
}

/// Drives fingerprint, selection, attempts, validation, and fusion for one
/// page at a time.
///
/// All shared components are stateless or internally synchronized, so one
/// orchestrator can serve pages from multiple threads, and multiple
/// orchestrators can share a registry.
pub struct Orchestrator {
    registry: AdapterRegistry,
    fingerprinter: PageFingerprinter,
    selector: MethodSelector,
    validator: QualityValidator,
    fuser: LayoutFuser,
    config: ExtractionConfig,
}

impl Orchestrator {
    /// Orchestrator over a registry with default configuration.
    pub fn new(registry: AdapterRegistry) -> Self {
        Self::with_config(registry, ExtractionConfig::default())
    }

    /// Orchestrator with custom thresholds and budgets.
    pub fn with_config(registry: AdapterRegistry, config: ExtractionConfig) -> Self {
        Self {
            registry,
            fingerprinter: PageFingerprinter::with_config(config.fingerprint),
            selector: MethodSelector::with_config(config.fingerprint),
            validator: QualityValidator::with_config(config.validator),
            fuser: LayoutFuser::with_config(config.fusion),
            config,
        }
    }

    /// Configuration in use.
    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extract one page.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidPage`] for a descriptor that violates preconditions,
    /// [`Error::EmptyRegistry`] when no adapters are registered. Everything
    /// else resolves internally into an accepted or degraded [`Document`].
    pub fn extract_page(&self, page: &PageHandle) -> Result<Document> {
        let started = Instant::now();
        let deadline = self.config.document_timeout.map(|t| started + t);

        let mut state = State::Fingerprinting;
        let mut fingerprint: Option<PageFingerprint> = None;
        let mut chain: Vec<String> = Vec::new();
        let mut pending: Option<ExtractionResult> = None;
        let mut retained: Vec<RetainedAttempt> = Vec::new();
        let mut warnings = WarningSet::new();
        let mut fusion_attempted = false;

        loop {
            match state {
                State::Fingerprinting => {
                    page.descriptor.validate()?;
                    fingerprint = Some(self.fingerprinter.fingerprint(&page.descriptor));
                    state = State::Selecting;
                },

                State::Selecting => {
                    let fp = fingerprint.as_ref().expect("fingerprint set");
                    chain = self.selector.select(fp, &self.registry)?;
                    log::info!(
                        "page {}: fallback chain {:?}",
                        page.index,
                        chain
                    );
                    state = State::Attempting(0);
                },

                State::Attempting(i) => {
                    if i >= chain.len() {
                        state = State::Exhausted;
                        continue;
                    }
                    if let Some(deadline) = deadline {
                        if Instant::now() >= deadline {
                            log::warn!("page {}: document deadline expired", page.index);
                            warnings.insert(ExtractWarning::DocumentTimeout);
                            state = State::Exhausted;
                            continue;
                        }
                    }

                    let adapter_id = &chain[i];
                    let adapter = self
                        .registry
                        .get(adapter_id)
                        .ok_or_else(|| Error::UnknownAdapter(adapter_id.clone()))?;

                    let mut budget = self.config.timeouts.budget(adapter.descriptor().latency);
                    if let Some(deadline) = deadline {
                        budget = budget.min(deadline.saturating_duration_since(Instant::now()));
                    }

                    let attempt_started = Instant::now();
                    match adapter.attempt(page, budget) {
                        Ok(mut result) => {
                            let elapsed = attempt_started.elapsed();
                            if elapsed > budget {
                                // Late output is a timeout, same as a failure.
                                log::warn!(
                                    "page {}: adapter '{}' overran its {} ms budget",
                                    page.index,
                                    adapter_id,
                                    budget.as_millis()
                                );
                                warnings.insert(ExtractWarning::AdapterTimedOut {
                                    adapter: adapter_id.clone(),
                                });
                                state = State::Attempting(i + 1);
                            } else {
                                result.elapsed = elapsed;
                                pending = Some(result);
                                state = State::Validating(i);
                            }
                        },
                        Err(Error::AdapterUnavailable(reason)) => {
                            log::debug!(
                                "page {}: adapter '{}' unavailable: {}",
                                page.index,
                                adapter_id,
                                reason
                            );
                            warnings.insert(ExtractWarning::AdapterUnavailable {
                                adapter: adapter_id.clone(),
                            });
                            state = State::Attempting(i + 1);
                        },
                        Err(Error::Timeout { .. }) => {
                            warnings.insert(ExtractWarning::AdapterTimedOut {
                                adapter: adapter_id.clone(),
                            });
                            state = State::Attempting(i + 1);
                        },
                        Err(err) => {
                            log::warn!(
                                "page {}: adapter '{}' failed: {}",
                                page.index,
                                adapter_id,
                                err
                            );
                            warnings.insert(ExtractWarning::AdapterFailed {
                                adapter: adapter_id.clone(),
                            });
                            state = State::Attempting(i + 1);
                        },
                    }
                },

                State::Validating(i) => {
                    let result = pending.take().expect("pending result set");
                    let fp = fingerprint.as_ref().expect("fingerprint set");
                    let verdict = self.validator.validate(&result, fp);

                    if verdict.accepted {
                        log::info!(
                            "page {}: accepted '{}' ({} blocks, {} ms)",
                            page.index,
                            result.adapter_id,
                            result.blocks.len(),
                            result.elapsed.as_millis()
                        );
                        return Ok(self.accepted_document(result, warnings));
                    }

                    let reason = verdict.reason.expect("rejected verdict has a reason");
                    warnings.insert(ExtractWarning::ValidationRejected {
                        adapter: result.adapter_id.clone(),
                        reason,
                    });

                    // Retain the rejection: it may still contribute geometry
                    // or text to fusion, or serve as the degraded fallback.
                    let descriptor = self.registry.descriptor(&result.adapter_id);
                    retained.push(RetainedAttempt {
                        provides_geometry: descriptor.map(|d| d.provides_geometry).unwrap_or(false),
                        provides_text: descriptor.map(|d| d.provides_text).unwrap_or(false),
                        result,
                    });

                    if !fusion_attempted && self.fusion_candidates(&retained).is_some() {
                        state = State::Fusing(i + 1);
                    } else {
                        state = State::Attempting(i + 1);
                    }
                },

                State::Fusing(resume) => {
                    fusion_attempted = true;
                    let (geo_index, text_index) = self
                        .fusion_candidates(&retained)
                        .expect("fusing entered with candidates");
                    let fused = self.fuser.fuse(
                        &retained[geo_index].result,
                        &retained[text_index].result,
                    );
                    let fp = fingerprint.as_ref().expect("fingerprint set");
                    let verdict = self.validator.validate(&fused, fp);

                    if verdict.accepted {
                        log::info!(
                            "page {}: accepted fused '{}' ({} blocks)",
                            page.index,
                            fused.adapter_id,
                            fused.blocks.len()
                        );
                        return Ok(self.accepted_document(fused, warnings));
                    }

                    let reason = verdict.reason.expect("rejected verdict has a reason");
                    log::debug!(
                        "page {}: fused '{}' rejected ({:?})",
                        page.index,
                        fused.adapter_id,
                        reason
                    );
                    warnings.insert(ExtractWarning::ValidationRejected {
                        adapter: fused.adapter_id.clone(),
                        reason,
                    });
                    // Keep the fused result in the degraded-fallback pool,
                    // but never as a fusion input.
                    retained.push(RetainedAttempt {
                        result: fused,
                        provides_geometry: false,
                        provides_text: false,
                    });
                    state = State::Attempting(resume);
                },

                State::Exhausted => {
                    return Ok(self.degraded_document(page, retained, warnings));
                },
            }
        }
    }

    /// Extract every page of a document. Pages are independent; this is the
    /// sequential convenience over [`Orchestrator::extract_page`].
    pub fn extract_document(&self, descriptors: &[PageDescriptor]) -> Result<Vec<Document>> {
        descriptors
            .iter()
            .enumerate()
            .map(|(index, descriptor)| self.extract_page(&PageHandle::new(index, *descriptor)))
            .collect()
    }

    /// Pick the fusion inputs from the retained rejections: the
    /// highest-confidence geometry-capable result (which must actually carry
    /// boxes on every block) and the highest-confidence text-capable result,
    /// necessarily distinct.
    fn fusion_candidates(&self, retained: &[RetainedAttempt]) -> Option<(usize, usize)> {
        let geo = retained
            .iter()
            .enumerate()
            .filter(|(_, a)| a.provides_geometry && a.result.has_full_geometry())
            .max_by(|(_, a), (_, b)| {
                a.result
                    .confidence
                    .partial_cmp(&b.result.confidence)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(i, _)| i)?;
        let text = retained
            .iter()
            .enumerate()
            .filter(|(i, a)| *i != geo && a.provides_text)
            .max_by(|(_, a), (_, b)| {
                a.result
                    .confidence
                    .partial_cmp(&b.result.confidence)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(i, _)| i)?;
        Some((geo, text))
    }

    fn accepted_document(&self, result: ExtractionResult, mut warnings: WarningSet) -> Document {
        warnings.extend(result.warnings.iter().cloned());
        Document {
            blocks: result.blocks,
            degraded: false,
            warnings,
            source: Some(result.adapter_id),
        }
    }

    /// Best-effort output when nothing validated: the highest-confidence
    /// attempt, preferring attempts that produced any blocks at all. A page
    /// where every attempt returned zero blocks yields an empty degraded
    /// document; this path never errors.
    fn degraded_document(
        &self,
        page: &PageHandle,
        retained: Vec<RetainedAttempt>,
        mut warnings: WarningSet,
    ) -> Document {
        let best = retained
            .into_iter()
            .map(|a| a.result)
            .max_by(|a, b| {
                let a_key = (!a.blocks.is_empty(), a.confidence);
                let b_key = (!b.blocks.is_empty(), b.confidence);
                a_key
                    .partial_cmp(&b_key)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

        match best {
            Some(result) => {
                log::warn!(
                    "page {}: degraded, returning '{}' ({} blocks)",
                    page.index,
                    result.adapter_id,
                    result.blocks.len()
                );
                warnings.extend(result.warnings.iter().cloned());
                Document {
                    blocks: result.blocks,
                    degraded: true,
                    warnings,
                    source: Some(result.adapter_id),
                }
            },
            None => {
                log::warn!("page {}: degraded, no attempt produced a result", page.index);
                Document {
                    blocks: Vec::new(),
                    degraded: true,
                    warnings,
                    source: None,
                }
            },
        }
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish()
    }
}
