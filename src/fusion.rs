//! Geometry/text fusion for pages where no single backend validates.
//!
//! One backend produced trustworthy bounding boxes but garbled content; a
//! second produced readable content with weak or missing geometry. Fusion
//! keeps the first backend's boxes and re-fills each one with content from
//! the second, matched spatially when the text source has boxes of its own
//! and by reading-order proportion when it does not.
//!
//! Fusion never fails hard: the worst case is a result where every block is
//! a gap, which scores zero confidence and is rejected downstream like any
//! other bad attempt.

use crate::adapters::{
    BlockOrigin, ExtractWarning, ExtractionResult, TextBlock, WarningSet,
};
use serde::{Deserialize, Serialize};

/// Thresholds for spatial matching.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionConfig {
    /// Minimum intersection-over-union for a text block to be assigned to a
    /// geometry block.
    pub min_iou: f32,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self { min_iou: 0.3 }
    }
}

/// Merges geometry from one result with text from another.
///
/// Stateless and deterministic: identical inputs always produce the
/// identical fused result.
#[derive(Debug, Clone, Default)]
pub struct LayoutFuser {
    config: FusionConfig,
}

impl LayoutFuser {
    /// Fuser with the default overlap threshold.
    pub fn new() -> Self {
        Self::with_config(FusionConfig::default())
    }

    /// Fuser with a custom overlap threshold.
    pub fn with_config(config: FusionConfig) -> Self {
        Self { config }
    }

    /// Threshold in use.
    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    /// Fuse a geometry-reliable result with a text-reliable result.
    ///
    /// The output has exactly one block per geometry block, each keeping the
    /// geometry source's bbox with `origin = Fused`. Geometry blocks that
    /// receive no content are emitted with empty content and an itemized
    /// [`ExtractWarning::FusionGap`].
    ///
    /// Confidence is the text source's confidence scaled by the fraction of
    /// geometry blocks that received content, so an all-gap fusion scores
    /// 0.0 and fails the validator's confidence floor.
    ///
    /// When the text source has no bounding boxes at all, matching falls
    /// back to a proportional reading-order partition. That path assumes
    /// both sources share a compatible reading order; it is a heuristic, not
    /// a contract, and multi-column reshuffles are better served by the IoU
    /// path.
    pub fn fuse(
        &self,
        geometry_source: &ExtractionResult,
        text_source: &ExtractionResult,
    ) -> ExtractionResult {
        let text_has_boxes = text_source.blocks.iter().any(|b| b.bbox.is_some());

        let assignments = if text_has_boxes {
            self.assign_by_iou(geometry_source, text_source)
        } else {
            self.assign_by_order(geometry_source, text_source)
        };

        let mut blocks = Vec::with_capacity(geometry_source.blocks.len());
        let mut warnings = WarningSet::new();
        let mut matched = 0usize;

        for (index, (geo_block, content)) in geometry_source
            .blocks
            .iter()
            .zip(assignments.into_iter())
            .enumerate()
        {
            let content = content.unwrap_or_default();
            if content.is_empty() {
                warnings.insert(ExtractWarning::FusionGap { block: index });
            } else {
                matched += 1;
            }
            blocks.push(TextBlock {
                content,
                bbox: geo_block.bbox,
                origin: BlockOrigin::Fused,
            });
        }

        let matched_fraction = if geometry_source.blocks.is_empty() {
            0.0
        } else {
            matched as f32 / geometry_source.blocks.len() as f32
        };
        let confidence = (text_source.confidence * matched_fraction).clamp(0.0, 1.0);

        log::debug!(
            "fused {}+{}: {}/{} blocks matched, confidence {:.2}",
            geometry_source.adapter_id,
            text_source.adapter_id,
            matched,
            blocks.len(),
            confidence
        );

        ExtractionResult {
            adapter_id: format!("{}+{}", geometry_source.adapter_id, text_source.adapter_id),
            blocks,
            confidence,
            warnings,
            elapsed: std::time::Duration::ZERO,
        }
    }

    /// Spatial assignment: each geometry block takes the text block with the
    /// highest IoU at or above the threshold. Ties break toward the closer
    /// reading-order index, then the lower text index. Text blocks without a
    /// bbox cannot match spatially and are ignored here.
    fn assign_by_iou(
        &self,
        geometry_source: &ExtractionResult,
        text_source: &ExtractionResult,
    ) -> Vec<Option<String>> {
        geometry_source
            .blocks
            .iter()
            .enumerate()
            .map(|(geo_index, geo_block)| {
                let geo_bbox = geo_block.bbox?;
                let mut best: Option<(f32, usize)> = None;
                for (text_index, text_block) in text_source.blocks.iter().enumerate() {
                    let Some(text_bbox) = text_block.bbox else {
                        continue;
                    };
                    let iou = geo_bbox.iou(&text_bbox);
                    if iou < self.config.min_iou {
                        continue;
                    }
                    let better = match best {
                        None => true,
                        Some((best_iou, best_index)) => {
                            if iou != best_iou {
                                iou > best_iou
                            } else {
                                let dist = text_index.abs_diff(geo_index);
                                let best_dist = best_index.abs_diff(geo_index);
                                dist < best_dist
                            }
                        },
                    };
                    if better {
                        best = Some((iou, text_index));
                    }
                }
                best.map(|(_, text_index)| text_source.blocks[text_index].content.clone())
            })
            .collect()
    }

    /// Reading-order assignment: geometry block `i` of `G` receives the text
    /// blocks in the span `[i*T/G, (i+1)*T/G)`, joined by single spaces.
    fn assign_by_order(
        &self,
        geometry_source: &ExtractionResult,
        text_source: &ExtractionResult,
    ) -> Vec<Option<String>> {
        let geo_count = geometry_source.blocks.len();
        let text_count = text_source.blocks.len();
        if geo_count == 0 {
            return Vec::new();
        }

        (0..geo_count)
            .map(|i| {
                let start = i * text_count / geo_count;
                let end = (i + 1) * text_count / geo_count;
                if start >= end {
                    return None;
                }
                let joined = text_source.blocks[start..end]
                    .iter()
                    .map(|b| b.content.trim())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ");
                if joined.is_empty() {
                    None
                } else {
                    Some(joined)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    fn geometry_result(bboxes: &[Rect]) -> ExtractionResult {
        let blocks = bboxes
            .iter()
            .map(|bbox| TextBlock::new("<garbled>", Some(*bbox), BlockOrigin::Geometry))
            .collect();
        ExtractionResult::new("hybrid-layout", blocks).with_confidence(0.6)
    }

    fn text_result(blocks: &[(&str, Option<Rect>)]) -> ExtractionResult {
        let blocks = blocks
            .iter()
            .map(|(content, bbox)| TextBlock::new(*content, *bbox, BlockOrigin::Text))
            .collect();
        ExtractionResult::new("native-text", blocks).with_confidence(0.8)
    }

    #[test]
    fn test_iou_fusion_matches_overlapping_pairs() {
        let geometry = geometry_result(&[
            Rect::new(0.0, 0.0, 10.0, 5.0),
            Rect::new(0.0, 5.0, 10.0, 10.0),
        ]);
        let text = text_result(&[
            ("first block", Some(Rect::new(0.0, 0.0, 10.0, 4.0))),
            ("second block", Some(Rect::new(0.0, 6.0, 10.0, 10.0))),
        ]);

        let fused = LayoutFuser::new().fuse(&geometry, &text);

        assert_eq!(fused.blocks.len(), 2);
        assert_eq!(fused.blocks[0].content, "first block");
        assert_eq!(fused.blocks[1].content, "second block");
        assert!(fused
            .blocks
            .iter()
            .all(|b| b.origin == BlockOrigin::Fused));
        // Geometry's boxes survive
        assert_eq!(fused.blocks[0].bbox, geometry.blocks[0].bbox);
        assert_eq!(
            fused
                .warnings
                .iter()
                .filter(|w| matches!(w, ExtractWarning::FusionGap { .. }))
                .count(),
            0
        );
        assert_eq!(fused.adapter_id, "hybrid-layout+native-text");
    }

    #[test]
    fn test_disjoint_boxes_are_all_gaps() {
        let geometry = geometry_result(&[
            Rect::new(0.0, 0.0, 10.0, 5.0),
            Rect::new(0.0, 5.0, 10.0, 10.0),
        ]);
        let text = text_result(&[
            ("far away", Some(Rect::new(100.0, 100.0, 110.0, 105.0))),
            ("also far", Some(Rect::new(100.0, 200.0, 110.0, 205.0))),
        ]);

        let fused = LayoutFuser::new().fuse(&geometry, &text);

        assert_eq!(fused.blocks.len(), 2);
        assert!(fused.blocks.iter().all(|b| b.content.is_empty()));
        assert_eq!(
            fused
                .warnings
                .iter()
                .filter(|w| matches!(w, ExtractWarning::FusionGap { .. }))
                .count(),
            2
        );
        // All gaps -> zero confidence, guaranteed to fail the floor
        assert_eq!(fused.confidence, 0.0);
    }

    #[test]
    fn test_block_count_always_matches_geometry() {
        let geometry = geometry_result(&[
            Rect::new(0.0, 0.0, 10.0, 2.0),
            Rect::new(0.0, 2.0, 10.0, 4.0),
            Rect::new(0.0, 4.0, 10.0, 6.0),
        ]);
        let text = text_result(&[("only one", Some(Rect::new(0.0, 0.0, 10.0, 2.0)))]);

        let fused = LayoutFuser::new().fuse(&geometry, &text);
        assert_eq!(fused.blocks.len(), geometry.blocks.len());
    }

    #[test]
    fn test_order_fusion_without_text_bboxes() {
        let geometry = geometry_result(&[
            Rect::new(0.0, 0.0, 10.0, 5.0),
            Rect::new(0.0, 5.0, 10.0, 10.0),
        ]);
        let text = text_result(&[
            ("alpha", None),
            ("beta", None),
            ("gamma", None),
            ("delta", None),
        ]);

        let fused = LayoutFuser::new().fuse(&geometry, &text);

        assert_eq!(fused.blocks.len(), 2);
        assert_eq!(fused.blocks[0].content, "alpha beta");
        assert_eq!(fused.blocks[1].content, "gamma delta");
        assert!(fused.warnings.is_empty());
        assert!((fused.confidence - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_order_fusion_more_geometry_than_text() {
        let geometry = geometry_result(&[
            Rect::new(0.0, 0.0, 10.0, 2.0),
            Rect::new(0.0, 2.0, 10.0, 4.0),
            Rect::new(0.0, 4.0, 10.0, 6.0),
        ]);
        let text = text_result(&[("lonely", None)]);

        let fused = LayoutFuser::new().fuse(&geometry, &text);

        assert_eq!(fused.blocks.len(), 3);
        let non_empty: Vec<_> = fused
            .blocks
            .iter()
            .filter(|b| !b.content.is_empty())
            .collect();
        assert_eq!(non_empty.len(), 1);
        assert_eq!(
            fused
                .warnings
                .iter()
                .filter(|w| matches!(w, ExtractWarning::FusionGap { .. }))
                .count(),
            2
        );
    }

    #[test]
    fn test_tie_breaks_toward_reading_order() {
        // Two identical text boxes; the one closer in reading order wins.
        let shared = Rect::new(0.0, 0.0, 10.0, 10.0);
        let geometry = geometry_result(&[shared, shared]);
        let text = text_result(&[("near first", Some(shared)), ("near second", Some(shared))]);

        let fused = LayoutFuser::new().fuse(&geometry, &text);
        assert_eq!(fused.blocks[0].content, "near first");
        assert_eq!(fused.blocks[1].content, "near second");
    }

    #[test]
    fn test_deterministic() {
        let geometry = geometry_result(&[
            Rect::new(0.0, 0.0, 10.0, 5.0),
            Rect::new(0.0, 5.0, 10.0, 10.0),
        ]);
        let text = text_result(&[
            ("first", Some(Rect::new(0.0, 0.0, 10.0, 4.0))),
            ("second", Some(Rect::new(0.0, 6.0, 10.0, 10.0))),
        ]);

        let fuser = LayoutFuser::new();
        assert_eq!(fuser.fuse(&geometry, &text), fuser.fuse(&geometry, &text));
    }

    #[test]
    fn test_empty_geometry_is_empty_result() {
        let geometry = ExtractionResult::new("hybrid-layout", vec![]);
        let text = text_result(&[("words", None)]);
        let fused = LayoutFuser::new().fuse(&geometry, &text);
        assert!(fused.blocks.is_empty());
        assert_eq!(fused.confidence, 0.0);
    }
}
