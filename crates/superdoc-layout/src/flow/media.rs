//! Image/drawing conversion (spec §4.E "image / drawing").
//!
//! Anchored media (`anchor.is_some()`) becomes its own top-level
//! [`FlowBlock`], collected into the caller's pre-paragraph atomic-block
//! buffer rather than the paragraph's inline content, per §4.E: "emit one
//! paragraph FlowBlock plus any pre-paragraph atomic blocks (e.g. page
//! breaks, anchored drawings) that the inline walk produced." Inline media
//! (`anchor.is_none()`) stays in the run stream and flows like any other
//! inline atom.

use crate::document::{Node, NodeKind};
use crate::flow::blocks::{fallback_block_id, FlowBlock, FlowDrawing, FlowImage, InlineItem};
use crate::flow::position::PositionWalker;

/// Handle an `image`/`drawing` node found while flattening a paragraph's
/// inline content: route it to `inline_out` or `atomic_out` depending on
/// whether it is anchored.
pub fn flatten_inline_media(
    node: &Node,
    pos: &mut PositionWalker,
    inline_out: &mut Vec<InlineItem>,
    atomic_out: &mut Vec<FlowBlock>,
) {
    let start = pos.atom();
    match &node.kind {
        NodeKind::Image {
            src,
            geometry,
            anchor,
            attrs,
        } => {
            let image = FlowImage {
                block_id: fallback_block_id("image", Some(start)),
                src: src.clone(),
                geometry: *geometry,
                anchor: *anchor,
                attrs: attrs.clone(),
                pm_start: Some(start),
                pm_end: Some(start + 1),
            };
            if image.anchor.is_some() {
                atomic_out.push(FlowBlock::Image(image));
            } else {
                inline_out.push(InlineItem::InlineImage(image));
            }
        }
        NodeKind::Drawing {
            drawing_kind,
            geometry,
            effect_extent,
            anchor,
            attrs,
        } => {
            let drawing = FlowDrawing {
                block_id: fallback_block_id("drawing", Some(start)),
                drawing_kind: *drawing_kind,
                geometry: *geometry,
                effect_extent: *effect_extent,
                anchor: *anchor,
                attrs: attrs.clone(),
                pm_start: Some(start),
                pm_end: Some(start + 1),
            };
            if drawing.anchor.is_some() {
                atomic_out.push(FlowBlock::Drawing(drawing));
            } else {
                inline_out.push(InlineItem::InlineDrawing(drawing));
            }
        }
        _ => {}
    }
}

/// Convert a top-level `image`/`drawing` node (one that is a direct document
/// child, not found while walking a paragraph) into its [`FlowBlock`].
pub fn convert_top_level_media(node: &Node, pos: &mut PositionWalker) -> Option<FlowBlock> {
    let mut inline_out = Vec::new();
    let mut atomic_out = Vec::new();
    flatten_inline_media(node, pos, &mut inline_out, &mut atomic_out);
    if let Some(block) = atomic_out.into_iter().next() {
        return Some(block);
    }
    // A top-level image/drawing with no anchor data still gets its own
    // block; build one directly as "anchored" for layout purposes, since it
    // has no paragraph to flow inline within.
    match inline_out.into_iter().next() {
        Some(InlineItem::InlineImage(img)) => Some(FlowBlock::Image(img)),
        Some(InlineItem::InlineDrawing(d)) => Some(FlowBlock::Drawing(d)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{AnchorData, DrawingKind, EffectExtent, Geometry};
    use std::collections::BTreeMap;

    #[test]
    fn anchored_drawing_becomes_an_atomic_block_not_inline_content() {
        let node = Node::leaf(NodeKind::Drawing {
            drawing_kind: DrawingKind::VectorShape,
            geometry: Geometry {
                width: 100,
                height: 100,
            },
            effect_extent: EffectExtent::default(),
            anchor: Some(AnchorData {
                offset_x: 0,
                offset_y: 0,
                page_relative: true,
                relative_height: 1,
            }),
            attrs: BTreeMap::new(),
        });
        let mut pos = PositionWalker::new();
        let mut inline_out = Vec::new();
        let mut atomic_out = Vec::new();
        flatten_inline_media(&node, &mut pos, &mut inline_out, &mut atomic_out);
        assert!(inline_out.is_empty());
        assert_eq!(atomic_out.len(), 1);
    }

    #[test]
    fn inline_image_stays_in_run_stream() {
        let node = Node::leaf(NodeKind::Image {
            src: "rId4".to_string(),
            geometry: Geometry {
                width: 10,
                height: 10,
            },
            anchor: None,
            attrs: BTreeMap::new(),
        });
        let mut pos = PositionWalker::new();
        let mut inline_out = Vec::new();
        let mut atomic_out = Vec::new();
        flatten_inline_media(&node, &mut pos, &mut inline_out, &mut atomic_out);
        assert!(atomic_out.is_empty());
        assert_eq!(inline_out.len(), 1);
    }
}
