//! Integration tests for the painter contract: purity/idempotence,
//! list-marker gating at paint time (invariant 10), and tab-suffix
//! placement reuse.

use superdoc_layout::document::DrawingKind;
use superdoc_layout::layout_types::{Fragment, Layout, Page, PxEffectExtent, PxSize};
use superdoc_layout::painter::{tab_suffix_text_start_px, DrawOp, DrawOpSink, LayoutPainter, Painter};
use superdoc_layout::style::context::{Suffix, TabAlignment, TabStop};

fn sample_layout() -> Layout {
    Layout {
        page_size: PxSize { width: 600.0, height: 800.0 },
        pages: vec![Page {
            number: 1,
            fragments: vec![
                Fragment::Para {
                    block_id: "p1".to_string(),
                    from_line: 0,
                    to_line: 1,
                    x: 0.0,
                    y: 0.0,
                    width: 500.0,
                    marker_width: Some(18.0),
                    marker_text_width: Some(14.0),
                    marker_gutter: Some(6.0),
                    continues_from_prev: false,
                },
                Fragment::Para {
                    block_id: "p2".to_string(),
                    from_line: 0,
                    to_line: 1,
                    x: 0.0,
                    y: 20.0,
                    width: 500.0,
                    marker_width: Some(18.0),
                    marker_text_width: None,
                    marker_gutter: Some(6.0),
                    continues_from_prev: false,
                },
                Fragment::Image {
                    block_id: "img1".to_string(),
                    x: 10.0,
                    y: 40.0,
                    width: 96.0,
                    height: 96.0,
                    geometry: PxSize { width: 96.0, height: 96.0 },
                    scale: 1.0,
                    is_anchored: false,
                },
            ],
        }],
    }
}

#[test]
fn paint_is_pure_and_idempotent_across_independent_targets() {
    let layout = sample_layout();
    let mut painter = LayoutPainter::new();
    let mut sink_a = DrawOpSink::new();
    let mut sink_b = DrawOpSink::new();
    painter.paint(&layout, &mut sink_a);
    painter.paint(&layout, &mut sink_b);
    assert_eq!(sink_a.into_vec(), sink_b.into_vec());
}

#[test]
fn a_measured_marker_width_produces_a_listmarker_op_before_the_paragraph_op() {
    let layout = sample_layout();
    let mut painter = LayoutPainter::new();
    let mut sink = DrawOpSink::new();
    painter.paint(&layout, &mut sink);
    let ops = sink.into_vec();
    let marker_idx = ops.iter().position(|op| matches!(op, DrawOp::ListMarker { block_id, .. } if block_id == "p1"));
    let para_idx = ops.iter().position(|op| matches!(op, DrawOp::Paragraph { block_id, .. } if block_id == "p1"));
    assert!(marker_idx.is_some());
    assert!(marker_idx.unwrap() < para_idx.unwrap());
}

#[test]
fn an_unmeasured_marker_width_suppresses_the_listmarker_op_entirely() {
    let layout = sample_layout();
    let mut painter = LayoutPainter::new();
    let mut sink = DrawOpSink::new();
    painter.paint(&layout, &mut sink);
    let ops = sink.into_vec();
    let has_marker_for_p2 = ops.iter().any(|op| matches!(op, DrawOp::ListMarker { block_id, .. } if block_id == "p2"));
    assert!(!has_marker_for_p2, "a None marker_text_width must never reach a ListMarker op");
    let has_paragraph_for_p2 = ops.iter().any(|op| matches!(op, DrawOp::Paragraph { block_id, .. } if block_id == "p2"));
    assert!(has_paragraph_for_p2, "the paragraph text itself must still paint without its marker");
}

#[test]
fn every_page_begins_with_a_beginpage_op_carrying_the_page_size() {
    let layout = sample_layout();
    let mut painter = LayoutPainter::new();
    let mut sink = DrawOpSink::new();
    painter.paint(&layout, &mut sink);
    let ops = sink.into_vec();
    assert!(matches!(
        ops[0],
        DrawOp::BeginPage { number: 1, size: PxSize { width: 600.0, height: 800.0 } }
    ));
}

#[test]
fn drawing_fragments_carry_their_drawing_kind_through_to_the_draw_op() {
    let layout = Layout {
        page_size: PxSize { width: 600.0, height: 800.0 },
        pages: vec![Page {
            number: 1,
            fragments: vec![Fragment::Drawing {
                block_id: "shape1".to_string(),
                drawing_kind: DrawingKind::VectorShape,
                x: 10.0,
                y: 5.0,
                width: 380.0,
                height: 40.0,
                geometry: PxSize { width: 380.0, height: 40.0 },
                scale: 1.0,
                is_anchored: true,
                effect_extent: PxEffectExtent::default(),
            }],
        }],
    };
    let mut painter = LayoutPainter::new();
    let mut sink = DrawOpSink::new();
    painter.paint(&layout, &mut sink);
    let ops = sink.into_vec();
    assert!(matches!(
        ops[1],
        DrawOp::Drawing { drawing_kind: DrawingKind::VectorShape, geometry: PxSize { width: 380.0, height: 40.0 }, .. }
    ));
}

#[test]
fn tab_suffix_snaps_to_the_same_stop_the_word_layout_would_pick() {
    let tabs = vec![TabStop { position: 200, alignment: TabAlignment::Left }];
    let start = tab_suffix_text_start_px(10.0, Suffix::Tab, &tabs, 48.0, 6.0);
    let expected = superdoc_layout::wordlayout::next_tab_stop(10.0, &tabs, 48.0);
    assert_eq!(start, expected);
}

#[test]
fn tab_suffix_with_space_suffix_just_adds_the_gutter() {
    let start = tab_suffix_text_start_px(10.0, Suffix::Space, &[], 48.0, 6.0);
    assert_eq!(start, 16.0);
}

#[test]
fn tab_suffix_with_no_suffix_does_not_move_the_cursor() {
    let start = tab_suffix_text_start_px(10.0, Suffix::Nothing, &[], 48.0, 6.0);
    assert_eq!(start, 10.0);
}
