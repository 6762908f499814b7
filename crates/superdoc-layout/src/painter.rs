//! The painter contract (spec §4.J): a pure, idempotent consumer of a
//! finished [`Layout`] that turns fragments into paint operations. The core
//! never draws anything itself — [`Painter`] is the seam a host's actual
//! renderer (canvas, PDF, print preview, …) plugs into.

use crate::document::DrawingKind;
use crate::layout_types::{Fragment, Layout, Page, PxEffectExtent, PxSize};
use crate::style::context::{Suffix, TabStop};
use crate::wordlayout::{marker_should_render, next_tab_stop};

/// One primitive drawing instruction a painter may emit.
///
/// This is deliberately coarse: a real host renderer draws far more detail
/// (glyph runs, shading fills, border strokes) from the fragment and its
/// source block directly. [`DrawOp`] exists so [`DrawOpSink`] can record
/// *that* a paint pass visited each fragment, in order, for contract tests —
/// not to be a full paint command set.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Begin a new page; clears any per-page paint state a host might keep.
    BeginPage {
        /// 1-based page number.
        number: u32,
        /// Page content-box size.
        size: PxSize,
    },
    /// Paint a paragraph line range.
    Paragraph {
        /// Source block id.
        block_id: String,
        /// Position, content width (spec §4.J: "painters must read the
        /// fragment geometry field — never the block's").
        x: f64,
        /// Y position.
        y: f64,
        /// Content width available to the paragraph on this fragment.
        width: f64,
    },
    /// Paint a list marker (spec §4.J "List marker gating"): only emitted
    /// when [`marker_should_render`] says the measured width is usable.
    ListMarker {
        /// Source block id.
        block_id: String,
        /// X position of the marker box.
        x: f64,
        /// Y position.
        y: f64,
        /// Marker box width.
        width: f64,
    },
    /// Paint an image fragment.
    Image {
        /// Source block id.
        block_id: String,
        /// X position.
        x: f64,
        /// Y position.
        y: f64,
        /// Fragment geometry (never the block's natural geometry).
        geometry: PxSize,
    },
    /// Paint a drawing fragment.
    Drawing {
        /// Source block id.
        block_id: String,
        /// Drawing variant.
        drawing_kind: DrawingKind,
        /// X position.
        x: f64,
        /// Y position.
        y: f64,
        /// Fragment geometry (never the block's natural geometry).
        geometry: PxSize,
    },
    /// Paint a table row range.
    Table {
        /// Source block id.
        block_id: String,
        /// X position.
        x: f64,
        /// Y position.
        y: f64,
        /// First row index (inclusive).
        from_row: usize,
        /// Last row index (exclusive).
        to_row: usize,
    },
}

/// Where a [`Painter`] sends its output. A real host implements this over
/// its own canvas/PDF/DOM surface; [`DrawOpSink`] is the reference
/// implementation used by tests and the demo binary.
pub trait PaintTarget {
    /// Record one paint operation.
    fn emit(&mut self, op: DrawOp);
}

/// Accumulates every [`DrawOp`] a paint pass emits, in order.
#[derive(Debug, Clone, Default)]
pub struct DrawOpSink {
    ops: Vec<DrawOp>,
}

impl DrawOpSink {
    /// Construct an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded ops, in emission order.
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Consume the sink, returning the recorded ops.
    pub fn into_vec(self) -> Vec<DrawOp> {
        self.ops
    }
}

impl PaintTarget for DrawOpSink {
    fn emit(&mut self, op: DrawOp) {
        self.ops.push(op);
    }
}

/// The painter contract (spec §4.J): `paint` must be pure with respect to
/// `layout` (no two calls with the same layout may emit different ops) and
/// idempotent (painting the same layout twice into two fresh targets
/// produces byte-equal output).
pub trait Painter {
    /// Paint every page of `layout` into `mount`, in page and fragment order.
    fn paint(&mut self, layout: &Layout, mount: &mut dyn PaintTarget);
}

/// The reference painter: walks [`Layout`] and translates each [`Fragment`]
/// into the matching [`DrawOp`], applying list-marker gating and tab-suffix
/// computation exactly as the word-layout/measure modules describe them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutPainter;

impl LayoutPainter {
    /// Construct a new reference painter. Stateless; `paint` may be called
    /// any number of times on any number of layouts.
    pub fn new() -> Self {
        Self
    }

    fn paint_page(&self, page: &Page, mount: &mut dyn PaintTarget) {
        for fragment in &page.fragments {
            self.paint_fragment(fragment, mount);
        }
    }

    fn paint_fragment(&self, fragment: &Fragment, mount: &mut dyn PaintTarget) {
        match fragment {
            Fragment::Para {
                block_id,
                x,
                y,
                width,
                marker_width,
                marker_text_width,
                ..
            } => {
                if marker_should_render(*marker_text_width) {
                    if let Some(marker_width) = marker_width {
                        mount.emit(DrawOp::ListMarker {
                            block_id: block_id.clone(),
                            x: *x,
                            y: *y,
                            width: *marker_width,
                        });
                    }
                }
                mount.emit(DrawOp::Paragraph {
                    block_id: block_id.clone(),
                    x: *x,
                    y: *y,
                    width: *width,
                });
            }
            Fragment::Image {
                block_id,
                x,
                y,
                geometry,
                ..
            } => {
                mount.emit(DrawOp::Image {
                    block_id: block_id.clone(),
                    x: *x,
                    y: *y,
                    geometry: *geometry,
                });
            }
            Fragment::Drawing {
                block_id,
                drawing_kind,
                x,
                y,
                geometry,
                ..
            } => {
                mount.emit(DrawOp::Drawing {
                    block_id: block_id.clone(),
                    drawing_kind: *drawing_kind,
                    x: *x,
                    y: *y,
                    geometry: *geometry,
                });
            }
            Fragment::Table {
                block_id,
                x,
                y,
                from_row,
                to_row,
                ..
            } => {
                mount.emit(DrawOp::Table {
                    block_id: block_id.clone(),
                    x: *x,
                    y: *y,
                    from_row: *from_row,
                    to_row: *to_row,
                });
            }
        }
    }
}

impl Painter for LayoutPainter {
    fn paint(&mut self, layout: &Layout, mount: &mut dyn PaintTarget) {
        for page in &layout.pages {
            mount.emit(DrawOp::BeginPage {
                number: page.number,
                size: layout.page_size,
            });
            self.paint_page(page, mount);
        }
    }
}

/// Compute where a tab-suffixed marker's run text should actually start
/// painting, reusing the same snapping rule `crate::wordlayout` uses when it
/// first laid the paragraph out (spec §4.J "Tab-suffix computation reuses the
/// word-layout tab-stop rule").
pub fn tab_suffix_text_start_px(
    marker_end_px: f64,
    suffix: Suffix,
    tabs: &[TabStop],
    default_interval_px: f64,
    gutter_px: f64,
) -> f64 {
    match suffix {
        Suffix::Tab => next_tab_stop(marker_end_px, tabs, default_interval_px),
        Suffix::Space => marker_end_px + gutter_px,
        Suffix::Nothing => marker_end_px,
    }
}

/// The content box a painter must draw a drawing's inner shape into: the
/// *fragment's* geometry reduced by its `effectExtent` on every side, offset
/// by `(left, top)` from the fragment's own `(x, y)` (spec §8 invariant 11,
/// S6: "a drawing's content-box dimensions equal `fragment.geometry -
/// effectExtent`, not `block.geometry - effectExtent`").
pub fn drawing_content_box_px(fragment_geometry: PxSize, effect_extent: PxEffectExtent) -> (f64, f64, PxSize) {
    (
        effect_extent.left,
        effect_extent.top,
        PxSize {
            width: fragment_geometry.width - effect_extent.left - effect_extent.right,
            height: fragment_geometry.height - effect_extent.top - effect_extent.bottom,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout_types::PxSize;

    fn sample_layout() -> Layout {
        Layout {
            page_size: PxSize {
                width: 400.0,
                height: 400.0,
            },
            pages: vec![Page {
                number: 1,
                fragments: vec![
                    Fragment::Para {
                        block_id: "p1".to_string(),
                        from_line: 0,
                        to_line: 1,
                        x: 0.0,
                        y: 0.0,
                        width: 400.0,
                        marker_width: Some(18.0),
                        marker_text_width: Some(14.0),
                        marker_gutter: Some(6.0),
                        continues_from_prev: false,
                    },
                    Fragment::Image {
                        block_id: "img1".to_string(),
                        x: 0.0,
                        y: 50.0,
                        width: 100.0,
                        height: 100.0,
                        geometry: PxSize {
                            width: 100.0,
                            height: 100.0,
                        },
                        scale: 1.0,
                        is_anchored: false,
                    },
                ],
            }],
        }
    }

    #[test]
    fn paint_emits_begin_page_then_fragments_in_order() {
        let layout = sample_layout();
        let mut painter = LayoutPainter::new();
        let mut sink = DrawOpSink::new();
        painter.paint(&layout, &mut sink);
        let ops = sink.into_vec();
        assert!(matches!(ops[0], DrawOp::BeginPage { number: 1, .. }));
        assert!(matches!(ops[1], DrawOp::ListMarker { .. }));
        assert!(matches!(ops[2], DrawOp::Paragraph { .. }));
        assert!(matches!(ops[3], DrawOp::Image { .. }));
    }

    #[test]
    fn paint_is_idempotent_across_independent_targets() {
        let layout = sample_layout();
        let mut painter = LayoutPainter::new();
        let mut sink1 = DrawOpSink::new();
        let mut sink2 = DrawOpSink::new();
        painter.paint(&layout, &mut sink1);
        painter.paint(&layout, &mut sink2);
        assert_eq!(sink1.into_vec(), sink2.into_vec());
    }

    #[test]
    fn unmeasured_marker_width_suppresses_the_marker_draw_op() {
        let mut layout = sample_layout();
        if let Fragment::Para { marker_text_width, .. } = &mut layout.pages[0].fragments[0] {
            *marker_text_width = None;
        }
        let mut painter = LayoutPainter::new();
        let mut sink = DrawOpSink::new();
        painter.paint(&layout, &mut sink);
        assert!(!sink.ops().iter().any(|op| matches!(op, DrawOp::ListMarker { .. })));
    }

    #[test]
    fn tab_suffix_snaps_to_next_tab_stop() {
        let got = tab_suffix_text_start_px(10.0, Suffix::Tab, &[], 48.0, 6.0);
        assert!((got - 48.0).abs() < 1e-6);
    }

    #[test]
    fn space_suffix_adds_gutter_only() {
        let got = tab_suffix_text_start_px(10.0, Suffix::Space, &[], 48.0, 6.0);
        assert!((got - 16.0).abs() < 1e-6);
    }

    #[test]
    fn drawing_content_box_subtracts_effect_extent_from_fragment_geometry() {
        // S6's numbers: fragment geometry 400x50, effectExtent {10,5,10,5}.
        let fragment_geometry = PxSize { width: 400.0, height: 50.0 };
        let effect_extent = PxEffectExtent { left: 10.0, top: 5.0, right: 10.0, bottom: 5.0 };
        let (offset_x, offset_y, size) = drawing_content_box_px(fragment_geometry, effect_extent);
        assert_eq!((offset_x, offset_y), (10.0, 5.0));
        assert_eq!((size.width, size.height), (380.0, 40.0));
    }
}
