//! FlowBlock types (spec §4.E, §4.F): the converter's output shape, and the
//! unit the cache stores and shifts.

use crate::document::{AnchorData, AttrMap, CellSpan, DrawingKind, FieldAnnotationAttrs, Geometry, SdtMetadata};
use crate::style::context::{ParagraphProperties, RunProperties, TableCellProperties, TableProperties, TableRowProperties};
use crate::wordlayout::WordLayout;

/// A maximal run of inline text sharing one resolved [`RunProperties`] bag.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowRun {
    /// The run's text.
    pub text: String,
    /// Fully cascaded run properties.
    pub properties: RunProperties,
    /// Inclusive PM-position start, if tracked.
    pub pm_start: Option<usize>,
    /// Exclusive PM-position end, if tracked.
    pub pm_end: Option<usize>,
}

/// A field annotation placed inline within a paragraph (spec §4.E).
#[derive(Debug, Clone, PartialEq)]
pub struct FlowFieldAnnotation {
    /// The field's attributes.
    pub attrs: FieldAnnotationAttrs,
    /// Inclusive PM-position start, if tracked.
    pub pm_start: Option<usize>,
    /// Exclusive PM-position end, if tracked.
    pub pm_end: Option<usize>,
}

/// A drawing object, either inline (flows within a paragraph's runs) or
/// anchored (its own floating [`FlowBlock`]).
#[derive(Debug, Clone, PartialEq)]
pub struct FlowDrawing {
    /// Stable id for cache keying / painter lookups.
    pub block_id: String,
    /// Drawing variant.
    pub drawing_kind: DrawingKind,
    /// Block geometry as declared in the document (spec §4.E: painters must
    /// read the *fragment* geometry once laid out, never this field).
    pub geometry: Geometry,
    /// Effect-extent margins.
    pub effect_extent: crate::document::EffectExtent,
    /// Anchoring data; `None` means inline.
    pub anchor: Option<AnchorData>,
    /// Passthrough shape attrs.
    pub attrs: AttrMap,
    /// Inclusive PM-position start, if tracked.
    pub pm_start: Option<usize>,
    /// Exclusive PM-position end, if tracked.
    pub pm_end: Option<usize>,
}

/// An image object, either inline or anchored.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowImage {
    /// Stable id for cache keying / painter lookups.
    pub block_id: String,
    /// Source reference.
    pub src: String,
    /// Natural geometry.
    pub geometry: Geometry,
    /// Anchoring data; `None` means inline.
    pub anchor: Option<AnchorData>,
    /// Passthrough attrs.
    pub attrs: AttrMap,
    /// Inclusive PM-position start, if tracked.
    pub pm_start: Option<usize>,
    /// Exclusive PM-position end, if tracked.
    pub pm_end: Option<usize>,
    /// Inner SDT metadata, if this image sits inside a structured content container.
    pub sdt: Option<SdtMetadata>,
    /// Outer SDT metadata, if nested inside a second containing SDT.
    pub container_sdt: Option<SdtMetadata>,
}

/// One resolved level of a paragraph's list marker (spec §4.C, §4.D).
#[derive(Debug, Clone, PartialEq)]
pub struct ListRendering {
    /// `[c_0, ..., c_ilvl]`.
    pub path: Vec<i32>,
    /// The expanded marker text.
    pub marker_text: String,
    /// Marker/tab geometry for this paragraph.
    pub word_layout: WordLayout,
}

/// An inline content item within a paragraph, in document order.
#[derive(Debug, Clone, PartialEq)]
pub enum InlineItem {
    /// Flattened run of text sharing one mark set.
    Run(FlowRun),
    /// An inline field annotation atom.
    FieldAnnotation(FlowFieldAnnotation),
    /// An inline (non-anchored) drawing.
    InlineDrawing(FlowDrawing),
    /// An inline (non-anchored) image.
    InlineImage(FlowImage),
    /// An explicit line break.
    LineBreak,
}

/// A paragraph FlowBlock (spec §4.E "paragraph" handler).
#[derive(Debug, Clone, PartialEq)]
pub struct ParagraphBlock {
    /// Stable block id (`sdBlockId`, or a synthesized fallback).
    pub block_id: String,
    /// Inclusive PM-position of the paragraph's own open token, if tracked.
    pub pm_start: Option<usize>,
    /// Fully cascaded paragraph properties.
    pub properties: ParagraphProperties,
    /// Word-layout geometry; `marker` is set only for numbered paragraphs and
    /// duplicated into `list_rendering.word_layout`.
    pub word_layout: WordLayout,
    /// List numbering, if this paragraph is a list item and numbering
    /// resolved successfully (spec §7 "Numbering gap": cleared on miss).
    pub list_rendering: Option<ListRendering>,
    /// Flattened inline content, in document order.
    pub content: Vec<InlineItem>,
    /// Whether a zero-width leading-caret widget must render before the
    /// first inline item (spec §4.E "Leading-caret policy").
    pub leading_caret: bool,
    /// Set by the TOC handler on unwrapped entries.
    pub is_toc_entry: bool,
    /// The TOC field instruction, if `is_toc_entry`.
    pub toc_instruction: Option<String>,
    /// Inner SDT metadata, if this paragraph sits directly inside an SDT.
    pub sdt: Option<SdtMetadata>,
    /// Outer SDT metadata, if nested inside a second containing SDT.
    pub container_sdt: Option<SdtMetadata>,
}

/// A table cell, recursively holding its own block content.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowTableCell {
    /// Span/merge attributes.
    pub span: CellSpan,
    /// Fully cascaded cell properties.
    pub properties: TableCellProperties,
    /// `true` for `tableHeader` nodes (spec: "semantically equivalent to
    /// tableCell for layout and export").
    pub is_header: bool,
    /// The cell's own block content (paragraphs, nested tables, …).
    pub content: Vec<FlowBlock>,
}

/// A table row.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowTableRow {
    /// Fully cascaded row properties.
    pub properties: TableRowProperties,
    /// Cells, left to right.
    pub cells: Vec<FlowTableCell>,
}

/// A table FlowBlock.
#[derive(Debug, Clone, PartialEq)]
pub struct TableBlock {
    /// Stable block id.
    pub block_id: String,
    /// Inclusive PM-position of the table's own open token, if tracked.
    pub pm_start: Option<usize>,
    /// Column widths, in twips, left to right.
    pub grid: Vec<i32>,
    /// Referenced table style id.
    pub table_style_id: Option<String>,
    /// Fully cascaded table properties.
    pub properties: TableProperties,
    /// Rows, top to bottom.
    pub rows: Vec<FlowTableRow>,
    /// Inner SDT metadata, if this table sits inside a structured content container.
    pub sdt: Option<SdtMetadata>,
    /// Outer SDT metadata, if nested inside a second containing SDT.
    pub container_sdt: Option<SdtMetadata>,
}

/// A standalone (block-level, non-inline) page break.
#[derive(Debug, Clone, PartialEq)]
pub struct PageBreakBlock {
    /// Synthesized stable id.
    pub block_id: String,
    /// Inclusive PM-position, if tracked.
    pub pm_start: Option<usize>,
}

/// The converter's output unit (spec §4.E, §4.F).
#[derive(Debug, Clone, PartialEq)]
pub enum FlowBlock {
    /// A paragraph.
    Paragraph(ParagraphBlock),
    /// A table.
    Table(TableBlock),
    /// An anchored (block-level) image.
    Image(FlowImage),
    /// An anchored (block-level) drawing.
    Drawing(FlowDrawing),
    /// A block-level page break.
    PageBreak(PageBreakBlock),
}

impl FlowBlock {
    /// The block's stable id, regardless of kind.
    pub fn block_id(&self) -> &str {
        match self {
            FlowBlock::Paragraph(p) => &p.block_id,
            FlowBlock::Table(t) => &t.block_id,
            FlowBlock::Image(i) => &i.block_id,
            FlowBlock::Drawing(d) => &d.block_id,
            FlowBlock::PageBreak(b) => &b.block_id,
        }
    }

    /// Shift every PM position this block carries by `delta` (spec §4.F
    /// "Shift rules by block kind"). Always operates in place on an owned
    /// (already shallow-copied) value; callers must not call this on a
    /// value still shared with the cache.
    pub fn shift_positions(&mut self, delta: i64) {
        fn shift(pos: Option<usize>, delta: i64) -> Option<usize> {
            pos.map(|p| (p as i64 + delta).max(0) as usize)
        }
        match self {
            FlowBlock::Paragraph(p) => {
                p.pm_start = shift(p.pm_start, delta);
                for item in &mut p.content {
                    match item {
                        InlineItem::Run(r) => {
                            r.pm_start = shift(r.pm_start, delta);
                            r.pm_end = shift(r.pm_end, delta);
                        }
                        InlineItem::FieldAnnotation(f) => {
                            f.pm_start = shift(f.pm_start, delta);
                            f.pm_end = shift(f.pm_end, delta);
                        }
                        InlineItem::InlineDrawing(d) => {
                            d.pm_start = shift(d.pm_start, delta);
                            d.pm_end = shift(d.pm_end, delta);
                        }
                        InlineItem::InlineImage(i) => {
                            i.pm_start = shift(i.pm_start, delta);
                            i.pm_end = shift(i.pm_end, delta);
                        }
                        InlineItem::LineBreak => {}
                    }
                }
            }
            FlowBlock::Table(t) => {
                t.pm_start = shift(t.pm_start, delta);
                shift_table_rows(&mut t.rows, delta);
            }
            FlowBlock::Image(i) => {
                i.pm_start = shift(i.pm_start, delta);
                i.pm_end = shift(i.pm_end, delta);
            }
            FlowBlock::Drawing(d) => {
                d.pm_start = shift(d.pm_start, delta);
                d.pm_end = shift(d.pm_end, delta);
            }
            FlowBlock::PageBreak(b) => {
                b.pm_start = shift(b.pm_start, delta);
            }
        }
    }
}

fn shift_table_rows(rows: &mut [FlowTableRow], delta: i64) {
    for row in rows {
        for cell in &mut row.cells {
            for block in &mut cell.content {
                block.shift_positions(delta);
            }
        }
    }
}

fn min_opt(a: Option<usize>, b: Option<usize>) -> Option<usize> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (Some(x), None) | (None, Some(x)) => Some(x),
        (None, None) => None,
    }
}

/// The smallest PM position carried anywhere within `blocks`, walking every
/// position this crate's `shift_positions` itself touches (paragraph/run/
/// field-annotation/inline-media positions, table row/cell content,
/// image/drawing/page-break positions).
///
/// Used by [`crate::cache::FlowBlockCache::lookup`] to detect a shift that
/// would otherwise map a cached position below zero (spec §7 "Cache
/// inconsistency"): `entry.pm_start` alone can't witness this, since a
/// cache entry's own bookkeeping `pm_start` need not agree with the minimum
/// position actually recorded on its blocks.
pub fn min_pm_start(blocks: &[FlowBlock]) -> Option<usize> {
    fn inline_item_min(item: &InlineItem) -> Option<usize> {
        match item {
            InlineItem::Run(r) => min_opt(r.pm_start, r.pm_end),
            InlineItem::FieldAnnotation(f) => min_opt(f.pm_start, f.pm_end),
            InlineItem::InlineDrawing(d) => min_opt(d.pm_start, d.pm_end),
            InlineItem::InlineImage(i) => min_opt(i.pm_start, i.pm_end),
            InlineItem::LineBreak => None,
        }
    }
    fn block_min(block: &FlowBlock) -> Option<usize> {
        match block {
            FlowBlock::Paragraph(p) => p.content.iter().fold(p.pm_start, |acc, item| min_opt(acc, inline_item_min(item))),
            FlowBlock::Table(t) => t.rows.iter().flat_map(|row| &row.cells).fold(t.pm_start, |acc, cell| min_opt(acc, min_pm_start(&cell.content))),
            FlowBlock::Image(i) => min_opt(i.pm_start, i.pm_end),
            FlowBlock::Drawing(d) => min_opt(d.pm_start, d.pm_end),
            FlowBlock::PageBreak(b) => b.pm_start,
        }
    }
    blocks.iter().fold(None, |acc, block| min_opt(acc, block_min(block)))
}

/// Build a deterministic fallback block id from a PM position, used when a
/// node carries no `sdBlockId` (spec §4.F key: "falling back to an imported
/// paraId"; absent that too, position is the most stable thing available).
pub fn fallback_block_id(prefix: &str, pm_start: Option<usize>) -> String {
    match pm_start {
        Some(pos) => format!("{prefix}@{pos}"),
        None => format!("{prefix}@?"),
    }
}
