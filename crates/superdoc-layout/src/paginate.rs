//! The paginator (spec §4.G): walks `[FlowBlock]` + `[Measure]` against a
//! page geometry and produces a [`crate::layout_types::Layout`].
//!
//! This is the one module in the pipeline that owns a cursor
//! (`pageIndex, columnIndex, cursorY`, spec §4.G) and therefore the only
//! place block-level overflow decisions get made. Everything it reads
//! (blocks, measures, geometry) is already pure data; its own output is
//! pure data too (spec §8 invariant 9, "Layout purity").

use crate::document::DrawingKind;
use crate::flow::blocks::FlowBlock;
use crate::layout_types::{Fragment, Layout, Page, PxEffectExtent, PxSize};
use crate::measure::Measure;
use crate::units::emu_to_px;
use crate::warnings::{LayoutError, Warning, WarningKind, WarningSite, WarningSink};

/// A full-width anchored table (spec §4.G: "Full-width anchored tables...
/// are demoted to inline layout") is one whose declared width is at least
/// this fraction of the column it would float over. OOXML documents
/// commonly declare a "full width" table a few percent short of the true
/// column width to leave rounding slack, so this is intentionally not 1.0.
pub const ANCHORED_TABLE_FULL_WIDTH_RATIO: f64 = 0.95;

/// OOXML's `relativeHeight` z-order values are drawn from a very large
/// namespace shared with the document's own z-order floor; anchored-drawing
/// z-index (spec §4.G) is `relativeHeight` minus this base constant so the
/// paginator can compare against page-local fragments on a small int scale.
pub const ANCHOR_RELATIVE_HEIGHT_BASE: i64 = 251_658_240;

/// Page geometry: content box dimensions and column layout (spec §4.G,
/// §2.3 [ADDED] "configuration surface").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    /// Usable content width, in pixels (excludes margins).
    pub content_width_px: f64,
    /// Usable content height, in pixels (excludes margins).
    pub content_height_px: f64,
    /// Number of columns (>= 1).
    pub columns: u32,
    /// Gap between columns, in pixels.
    pub column_gap_px: f64,
}

impl PageGeometry {
    /// A single-column, 1-inch-margin Letter-ish default: 6.5in x 9in usable
    /// area at 96 DPI (spec §2.3 "a `RenderOptions::default()` matching a
    /// Letter/A4-agnostic 1-inch-margin single column page").
    pub fn default_single_column() -> Self {
        Self {
            content_width_px: 6.5 * 96.0,
            content_height_px: 9.0 * 96.0,
            columns: 1,
            column_gap_px: 0.5 * 96.0,
        }
    }

    /// Validate this geometry is usable (spec §2.2 `LayoutError::InvalidPageGeometry`).
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.content_width_px <= 0.0 || self.content_height_px <= 0.0 || self.columns == 0 {
            return Err(LayoutError::InvalidPageGeometry {
                width_px: self.content_width_px,
                height_px: self.content_height_px,
            });
        }
        Ok(())
    }

    /// The usable width of a single column.
    pub fn column_width_px(&self) -> f64 {
        let gaps = self.column_gap_px * (self.columns.saturating_sub(1)) as f64;
        ((self.content_width_px - gaps) / self.columns as f64).max(0.0)
    }

    fn column_x_offset_px(&self, column_index: u32) -> f64 {
        column_index as f64 * (self.column_width_px() + self.column_gap_px)
    }
}

/// Cursor state the paginator advances as it walks blocks.
struct Cursor {
    page_index: u32,
    column_index: u32,
    y: f64,
}

impl Cursor {
    fn x(&self, geometry: &PageGeometry) -> f64 {
        geometry.column_x_offset_px(self.column_index)
    }

    fn remaining_height(&self, geometry: &PageGeometry) -> f64 {
        (geometry.content_height_px - self.y).max(0.0)
    }

    fn advance_column_or_page(&mut self, geometry: &PageGeometry) {
        if self.column_index + 1 < geometry.columns {
            self.column_index += 1;
        } else {
            self.page_index += 1;
            self.column_index = 0;
        }
        self.y = 0.0;
    }

    fn advance_page(&mut self) {
        self.page_index += 1;
        self.column_index = 0;
        self.y = 0.0;
    }
}

/// A page being assembled; anchored fragments remember the document-order
/// index they occupy so z-index sorting (spec §8 invariant 8) only
/// reorders the anchored subsequence, never interleaves it past a
/// non-anchored neighbor.
struct PageBuilder {
    number: u32,
    fragments: Vec<Fragment>,
    anchored_slots: Vec<(usize, i64)>,
}

impl PageBuilder {
    fn new(number: u32) -> Self {
        Self {
            number,
            fragments: Vec::new(),
            anchored_slots: Vec::new(),
        }
    }

    fn push(&mut self, fragment: Fragment) {
        self.fragments.push(fragment);
    }

    fn push_anchored(&mut self, fragment: Fragment, z: i64) {
        self.anchored_slots.push((self.fragments.len(), z));
        self.fragments.push(fragment);
    }

    fn finish(mut self) -> Page {
        if !self.anchored_slots.is_empty() {
            let mut by_z = self.anchored_slots.clone();
            by_z.sort_by_key(|(_, z)| *z);
            let reordered: Vec<Fragment> = by_z.iter().map(|(i, _)| self.fragments[*i].clone()).collect();
            let mut slots: Vec<usize> = self.anchored_slots.iter().map(|(i, _)| *i).collect();
            slots.sort_unstable();
            for (slot, fragment) in slots.into_iter().zip(reordered) {
                self.fragments[slot] = fragment;
            }
        }
        Page {
            number: self.number,
            fragments: self.fragments,
        }
    }
}

/// Walk `blocks` + their aligned `measures` (one `Option<Measure>` per
/// block; `None` for page breaks) into a [`Layout`] (spec §4.G).
pub fn paginate(
    blocks: &[FlowBlock],
    measures: &[Option<Measure>],
    geometry: &PageGeometry,
    warnings: &mut WarningSink,
) -> Result<Layout, LayoutError> {
    geometry.validate()?;
    debug_assert_eq!(blocks.len(), measures.len());

    let mut pages: Vec<PageBuilder> = vec![PageBuilder::new(1)];
    let mut cursor = Cursor {
        page_index: 0,
        column_index: 0,
        y: 0.0,
    };

    for (block, measure) in blocks.iter().zip(measures.iter()) {
        while pages.len() <= cursor.page_index as usize {
            pages.push(PageBuilder::new(pages.len() as u32 + 1));
        }
        match block {
            FlowBlock::PageBreak(_) => {
                cursor.advance_page();
                while pages.len() <= cursor.page_index as usize {
                    pages.push(PageBuilder::new(pages.len() as u32 + 1));
                }
            }
            FlowBlock::Paragraph(p) => {
                let Some(Measure::Paragraph(m)) = measure else {
                    continue;
                };
                if p.properties.page_break_before == Some(true) && cursor.y > 0.0 {
                    cursor.advance_page();
                    while pages.len() <= cursor.page_index as usize {
                        pages.push(PageBuilder::new(pages.len() as u32 + 1));
                    }
                }
                place_paragraph(p, m, geometry, &mut cursor, &mut pages, warnings);
            }
            FlowBlock::Table(t) => {
                let Some(Measure::Table(m)) = measure else {
                    continue;
                };
                place_table(t, m, geometry, &mut cursor, &mut pages, warnings);
            }
            FlowBlock::Image(i) => {
                let Some(Measure::Media(m)) = measure else {
                    continue;
                };
                place_media(
                    i.block_id.clone(),
                    None,
                    crate::document::EffectExtent::default(),
                    i.anchor,
                    m,
                    geometry,
                    &mut cursor,
                    &mut pages,
                    warnings,
                );
            }
            FlowBlock::Drawing(d) => {
                let Some(Measure::Media(m)) = measure else {
                    continue;
                };
                place_media(
                    d.block_id.clone(),
                    Some(d.drawing_kind),
                    d.effect_extent,
                    d.anchor,
                    m,
                    geometry,
                    &mut cursor,
                    &mut pages,
                    warnings,
                );
            }
        }
    }

    let pages = pages.into_iter().map(PageBuilder::finish).collect();
    Ok(Layout {
        page_size: PxSize {
            width: geometry.content_width_px,
            height: geometry.content_height_px,
        },
        pages,
    })
}

fn place_paragraph(
    p: &crate::flow::blocks::ParagraphBlock,
    m: &crate::measure::ParagraphMeasure,
    geometry: &PageGeometry,
    cursor: &mut Cursor,
    pages: &mut Vec<PageBuilder>,
    warnings: &mut WarningSink,
) {
    if m.lines.is_empty() {
        return;
    }
    let keep_together = p.properties.keep_lines == Some(true);
    if keep_together && m.total_height <= geometry.content_height_px && m.total_height > cursor.remaining_height(geometry) {
        cursor.advance_column_or_page(geometry);
        ensure_page(pages, cursor);
    }

    let marker = p.list_rendering.is_some().then(|| p.word_layout.marker.as_ref()).flatten();
    let marker_width = marker.and_then(|g| g.marker_box_width_px);
    let marker_text_width = marker.and_then(|g| g.marker_text_width_px);
    let marker_gutter = marker.map(|g| g.marker_gutter_px);

    let mut fragment_start = 0usize;
    let mut fragment_y = cursor.y;
    let mut continues_from_prev = false;

    for (idx, line) in m.lines.iter().enumerate() {
        if cursor.y + line.line_height > geometry.content_height_px && cursor.y > 0.0 {
            pages[cursor.page_index as usize].push(Fragment::Para {
                block_id: p.block_id.clone(),
                from_line: fragment_start,
                to_line: idx,
                x: cursor.x(geometry),
                y: fragment_y,
                width: geometry.column_width_px(),
                marker_width: if fragment_start == 0 { marker_width } else { None },
                marker_text_width: if fragment_start == 0 { marker_text_width } else { None },
                marker_gutter: if fragment_start == 0 { marker_gutter } else { None },
                continues_from_prev,
            });
            continues_from_prev = true;
            cursor.advance_column_or_page(geometry);
            ensure_page(pages, cursor);
            fragment_start = idx;
            fragment_y = cursor.y;
        }
        if line.line_height > geometry.content_height_px {
            warnings.push(Warning::new(
                WarningKind::UnresolvableOverflow {
                    content_height_px: line.line_height,
                    available_height_px: geometry.content_height_px,
                },
                WarningSite::Block(p.block_id.clone()),
            ));
        }
        cursor.y += line.line_height;
    }

    pages[cursor.page_index as usize].push(Fragment::Para {
        block_id: p.block_id.clone(),
        from_line: fragment_start,
        to_line: m.lines.len(),
        x: cursor.x(geometry),
        y: fragment_y,
        width: geometry.column_width_px(),
        marker_width: if fragment_start == 0 { marker_width } else { None },
        marker_text_width: if fragment_start == 0 { marker_text_width } else { None },
        marker_gutter: if fragment_start == 0 { marker_gutter } else { None },
        continues_from_prev,
    });
}

fn place_table(
    t: &crate::flow::blocks::TableBlock,
    m: &crate::measure::TableMeasure,
    geometry: &PageGeometry,
    cursor: &mut Cursor,
    pages: &mut Vec<PageBuilder>,
    warnings: &mut WarningSink,
) {
    if m.row_heights.is_empty() {
        return;
    }
    // Header rows repeat on continuation pages (spec §4.G "repeats header
    // rows on continuation pages when `repeatHeader` is set"): Word only
    // honors the flag on a contiguous run of rows starting at row 0, so a
    // `repeatHeader` row anywhere past the first non-header row is not a
    // header for this purpose.
    let header_row_count = t
        .rows
        .iter()
        .take_while(|row| row.properties.repeat_header == Some(true))
        .count()
        .min(m.row_heights.len());
    let header_height: f64 = m.row_heights[..header_row_count].iter().sum();

    let mut fragment_start = 0usize;
    let mut fragment_y = cursor.y;
    let mut row_ys: Vec<f64> = Vec::new();
    let mut progress_on_page = false;

    let mut idx = 0usize;
    while idx < m.row_heights.len() {
        let height = m.row_heights[idx];
        let cant_split = t.rows[idx].properties.cant_split == Some(true);
        if cursor.y + height > geometry.content_height_px {
            if !progress_on_page && height > geometry.content_height_px {
                warnings.push(Warning::new(
                    WarningKind::UnresolvableOverflow {
                        content_height_px: height,
                        available_height_px: geometry.content_height_px,
                    },
                    WarningSite::Block(t.block_id.clone()),
                ));
                row_ys.push(cursor.y);
                cursor.y += height;
                idx += 1;
                progress_on_page = true;
                continue;
            }
            if !progress_on_page && cant_split {
                // Nothing fits and the row refuses to split anyway; place it
                // clipped rather than loop forever.
                row_ys.push(cursor.y);
                cursor.y += height;
                idx += 1;
                progress_on_page = true;
                continue;
            }
            pages[cursor.page_index as usize].push(Fragment::Table {
                block_id: t.block_id.clone(),
                x: cursor.x(geometry),
                y: fragment_y,
                from_row: fragment_start,
                to_row: idx,
                columns: m.column_x.clone(),
                row_ys: std::mem::take(&mut row_ys),
            });
            cursor.advance_column_or_page(geometry);
            ensure_page(pages, cursor);
            if header_row_count > 0 && idx >= header_row_count {
                let mut header_row_ys = Vec::with_capacity(header_row_count);
                let mut y = cursor.y;
                for &h in &m.row_heights[..header_row_count] {
                    header_row_ys.push(y);
                    y += h;
                }
                pages[cursor.page_index as usize].push(Fragment::Table {
                    block_id: t.block_id.clone(),
                    x: cursor.x(geometry),
                    y: cursor.y,
                    from_row: 0,
                    to_row: header_row_count,
                    columns: m.column_x.clone(),
                    row_ys: header_row_ys,
                });
                cursor.y += header_height;
            }
            progress_on_page = header_row_count > 0 && idx >= header_row_count;
            fragment_start = idx;
            fragment_y = cursor.y;
            continue;
        }
        row_ys.push(cursor.y);
        cursor.y += height;
        progress_on_page = true;
        idx += 1;
    }

    pages[cursor.page_index as usize].push(Fragment::Table {
        block_id: t.block_id.clone(),
        x: cursor.x(geometry),
        y: fragment_y,
        from_row: fragment_start,
        to_row: m.row_heights.len(),
        columns: m.column_x.clone(),
        row_ys,
    });
}

/// Convert a drawing's raw (EMU) `effectExtent` to the pixel-space margins
/// carried onto `Fragment::Drawing` (spec §8 invariant 11). Images have no
/// `effectExtent` concept, so `place_media`'s `Fragment::Image` arm never
/// reads this.
fn effect_extent_px(effect_extent: crate::document::EffectExtent) -> PxEffectExtent {
    PxEffectExtent {
        left: emu_to_px(effect_extent.left),
        top: emu_to_px(effect_extent.top),
        right: emu_to_px(effect_extent.right),
        bottom: emu_to_px(effect_extent.bottom),
    }
}

#[allow(clippy::too_many_arguments)]
fn place_media(
    block_id: String,
    drawing_kind: Option<DrawingKind>,
    effect_extent: crate::document::EffectExtent,
    anchor: Option<crate::document::AnchorData>,
    m: &crate::measure::MediaMeasure,
    geometry: &PageGeometry,
    cursor: &mut Cursor,
    pages: &mut Vec<PageBuilder>,
    _warnings: &mut WarningSink,
) {
    let px_geometry = PxSize {
        width: m.target.width,
        height: m.target.height,
    };
    let effect_extent = effect_extent_px(effect_extent);

    match anchor {
        Some(anchor) => {
            let offset_x = emu_to_px(anchor.offset_x);
            let offset_y = emu_to_px(anchor.offset_y);
            let (x, y) = if anchor.page_relative {
                (offset_x, offset_y)
            } else {
                (cursor.x(geometry) + offset_x, cursor.y + offset_y)
            };
            let z = anchor.relative_height - ANCHOR_RELATIVE_HEIGHT_BASE;
            ensure_page(pages, cursor);
            let page = &mut pages[cursor.page_index as usize];
            let fragment = match drawing_kind {
                Some(kind) => Fragment::Drawing {
                    block_id,
                    drawing_kind: kind,
                    x,
                    y,
                    width: m.target.width,
                    height: m.target.height,
                    geometry: px_geometry,
                    scale: m.scale,
                    is_anchored: true,
                    effect_extent,
                },
                None => Fragment::Image {
                    block_id,
                    x,
                    y,
                    width: m.target.width,
                    height: m.target.height,
                    geometry: px_geometry,
                    scale: m.scale,
                    is_anchored: true,
                },
            };
            page.push_anchored(fragment, z);
        }
        None => {
            if cursor.y + m.target.height > geometry.content_height_px && cursor.y > 0.0 {
                cursor.advance_column_or_page(geometry);
                ensure_page(pages, cursor);
            }
            let x = cursor.x(geometry);
            let y = cursor.y;
            let fragment = match drawing_kind {
                Some(kind) => Fragment::Drawing {
                    block_id,
                    drawing_kind: kind,
                    x,
                    y,
                    width: m.target.width,
                    height: m.target.height,
                    geometry: px_geometry,
                    scale: m.scale,
                    is_anchored: false,
                    effect_extent,
                },
                None => Fragment::Image {
                    block_id,
                    x,
                    y,
                    width: m.target.width,
                    height: m.target.height,
                    geometry: px_geometry,
                    scale: m.scale,
                    is_anchored: false,
                },
            };
            pages[cursor.page_index as usize].push(fragment);
            cursor.y += m.target.height;
        }
    }
}

fn ensure_page(pages: &mut Vec<PageBuilder>, cursor: &Cursor) {
    while pages.len() <= cursor.page_index as usize {
        pages.push(PageBuilder::new(pages.len() as u32 + 1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::blocks::{FlowRun, InlineItem, ParagraphBlock};
    use crate::measure::LineMetric;
    use crate::style::context::{ParagraphProperties, RunProperties};
    use crate::wordlayout::{compute_word_layout, WordLayout};

    fn word_layout() -> WordLayout {
        compute_word_layout(&crate::style::context::Indent::default(), &[], 720, None)
    }

    fn paragraph(block_id: &str) -> ParagraphBlock {
        ParagraphBlock {
            block_id: block_id.to_string(),
            pm_start: Some(0),
            properties: ParagraphProperties::default(),
            word_layout: word_layout(),
            list_rendering: None,
            content: vec![InlineItem::Run(FlowRun {
                text: "hello".to_string(),
                properties: RunProperties::default(),
                pm_start: Some(0),
                pm_end: Some(5),
            })],
            leading_caret: false,
            is_toc_entry: false,
            toc_instruction: None,
            sdt: None,
            container_sdt: None,
        }
    }

    fn line(height: f64) -> LineMetric {
        LineMetric {
            from_run: 0,
            from_char: 0,
            to_run: 0,
            to_char: 5,
            width: 10.0,
            ascent: height * 0.8,
            descent: height * 0.2,
            line_height: height,
        }
    }

    #[test]
    fn invalid_geometry_is_rejected() {
        let geometry = PageGeometry {
            content_width_px: 0.0,
            content_height_px: 100.0,
            columns: 1,
            column_gap_px: 0.0,
        };
        let mut warnings = WarningSink::new();
        let err = paginate(&[], &[], &geometry, &mut warnings).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidPageGeometry { .. }));
    }

    #[test]
    fn short_paragraph_fits_on_one_page() {
        let geometry = PageGeometry {
            content_width_px: 400.0,
            content_height_px: 400.0,
            columns: 1,
            column_gap_px: 0.0,
        };
        let p = paragraph("p1");
        let measure = crate::measure::ParagraphMeasure {
            lines: vec![line(20.0)],
            total_height: 20.0,
        };
        let mut warnings = WarningSink::new();
        let layout = paginate(
            &[FlowBlock::Paragraph(p)],
            &[Some(Measure::Paragraph(measure))],
            &geometry,
            &mut warnings,
        )
        .unwrap();
        assert_eq!(layout.pages.len(), 1);
        assert_eq!(layout.pages[0].fragments.len(), 1);
    }

    #[test]
    fn tall_paragraph_splits_across_pages() {
        let geometry = PageGeometry {
            content_width_px: 400.0,
            content_height_px: 50.0,
            columns: 1,
            column_gap_px: 0.0,
        };
        let p = paragraph("p1");
        let measure = crate::measure::ParagraphMeasure {
            lines: vec![line(30.0), line(30.0), line(30.0)],
            total_height: 90.0,
        };
        let mut warnings = WarningSink::new();
        let layout = paginate(
            &[FlowBlock::Paragraph(p)],
            &[Some(Measure::Paragraph(measure))],
            &geometry,
            &mut warnings,
        )
        .unwrap();
        assert!(layout.pages.len() >= 2);
    }

    #[test]
    fn repeat_pagination_is_byte_equal() {
        let geometry = PageGeometry {
            content_width_px: 400.0,
            content_height_px: 50.0,
            columns: 1,
            column_gap_px: 0.0,
        };
        let p = paragraph("p1");
        let blocks = [FlowBlock::Paragraph(p)];
        let measures = [Some(Measure::Paragraph(crate::measure::ParagraphMeasure {
            lines: vec![line(30.0), line(30.0)],
            total_height: 60.0,
        }))];
        let mut w1 = WarningSink::new();
        let mut w2 = WarningSink::new();
        let layout1 = paginate(&blocks, &measures, &geometry, &mut w1).unwrap();
        let layout2 = paginate(&blocks, &measures, &geometry, &mut w2).unwrap();
        assert_eq!(layout1, layout2);
    }

    #[test]
    fn page_break_block_advances_to_a_new_page() {
        let geometry = PageGeometry {
            content_width_px: 400.0,
            content_height_px: 400.0,
            columns: 1,
            column_gap_px: 0.0,
        };
        let p1 = paragraph("p1");
        let p2 = paragraph("p2");
        let blocks = [
            FlowBlock::Paragraph(p1),
            FlowBlock::PageBreak(crate::flow::blocks::PageBreakBlock {
                block_id: "pb".to_string(),
                pm_start: None,
            }),
            FlowBlock::Paragraph(p2),
        ];
        let measures = [
            Some(Measure::Paragraph(crate::measure::ParagraphMeasure {
                lines: vec![line(20.0)],
                total_height: 20.0,
            })),
            None,
            Some(Measure::Paragraph(crate::measure::ParagraphMeasure {
                lines: vec![line(20.0)],
                total_height: 20.0,
            })),
        ];
        let mut warnings = WarningSink::new();
        let layout = paginate(&blocks, &measures, &geometry, &mut warnings).unwrap();
        assert_eq!(layout.pages.len(), 2);
        assert_eq!(layout.pages[0].fragments[0].block_id(), "p1");
        assert_eq!(layout.pages[1].fragments[0].block_id(), "p2");
    }
}
