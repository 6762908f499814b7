//! The measurer contract (spec §4.G): text shaping and line breaking per
//! block, producing a [`Measure`] the paginator consumes.
//!
//! Real hosts plug in their platform text shaper (the spec notes "the
//! measurer is external in most implementations"); this module defines the
//! contract (the [`Measurer`] trait) plus one reference implementation,
//! [`SimpleMeasurer`], good enough to drive the paginator in tests and the
//! demo binary without a real font backend. It approximates glyph advance
//! with `unicode_width`'s terminal-cell widths scaled to a configured
//! pixels-per-cell constant, the same family of approximation the teacher
//! crate's headless layout engine uses for soft-wrap width accounting.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthChar;

use crate::flow::blocks::{InlineItem, ParagraphBlock};
use crate::layout_types::PxSize;
use crate::style::context::LineRule;
use crate::warnings::{Warning, WarningKind, WarningSite, WarningSink};

/// One laid-out line within a paragraph (spec §3 "Measure").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMetric {
    /// Index of the [`InlineItem::Run`] (by flattened content-item index) the line starts within.
    pub from_run: usize,
    /// Character offset within that run where the line starts.
    pub from_char: usize,
    /// Index of the content item the line ends within (exclusive item, or same item as `from_run`).
    pub to_run: usize,
    /// Character offset within that run where the line ends.
    pub to_char: usize,
    /// Line width, in pixels.
    pub width: f64,
    /// Ascent above the baseline, in pixels.
    pub ascent: f64,
    /// Descent below the baseline, in pixels.
    pub descent: f64,
    /// Total line height (leading included), in pixels.
    pub line_height: f64,
}

/// A paragraph's measured lines (spec §3 "Measure").
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParagraphMeasure {
    /// Lines, in reading order.
    pub lines: Vec<LineMetric>,
    /// Sum of every line's `line_height` (spec: "totalHeight").
    pub total_height: f64,
}

/// An image/drawing's natural and target dimensions (spec §3 "Measure").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaMeasure {
    /// The media's unscaled natural size, in pixels.
    pub natural: PxSize,
    /// The size it will actually occupy once placed, in pixels.
    pub target: PxSize,
    /// `target` area divided by `natural` area's square root — i.e. the
    /// linear scale factor applied uniformly to both axes.
    pub scale: f64,
}

/// Per-row geometry a table needs from the measurer before the paginator can
/// decide where rows split across pages (spec §4.G "`TableMeasure`").
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableMeasure {
    /// Column left-edge x-offsets from the table's own left edge, in pixels.
    pub column_x: Vec<f64>,
    /// Each row's height, in pixels, one entry per [`crate::flow::blocks::TableBlock::rows`].
    pub row_heights: Vec<f64>,
}

/// Either of the measure kinds a [`crate::flow::blocks::FlowBlock`] produces;
/// `crate::paginate` aligns one `Option<Measure>` per block (`None` for page
/// breaks, which need no measurement).
#[derive(Debug, Clone, PartialEq)]
pub enum Measure {
    /// A paragraph's measured lines.
    Paragraph(ParagraphMeasure),
    /// An image or drawing's natural/target dimensions.
    Media(MediaMeasure),
    /// A table's column/row geometry.
    Table(TableMeasure),
}

/// A barrier the paginator waits on before consuming any [`Measure`] (spec
/// §5 "Suspension points": "Measurement may suspend on font loading ... the
/// paginator is not run until it completes"). The core pipeline is
/// synchronous (§5), so this is a plain blocking call, not an async future;
/// hosts with no remote font loading implement it as a no-op.
pub trait FontsReadyBarrier {
    /// Block the caller until fonts needed for measurement are ready.
    fn wait_for_fonts_ready(&self);
}

/// A barrier that is always immediately ready.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFontsBarrier;

impl FontsReadyBarrier for NoopFontsBarrier {
    fn wait_for_fonts_ready(&self) {}
}

/// The measurer contract (spec §4.G).
pub trait Measurer {
    /// The font-loading barrier this measurer exposes.
    fn fonts_barrier(&self) -> &dyn FontsReadyBarrier;

    /// Measure a paragraph's runs against a target content width, breaking
    /// lines at soft-break opportunities.
    fn measure_paragraph(
        &self,
        block: &ParagraphBlock,
        content_width_px: f64,
        warnings: &mut WarningSink,
    ) -> ParagraphMeasure;

    /// Measure an image/drawing's natural size against an optional
    /// explicit target hint (e.g. an explicit width/height from the
    /// document); when absent, target equals natural.
    fn measure_media(&self, natural: PxSize, target_hint: Option<PxSize>) -> MediaMeasure;

    /// Measure a table's column/row geometry against a target content width.
    fn measure_table(
        &self,
        block: &crate::flow::blocks::TableBlock,
        content_width_px: f64,
    ) -> TableMeasure;

    /// The width of a marker's glyph(s) set in a given font size, used by
    /// `crate::wordlayout` to gate and size list markers.
    fn measure_marker_text(&self, text: &str, font_size_half_pt: i32) -> f64;
}

/// Convert `spacing`'s `line`/`line_rule` plus the paragraph's dominant font
/// size into a concrete line height, per spec §4.G ("line height ... computed
/// from spacing rules: exact / at-least / multiple / auto").
fn resolve_line_height(
    spacing: Option<&crate::style::context::Spacing>,
    natural_height_px: f64,
) -> f64 {
    let Some(spacing) = spacing else {
        return natural_height_px;
    };
    match (spacing.line, spacing.line_rule) {
        (Some(line), Some(LineRule::Exact)) => crate::units::twips_to_px(line),
        (Some(line), Some(LineRule::AtLeast)) => crate::units::twips_to_px(line).max(natural_height_px),
        (Some(line), Some(LineRule::Multiple)) => natural_height_px * (line as f64 / 240.0),
        _ => natural_height_px,
    }
}

/// Approximate pixels-per-cell for [`SimpleMeasurer`]'s `unicode_width`
/// based advance model, calibrated so a 12pt (24 half-point) default font
/// renders roughly monospace-plausible widths.
const PX_PER_CELL: f64 = 7.2;

/// Reference [`Measurer`] implementation good enough to drive the paginator
/// without a real text shaper: glyph advance is `unicode_width`'s
/// East-Asian-aware terminal cell width times [`PX_PER_CELL`], scaled by
/// each run's font size relative to a 12pt baseline.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleMeasurer {
    barrier: NoopFontsBarrier,
}

impl SimpleMeasurer {
    /// Construct a measurer with the no-op fonts barrier.
    pub fn new() -> Self {
        Self::default()
    }

    fn char_width_px(ch: char, font_size_half_pt: i32) -> f64 {
        let cells = ch.width().unwrap_or(0) as f64;
        let scale = font_size_half_pt as f64 / 24.0;
        cells * PX_PER_CELL * scale.max(0.1)
    }

    fn font_size_of(properties: &crate::style::context::RunProperties) -> i32 {
        properties.font_size_half_pt.unwrap_or(24)
    }
}

impl Measurer for SimpleMeasurer {
    fn fonts_barrier(&self) -> &dyn FontsReadyBarrier {
        &self.barrier
    }

    fn measure_paragraph(
        &self,
        block: &ParagraphBlock,
        content_width_px: f64,
        warnings: &mut WarningSink,
    ) -> ParagraphMeasure {
        if content_width_px <= 0.0 {
            warnings.push(Warning::new(
                WarningKind::MeasurerFailure {
                    reason: "non-positive content width".to_string(),
                },
                WarningSite::Block(block.block_id.clone()),
            ));
            return ParagraphMeasure {
                lines: vec![LineMetric {
                    from_run: 0,
                    from_char: 0,
                    to_run: 0,
                    to_char: 0,
                    width: 0.0,
                    ascent: 0.0,
                    descent: 0.0,
                    line_height: 0.0,
                }],
                total_height: 0.0,
            };
        }

        // Starting x accounts for the word-layout text start on the first line.
        let mut lines = Vec::new();
        let mut cur_width = block.word_layout.text_start_px;
        let mut cur_from_run = 0usize;
        let mut cur_from_char = 0usize;
        let mut cur_ascent = 0.0f64;
        let mut cur_descent = 0.0f64;
        let mut any_char_on_line = false;

        let runs: Vec<(usize, &str, &crate::style::context::RunProperties)> = block
            .content
            .iter()
            .enumerate()
            .filter_map(|(i, item)| match item {
                InlineItem::Run(r) => Some((i, r.text.as_str(), &r.properties)),
                _ => None,
            })
            .collect();

        if runs.is_empty() {
            let font_size = 24;
            let ascent = crate::units::half_points_to_px(font_size) * 0.8;
            let descent = crate::units::half_points_to_px(font_size) * 0.2;
            let line_height = resolve_line_height(block.properties.spacing.as_ref(), ascent + descent);
            return ParagraphMeasure {
                lines: vec![LineMetric {
                    from_run: 0,
                    from_char: 0,
                    to_run: 0,
                    to_char: 0,
                    width: block.word_layout.text_start_px,
                    ascent,
                    descent,
                    line_height,
                }],
                total_height: line_height,
            };
        }

        for &(run_idx, text, props) in &runs {
            let font_size = Self::font_size_of(props);
            let ascent = crate::units::half_points_to_px(font_size) * 0.8;
            let descent = crate::units::half_points_to_px(font_size) * 0.2;
            let mut char_idx = 0usize;
            // Break only at word boundaries (spec §4.G "soft-break
            // opportunities"), not mid-word, using the same Unicode word
            // segmentation the teacher crate uses for cursor motion.
            for word in text.split_word_bounds() {
                let word_width: f64 = word.chars().map(|c| Self::char_width_px(c, font_size)).sum();
                let word_is_whitespace = word.chars().all(char::is_whitespace);
                if any_char_on_line && cur_width + word_width > content_width_px && !word_is_whitespace {
                    let line_height =
                        resolve_line_height(block.properties.spacing.as_ref(), cur_ascent + cur_descent);
                    lines.push(LineMetric {
                        from_run: cur_from_run,
                        from_char: cur_from_char,
                        to_run: run_idx,
                        to_char: char_idx,
                        width: cur_width,
                        ascent: cur_ascent,
                        descent: cur_descent,
                        line_height,
                    });
                    cur_from_run = run_idx;
                    cur_from_char = char_idx;
                    cur_width = 0.0;
                    cur_ascent = 0.0;
                    cur_descent = 0.0;
                    any_char_on_line = false;
                }
                cur_width += word_width;
                cur_ascent = cur_ascent.max(ascent);
                cur_descent = cur_descent.max(descent);
                any_char_on_line = any_char_on_line || !word.is_empty();
                char_idx += word.chars().count();
            }
        }

        let last_run_idx = runs.last().map(|(i, _, _)| *i).unwrap_or(0);
        let last_char_idx = runs
            .last()
            .map(|(_, text, _)| text.chars().count())
            .unwrap_or(0);
        let line_height = resolve_line_height(block.properties.spacing.as_ref(), cur_ascent + cur_descent);
        lines.push(LineMetric {
            from_run: cur_from_run,
            from_char: cur_from_char,
            to_run: last_run_idx,
            to_char: last_char_idx,
            width: cur_width,
            ascent: cur_ascent,
            descent: cur_descent,
            line_height,
        });

        let total_height = lines.iter().map(|l| l.line_height).sum();
        ParagraphMeasure { lines, total_height }
    }

    fn measure_media(&self, natural: PxSize, target_hint: Option<PxSize>) -> MediaMeasure {
        let target = target_hint.unwrap_or(natural);
        let natural_area = (natural.width * natural.height).max(1e-9);
        let target_area = target.width * target.height;
        let scale = (target_area / natural_area).sqrt();
        MediaMeasure {
            natural,
            target,
            scale,
        }
    }

    fn measure_table(
        &self,
        block: &crate::flow::blocks::TableBlock,
        content_width_px: f64,
    ) -> TableMeasure {
        let total_twips: i64 = block.grid.iter().map(|&w| w as i64).sum();
        let mut column_x = Vec::with_capacity(block.grid.len());
        let mut x = 0.0f64;
        for &w in &block.grid {
            column_x.push(x);
            let share = if total_twips > 0 {
                content_width_px * (w as f64 / total_twips as f64)
            } else if !block.grid.is_empty() {
                content_width_px / block.grid.len() as f64
            } else {
                0.0
            };
            x += share;
        }

        let row_heights = block
            .rows
            .iter()
            .map(|row| {
                let explicit = row.properties.height.map(crate::units::twips_to_px);
                let content_height = row
                    .cells
                    .iter()
                    .map(|cell| {
                        cell.content
                            .iter()
                            .map(|b| self.estimate_block_height(b, content_width_px))
                            .sum::<f64>()
                    })
                    .fold(0.0f64, f64::max);
                explicit.unwrap_or(content_height).max(content_height)
            })
            .collect();

        TableMeasure {
            column_x,
            row_heights,
        }
    }

    fn measure_marker_text(&self, text: &str, font_size_half_pt: i32) -> f64 {
        text.chars()
            .map(|c| Self::char_width_px(c, font_size_half_pt))
            .sum()
    }
}

impl SimpleMeasurer {
    fn estimate_block_height(&self, block: &crate::flow::blocks::FlowBlock, content_width_px: f64) -> f64 {
        use crate::flow::blocks::FlowBlock;
        match block {
            FlowBlock::Paragraph(p) => {
                let mut sink = WarningSink::new();
                self.measure_paragraph(p, content_width_px, &mut sink).total_height
            }
            FlowBlock::Table(t) => self
                .measure_table(t, content_width_px)
                .row_heights
                .iter()
                .sum(),
            FlowBlock::Image(i) => crate::units::twips_to_px((i.geometry.height / 635) as i32).max(0.0),
            FlowBlock::Drawing(d) => crate::units::twips_to_px((d.geometry.height / 635) as i32).max(0.0),
            FlowBlock::PageBreak(_) => 0.0,
        }
    }
}
