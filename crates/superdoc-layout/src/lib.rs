//! `superdoc-layout`: the pure document-rendering pipeline behind a
//! WordprocessingML-flavored rich-text editor — style cascade, list
//! numbering, word-paragraph layout, flow-block extraction, incremental
//! conversion cache, and the measurer/paginator/painter contract.
//!
//! This crate does no I/O: it never parses a `.docx` zip, never talks to a
//! collaboration server, and ships no UI toolkit dependency. A host feeds it
//! an [`document::Node`] tree plus a resolved [`style::StyleContext`] and
//! gets back a [`layout_types::Layout`] (plus any [`warnings::Warning`]s) to
//! paint. [`render`] is the single entry point that wires every stage
//! together; each stage is independently usable for hosts that want to
//! compose the pipeline differently (e.g. measuring in a worker thread).

pub mod cache;
pub mod document;
pub mod flow;
pub mod layout_types;
pub mod measure;
pub mod numbering;
pub mod paginate;
pub mod painter;
pub mod style;
pub mod units;
pub mod warnings;
pub mod wordlayout;

pub use cache::FlowBlockCache;
pub use document::Node;
pub use layout_types::Layout;
pub use measure::Measurer;
pub use paginate::PageGeometry;
pub use painter::{DrawOp, DrawOpSink, PaintTarget, Painter};
pub use style::StyleContext;
pub use warnings::{LayoutError, Warning};

use flow::blocks::FlowBlock;
use measure::Measure;
use numbering::NumberingManager;
use style::context::NumberingTables;

/// The host-configurable "configuration surface" of a render (spec §2.3
/// [ADDED]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    /// Document-wide default tab interval, in twips, used whenever a
    /// paragraph or marker suffix needs to snap to a tab stop with no
    /// explicit `tabs` entry covering it.
    pub default_tab_interval_twips: i32,
    /// Whether the leading-caret widget policy (spec §4.E) is honored. When
    /// `false`, `ParagraphBlock::leading_caret` is always `false` regardless
    /// of content shape, matching a host that renders its own caret affordance.
    pub leading_caret_enabled: bool,
}

impl Default for RenderOptions {
    /// A single-column, 1-inch-margin Letter/A4-agnostic default matching
    /// [`PageGeometry::default_single_column`]'s usable width, with a
    /// half-inch default tab interval (720 twips) and the leading-caret
    /// policy enabled.
    fn default() -> Self {
        Self {
            default_tab_interval_twips: 720,
            leading_caret_enabled: true,
        }
    }
}

/// The terminal output of a render: the laid-out pages plus every
/// recoverable warning encountered along the way (spec §7: warnings never
/// suppress the layout they're attached to).
#[derive(Debug, Clone, PartialEq)]
pub struct RenderResult {
    /// The paginated layout.
    pub layout: Layout,
    /// Warnings recorded during conversion, measurement, and pagination, in
    /// the order they were detected.
    pub warnings: Vec<Warning>,
}

/// Run the full pipeline once: validate, convert to [`FlowBlock`]s, measure,
/// and paginate (spec §2 "one-way transformation").
///
/// `cache` is threaded through [`flow::convert_blocks_cached`] (spec §4.F):
/// bracketed by `begin`/`commit` so a host sharing one [`FlowBlockCache`]
/// across renders keeps it in a consistent generation, and consulted for
/// every top-level paragraph with a stable `sdBlockId` before falling back
/// to a fresh conversion.
pub fn render(
    document: &[Node],
    ctx: &StyleContext,
    numbering_tables: &NumberingTables,
    geometry: &PageGeometry,
    options: &RenderOptions,
    measurer: &dyn Measurer,
    cache: &mut FlowBlockCache,
) -> Result<RenderResult, LayoutError> {
    geometry.validate()?;
    measurer.fonts_barrier().wait_for_fonts_ready();

    let mut warnings = warnings::WarningSink::new();
    flow::validate_tree(document, &mut warnings);

    cache.begin();
    let mut numbering = NumberingManager::new(numbering_tables);
    numbering.begin();
    let mut pos = flow::position::PositionWalker::new();
    let mut blocks = flow::convert_blocks_cached(
        document,
        ctx,
        &mut numbering,
        options.default_tab_interval_twips,
        &mut warnings,
        &mut pos,
        cache,
    );
    if !options.leading_caret_enabled {
        for block in &mut blocks {
            if let FlowBlock::Paragraph(p) = block {
                p.leading_caret = false;
            }
        }
    }
    cache.commit()?;

    let measures = measure_blocks(&blocks, geometry, measurer, &mut warnings);
    let layout = paginate::paginate(&blocks, &measures, geometry, &mut warnings)?;

    Ok(RenderResult {
        layout,
        warnings: warnings.into_vec(),
    })
}

fn measure_blocks(
    blocks: &[FlowBlock],
    geometry: &PageGeometry,
    measurer: &dyn Measurer,
    warnings: &mut warnings::WarningSink,
) -> Vec<Option<Measure>> {
    let column_width = geometry.column_width_px();
    blocks
        .iter()
        .map(|block| match block {
            FlowBlock::Paragraph(p) => Some(Measure::Paragraph(measurer.measure_paragraph(p, column_width, warnings))),
            FlowBlock::Table(t) => Some(Measure::Table(measurer.measure_table(t, column_width))),
            FlowBlock::Image(i) => {
                let natural = layout_types::PxSize {
                    width: units::emu_to_px(i.geometry.width),
                    height: units::emu_to_px(i.geometry.height),
                };
                Some(Measure::Media(measurer.measure_media(natural, None)))
            }
            FlowBlock::Drawing(d) => {
                let natural = layout_types::PxSize {
                    width: units::emu_to_px(d.geometry.width),
                    height: units::emu_to_px(d.geometry.height),
                };
                Some(Measure::Media(measurer.measure_media(natural, None)))
            }
            FlowBlock::PageBreak(_) => None,
        })
        .collect()
}
