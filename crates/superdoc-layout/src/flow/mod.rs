//! Flow-block conversion (spec §4.E-F): turns the editor's [`crate::document::Node`]
//! tree into the flat, positioned [`blocks::FlowBlock`] sequence the paginator
//! consumes.
//!
//! This module is the dispatcher; each node kind's actual conversion lives in
//! its own submodule (`paragraph`, `table`, `media`, `field_annotation`) the
//! way the spec's module table lines them up. [`convert_blocks`] is the
//! single public entry point — it is also what a table cell's own content
//! recurses through (spec §4.E: "table cells recursively hold block
//! content").

pub mod blocks;
pub mod field_annotation;
pub mod media;
pub mod paragraph;
pub mod position;
pub mod structured;
pub mod table;

use crate::cache::{CacheOutcome, FlowBlockCache};
use crate::document::{Node, NodeKind, SdtMetadata};
use crate::flow::blocks::{fallback_block_id, FlowBlock, PageBreakBlock};
use crate::flow::position::PositionWalker;
use crate::flow::structured::apply_sdt_stack;
use crate::numbering::NumberingManager;
use crate::style::context::StyleContext;
use crate::warnings::{Warning, WarningKind, WarningSite, WarningSink};

/// Convert a sequence of sibling block-level nodes into [`blocks::FlowBlock`]s,
/// in document order (spec §4.E "Per-kind handling").
///
/// This is the entry point both for a document's top level and for a table
/// cell's content (`table::convert_table` calls back into this for each
/// cell).
pub fn convert_blocks(
    nodes: &[Node],
    ctx: &StyleContext,
    numbering: &mut NumberingManager<'_>,
    default_tab_interval_twips: i32,
    warnings: &mut WarningSink,
    pos: &mut PositionWalker,
) -> Vec<FlowBlock> {
    let mut sdt_stack: Vec<SdtMetadata> = Vec::new();
    convert_block_list(
        nodes,
        ctx,
        numbering,
        default_tab_interval_twips,
        warnings,
        pos,
        &mut sdt_stack,
        None,
    )
}

/// Walk `nodes`, threading an SDT nesting stack (spec §4.E "structuredContentBlock
/// / documentPartObject") and, when inside a `tableOfContents` gallery, a TOC
/// field instruction that gets stamped onto every unwrapped paragraph (spec
/// §4.E "tableOfContents ... unwraps into its child paragraphs, each marked
/// `isTocEntry: true`").
#[allow(clippy::too_many_arguments)]
fn convert_block_list(
    nodes: &[Node],
    ctx: &StyleContext,
    numbering: &mut NumberingManager<'_>,
    default_tab_interval_twips: i32,
    warnings: &mut WarningSink,
    pos: &mut PositionWalker,
    sdt_stack: &mut Vec<SdtMetadata>,
    toc_instruction: Option<&str>,
) -> Vec<FlowBlock> {
    let mut out = Vec::new();
    for node in nodes {
        match &node.kind {
            NodeKind::Paragraph(attrs) => {
                let mut attrs = attrs.clone();
                if let Some(instruction) = toc_instruction {
                    attrs.is_toc_entry = true;
                    attrs.toc_instruction = Some(instruction.to_string());
                }
                let (atomics, block) = paragraph::convert_paragraph(
                    &attrs,
                    &node.content,
                    ctx,
                    numbering,
                    default_tab_interval_twips,
                    &[],
                    warnings,
                    pos,
                );
                for mut atomic in atomics {
                    apply_sdt_stack(&mut atomic, sdt_stack);
                    out.push(atomic);
                }
                let mut block = FlowBlock::Paragraph(block);
                apply_sdt_stack(&mut block, sdt_stack);
                out.push(block);
            }
            NodeKind::Table {
                grid,
                table_style_id,
                properties,
            } => {
                let table_block = table::convert_table(
                    grid,
                    table_style_id.as_deref(),
                    properties,
                    &node.content,
                    ctx,
                    numbering,
                    default_tab_interval_twips,
                    warnings,
                    pos,
                );
                let mut block = FlowBlock::Table(table_block);
                apply_sdt_stack(&mut block, sdt_stack);
                out.push(block);
            }
            NodeKind::Image { .. } | NodeKind::Drawing { .. } => {
                if let Some(mut block) = media::convert_top_level_media(node, pos) {
                    apply_sdt_stack(&mut block, sdt_stack);
                    out.push(block);
                }
            }
            NodeKind::PageBreak => {
                let start = pos.atom();
                out.push(FlowBlock::PageBreak(PageBreakBlock {
                    block_id: fallback_block_id("page-break", Some(start)),
                    pm_start: Some(start),
                }));
            }
            NodeKind::StructuredContentBlock { metadata } | NodeKind::DocumentPartObject { metadata } => {
                pos.enter();
                sdt_stack.push(metadata.clone());
                let mut nested = convert_block_list(
                    &node.content,
                    ctx,
                    numbering,
                    default_tab_interval_twips,
                    warnings,
                    pos,
                    sdt_stack,
                    toc_instruction,
                );
                sdt_stack.pop();
                pos.exit();
                out.append(&mut nested);
            }
            NodeKind::DocumentSection { .. } => {
                pos.enter();
                let mut nested = convert_block_list(
                    &node.content,
                    ctx,
                    numbering,
                    default_tab_interval_twips,
                    warnings,
                    pos,
                    sdt_stack,
                    toc_instruction,
                );
                pos.exit();
                out.append(&mut nested);
            }
            NodeKind::TableOfContents { instruction } => {
                pos.enter();
                let mut nested = convert_block_list(
                    &node.content,
                    ctx,
                    numbering,
                    default_tab_interval_twips,
                    warnings,
                    pos,
                    sdt_stack,
                    Some(instruction),
                );
                pos.exit();
                out.append(&mut nested);
            }
            other => {
                warnings.push(Warning::new(
                    WarningKind::InputMalformed {
                        reason: format!("unexpected node kind at block level: {other:?}"),
                    },
                    WarningSite::Document,
                ));
            }
        }
    }
    out
}

/// Cache-aware sibling of [`convert_blocks`] (spec §4.F): consulted by
/// [`crate::render`] at the document's top level. For each top-level
/// paragraph carrying a stable `sdBlockId`, consults `cache` before falling
/// back to a fresh conversion; every other top-level node (tables, nested
/// SDTs/sections/TOCs, atomics) converts exactly as [`convert_blocks`]
/// would. Nested paragraphs (inside table cells or structured-content
/// containers) are not cache keys themselves — they are re-converted as part
/// of their containing top-level node, same as a miss.
///
/// A cache hit still runs the paragraph's numbering encounter (if it
/// references one) so the [`NumberingManager`]'s counters advance exactly as
/// they would on a fresh conversion — only the expensive inline-flattening
/// and layout work is skipped, never the traversal's stateful side effects.
pub fn convert_blocks_cached(
    nodes: &[Node],
    ctx: &StyleContext,
    numbering: &mut NumberingManager<'_>,
    default_tab_interval_twips: i32,
    warnings: &mut WarningSink,
    pos: &mut PositionWalker,
    cache: &mut FlowBlockCache,
) -> Vec<FlowBlock> {
    let mut sdt_stack: Vec<SdtMetadata> = Vec::new();
    let mut out = Vec::new();

    for node in nodes {
        let NodeKind::Paragraph(attrs) = &node.kind else {
            out.append(&mut convert_block_list(
                std::slice::from_ref(node),
                ctx,
                numbering,
                default_tab_interval_twips,
                warnings,
                pos,
                &mut sdt_stack,
                None,
            ));
            continue;
        };
        let Some(block_id) = attrs.sd_block_id.as_ref().map(|id| id.0.clone()) else {
            out.append(&mut convert_block_list(
                std::slice::from_ref(node),
                ctx,
                numbering,
                default_tab_interval_twips,
                warnings,
                pos,
                &mut sdt_stack,
                None,
            ));
            continue;
        };

        let new_pm_start = pos.peek();
        let node_rev = attrs.sd_block_rev.map(|rev| rev.0);
        let node_json = format!("{node:?}");

        match cache.lookup(&block_id, node_rev, &node_json, new_pm_start, warnings) {
            CacheOutcome::Hit(mut blocks) => {
                // The cached blocks already reflect this paragraph's
                // numbering/listRendering; still advance the manager's
                // counters so later paragraphs see correct state.
                if let Some(num_ref) = attrs.numbering {
                    numbering.encounter(num_ref.num_id, num_ref.ilvl, warnings);
                }
                pos.advance(node.pm_size());
                for block in &mut blocks {
                    apply_sdt_stack(block, &sdt_stack);
                }
                cache.insert(block_id, node_rev, node_json, blocks.clone(), new_pm_start);
                out.append(&mut blocks);
            }
            CacheOutcome::Miss => {
                let mut produced = convert_block_list(
                    std::slice::from_ref(node),
                    ctx,
                    numbering,
                    default_tab_interval_twips,
                    warnings,
                    pos,
                    &mut sdt_stack,
                    None,
                );
                cache.insert(block_id, node_rev, node_json, produced.clone(), new_pm_start);
                out.append(&mut produced);
            }
        }
    }

    out
}

/// Structural checks over the raw editor tree, run before conversion (spec
/// §4.K "document tree validation" [ADDED]): these catch shapes that would
/// otherwise surface as confusing downstream warnings (a cell referencing
/// columns past the grid, an empty TOC instruction) and report them against
/// the node that caused them. Never blocks conversion — every finding here is
/// a [`Warning`], not a [`crate::warnings::LayoutError`].
pub fn validate_tree(nodes: &[Node], warnings: &mut WarningSink) {
    for node in nodes {
        match &node.kind {
            NodeKind::Table { grid, .. } => {
                for row in &node.content {
                    let NodeKind::TableRow { .. } = &row.kind else { continue };
                    let total_span: u32 = row
                        .content
                        .iter()
                        .filter_map(|cell| match &cell.kind {
                            NodeKind::TableCell { span, .. } | NodeKind::TableHeader { span, .. } => {
                                Some(span.colspan.max(1))
                            }
                            _ => None,
                        })
                        .sum();
                    if total_span as usize > grid.len() {
                        warnings.push(Warning::new(
                            WarningKind::InputMalformed {
                                reason: format!(
                                    "table row spans {total_span} grid columns but the table grid only defines {}",
                                    grid.len()
                                ),
                            },
                            WarningSite::Document,
                        ));
                    }
                    validate_tree(&row.content, warnings);
                }
            }
            NodeKind::TableOfContents { instruction } => {
                if instruction.trim().is_empty() {
                    warnings.push(Warning::new(
                        WarningKind::InputMalformed {
                            reason: "tableOfContents node has an empty field instruction".to_string(),
                        },
                        WarningSite::Document,
                    ));
                }
                validate_tree(&node.content, warnings);
            }
            _ => validate_tree(&node.content, warnings),
        }
    }
}
