//! Paragraph conversion (spec §4.E "paragraph" handler).

use crate::document::{Marks, Node, NodeKind, ParagraphAttrs};
use crate::flow::blocks::{fallback_block_id, FlowBlock, FlowRun, InlineItem, ListRendering, PageBreakBlock, ParagraphBlock};
use crate::flow::field_annotation::convert_field_annotation;
use crate::flow::position::PositionWalker;
use crate::numbering::NumberingManager;
use crate::style::context::{FontFamily, RunProperties, StyleContext};
use crate::style::resolver::resolve_run_properties;
use crate::warnings::WarningSink;
use crate::wordlayout::{compute_word_layout, MarkerInput};

/// Project a text node's inline [`Marks`] onto a [`RunProperties`] bag, so it
/// can be folded as the highest-priority layer in the run cascade (spec §4.B:
/// direct formatting always wins; a mark set *is* the paragraph's most direct
/// formatting).
fn marks_to_run_properties(marks: &Marks) -> RunProperties {
    RunProperties {
        font_family: marks.font_family.clone().map(|explicit| FontFamily {
            theme: None,
            explicit: Some(explicit),
        }),
        font_size_half_pt: marks.font_size_half_pt,
        bold: if marks.bold { Some(true) } else { None },
        italic: if marks.italic { Some(true) } else { None },
        underline: marks.underline.clone(),
        strike: if marks.strike { Some(true) } else { None },
        color: marks.text_color.clone(),
        highlight: marks.highlight_color.clone(),
        style_id: marks.style_id.clone(),
    }
}

/// Flatten a paragraph's inline children into [`InlineItem`]s, merging
/// adjacent runs that resolve to an identical property set (spec §4.E
/// "flatten its inline content into runs (merging adjacent runs with
/// identical mark sets)").
#[allow(clippy::too_many_arguments)]
fn flatten_inline(
    nodes: &[Node],
    ctx: &StyleContext,
    run_style_id: Option<&str>,
    linked_character_style_id: Option<&str>,
    warnings: &mut WarningSink,
    pos: &mut PositionWalker,
    out: &mut Vec<InlineItem>,
    atomic_out: &mut Vec<FlowBlock>,
) {
    for node in nodes {
        match &node.kind {
            NodeKind::Run { properties } => {
                pos.enter();
                let direct_style = run_style_id.or(properties.as_ref().and_then(|p| p.style_id.as_deref()));
                flatten_inline(
                    &node.content,
                    ctx,
                    direct_style,
                    linked_character_style_id,
                    warnings,
                    pos,
                    out,
                    atomic_out,
                );
                pos.exit();
            }
            NodeKind::PageReference { .. } => {
                // Treated as a run wrapper for property inheritance (spec
                // §4.E): recurse without changing the effective run style.
                pos.enter();
                flatten_inline(
                    &node.content,
                    ctx,
                    run_style_id,
                    linked_character_style_id,
                    warnings,
                    pos,
                    out,
                    atomic_out,
                );
                pos.exit();
            }
            NodeKind::Text { text, marks } => {
                let (start, end) = pos.text(text.chars().count());
                let direct = marks_to_run_properties(marks);
                let style_id = direct.style_id.as_deref().or(run_style_id);
                let resolved = resolve_run_properties(
                    ctx,
                    style_id,
                    linked_character_style_id,
                    &[],
                    &direct,
                    warnings,
                );
                match out.last_mut() {
                    Some(InlineItem::Run(last))
                        if last.properties == resolved && last.pm_end == Some(start) =>
                    {
                        last.text.push_str(text);
                        last.pm_end = Some(end);
                    }
                    _ => out.push(InlineItem::Run(FlowRun {
                        text: text.clone(),
                        properties: resolved,
                        pm_start: Some(start),
                        pm_end: Some(end),
                    })),
                }
            }
            NodeKind::FieldAnnotation(attrs) => {
                out.push(InlineItem::FieldAnnotation(convert_field_annotation(attrs, pos)));
            }
            NodeKind::LineBreak => {
                pos.atom();
                out.push(InlineItem::LineBreak);
            }
            NodeKind::Image { .. } | NodeKind::Drawing { .. } => {
                // Anchored media becomes its own pre-paragraph atomic block
                // (spec §4.E); an inline (`anchor.is_none()`) occurrence
                // stays in the run stream.
                crate::flow::media::flatten_inline_media(node, pos, out, atomic_out);
            }
            NodeKind::PageBreak => {
                // An inline page break still surfaces as a standalone
                // pre-paragraph atomic block (spec §4.E).
                let start = pos.atom();
                atomic_out.push(FlowBlock::PageBreak(PageBreakBlock {
                    block_id: fallback_block_id("page-break", Some(start)),
                    pm_start: Some(start),
                }));
            }
            _ => {
                // Any other node kind found inside inline content is not
                // part of the accepted content set (spec §6.1); skip it.
                pos.enter();
                pos.exit();
            }
        }
    }
}

/// Whether this paragraph's first meaningful inline item is a field
/// annotation (spec §4.E "Leading-caret policy"), looking through a single
/// wrapping inline container if present.
fn starts_with_field_annotation(content: &[InlineItem]) -> bool {
    matches!(content.first(), Some(InlineItem::FieldAnnotation(_)))
}

/// Convert a `paragraph` node into a [`ParagraphBlock`].
#[allow(clippy::too_many_arguments)]
pub fn convert_paragraph(
    attrs: &ParagraphAttrs,
    children: &[Node],
    ctx: &StyleContext,
    numbering: &mut NumberingManager<'_>,
    default_tab_interval_twips: i32,
    table_conditionals: &[crate::style::context::TableConditionalFormatting],
    warnings: &mut WarningSink,
    pos: &mut PositionWalker,
) -> (Vec<FlowBlock>, ParagraphBlock) {
    let pm_start = pos.enter();

    let resolved_properties = crate::style::resolver::resolve_paragraph_properties(
        ctx,
        attrs.style_id.as_deref(),
        table_conditionals,
        &attrs.direct_properties,
        warnings,
    );

    let linked_character_style_id = attrs
        .style_id
        .as_deref()
        .and_then(|id| ctx.styles.get(id))
        .and_then(|s| s.linked.as_deref());

    let mut content = Vec::new();
    let mut atomic_out = Vec::new();
    flatten_inline(
        children,
        ctx,
        None,
        linked_character_style_id,
        warnings,
        pos,
        &mut content,
        &mut atomic_out,
    );

    let list_rendering = attrs.numbering.and_then(|num_ref| {
        let result = numbering.encounter(num_ref.num_id, num_ref.ilvl, warnings)?;
        let (level, _) = ctx.numbering.effective_level(num_ref.num_id, num_ref.ilvl)?;
        let marker = MarkerInput {
            text: result.marker_text.clone(),
            justification: level.justification,
            suffix: level.suffix,
            text_width_px: None,
        };
        let word_layout = compute_word_layout(
            &resolved_properties.indent.unwrap_or_default(),
            &resolved_properties.tabs,
            default_tab_interval_twips,
            Some(marker),
        );
        Some(ListRendering {
            path: result.path,
            marker_text: result.marker_text,
            word_layout,
        })
    });

    let word_layout = match &list_rendering {
        Some(lr) => lr.word_layout,
        None => compute_word_layout(
            &resolved_properties.indent.unwrap_or_default(),
            &resolved_properties.tabs,
            default_tab_interval_twips,
            None,
        ),
    };

    let leading_caret = starts_with_field_annotation(&content);

    pos.exit();

    let block_id = attrs
        .sd_block_id
        .as_ref()
        .map(|id| id.0.clone())
        .unwrap_or_else(|| fallback_block_id("paragraph", Some(pm_start)));

    let block = ParagraphBlock {
        block_id,
        pm_start: Some(pm_start),
        properties: resolved_properties,
        word_layout,
        list_rendering,
        content,
        leading_caret,
        is_toc_entry: attrs.is_toc_entry,
        toc_instruction: attrs.toc_instruction.clone(),
        sdt: attrs.sdt.clone(),
        container_sdt: attrs.container_sdt.clone(),
    };
    (atomic_out, block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::NumberingRef;
    use crate::style::context::NumberingTables;

    fn doc_with_two_runs() -> Vec<Node> {
        vec![
            Node::with_content(
                NodeKind::Run { properties: None },
                vec![Node::leaf(NodeKind::Text {
                    text: "hello ".to_string(),
                    marks: Marks::default(),
                })],
            ),
            Node::with_content(
                NodeKind::Run { properties: None },
                vec![Node::leaf(NodeKind::Text {
                    text: "world".to_string(),
                    marks: Marks::default(),
                })],
            ),
        ]
    }

    #[test]
    fn adjacent_runs_with_identical_marks_are_merged() {
        let ctx = StyleContext::default();
        let tables = NumberingTables::default();
        let mut numbering = NumberingManager::new(&tables);
        numbering.begin();
        let mut warnings = WarningSink::new();
        let mut pos = PositionWalker::new();
        let attrs = ParagraphAttrs::default();
        let (_atomics, block) = convert_paragraph(
            &attrs,
            &doc_with_two_runs(),
            &ctx,
            &mut numbering,
            720,
            &[],
            &mut warnings,
            &mut pos,
        );
        assert_eq!(block.content.len(), 1);
        match &block.content[0] {
            InlineItem::Run(r) => assert_eq!(r.text, "hello world"),
            other => panic!("expected a single merged run, got {other:?}"),
        }
    }

    #[test]
    fn paragraph_with_leading_field_annotation_sets_leading_caret() {
        use crate::document::{FieldAnnotationAttrs, FieldAnnotationKind};
        let ctx = StyleContext::default();
        let tables = NumberingTables::default();
        let mut numbering = NumberingManager::new(&tables);
        numbering.begin();
        let mut warnings = WarningSink::new();
        let mut pos = PositionWalker::new();
        let attrs = ParagraphAttrs::default();
        let children = vec![Node::leaf(NodeKind::FieldAnnotation(FieldAnnotationAttrs {
            kind: FieldAnnotationKind::Text,
            field_id: "f1".to_string(),
            display_label: None,
            field_color: None,
            highlighted: true,
            marks: Marks::default(),
            size: None,
            raw_html: None,
            link_url: None,
            image_src: None,
            hidden: false,
            is_locked: false,
        }))];
        let (_atomics, block) = convert_paragraph(
            &attrs, &children, &ctx, &mut numbering, 720, &[], &mut warnings, &mut pos,
        );
        assert!(block.leading_caret);
    }

    #[test]
    fn numbered_paragraph_produces_list_rendering_with_path() {
        use crate::style::context::{AbstractNumDef, ConcreteNumDef, Justification, LevelDef, NumFormat, Suffix};
        use std::collections::BTreeMap;

        let mut levels = BTreeMap::new();
        levels.insert(
            0,
            LevelDef {
                start: 1,
                num_fmt: NumFormat::Decimal,
                lvl_text: "%1.".to_string(),
                justification: Justification::Left,
                suffix: Suffix::Tab,
            },
        );
        let mut abstract_defs = BTreeMap::new();
        abstract_defs.insert(1, AbstractNumDef { levels });
        let mut concrete_defs = BTreeMap::new();
        concrete_defs.insert(
            1,
            ConcreteNumDef {
                abstract_num_id: 1,
                lvl_overrides: BTreeMap::new(),
            },
        );
        let tables = NumberingTables {
            abstract_defs,
            concrete_defs,
        };
        let ctx = StyleContext {
            numbering: tables.clone(),
            ..Default::default()
        };
        let mut numbering = NumberingManager::new(&tables);
        numbering.begin();
        let mut warnings = WarningSink::new();
        let mut pos = PositionWalker::new();
        let mut attrs = ParagraphAttrs::default();
        attrs.numbering = Some(NumberingRef { num_id: 1, ilvl: 0 });
        let (_atomics, block) = convert_paragraph(&attrs, &[], &ctx, &mut numbering, 720, &[], &mut warnings, &mut pos);
        let lr = block.list_rendering.expect("expected list rendering");
        assert_eq!(lr.path, vec![1]);
        assert_eq!(lr.marker_text, "1.");
    }
}
