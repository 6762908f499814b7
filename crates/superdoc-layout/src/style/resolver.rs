//! Style resolution (spec §4.B): build and fold the property chain for a
//! paragraph or run.
//!
//! Chain order (low to high priority):
//!
//! ```text
//! docDefaults -> base style (basedOn, root-first) -> current style
//!             -> linked character style (runs only, when applicable)
//!             -> table-style conditional regions (wholeTable, then band, then corner)
//!             -> direct formatting
//! ```
//!
//! Every step just appends a layer to a `Vec` and folds it with
//! [`crate::style::cascade::combine_properties`] — there is no
//! run-vs-paragraph special-casing beyond which layers are collected, per
//! spec §4.B ("achieved purely by chain ordering plus the cascade rules
//! above, no special-case code").

use std::collections::HashSet;

use crate::style::cascade::combine_properties;
use crate::style::context::{
    ParagraphProperties, RunProperties, StyleContext, StyleDefinition, TableConditionalFormatting,
    TableRegion,
};
use crate::warnings::{Warning, WarningKind, WarningSite, WarningSink};

/// Walk a style's `basedOn` chain, root-first, stopping at a cycle or a
/// missing style id. Detected problems are recorded as degraded-resolution
/// warnings (spec §4.B, §7) rather than returned as an error; resolution
/// continues with whatever prefix of the chain was found.
pub(crate) fn ancestor_chain<'a>(
    styles: &'a std::collections::BTreeMap<String, StyleDefinition>,
    style_id: &str,
    warnings: &mut WarningSink,
) -> Vec<&'a StyleDefinition> {
    let mut visited: HashSet<&str> = HashSet::new();
    visited.insert(style_id);
    let mut ancestors = Vec::new();

    let mut cursor = styles.get(style_id).and_then(|s| s.based_on.as_deref());
    while let Some(parent_id) = cursor {
        if visited.contains(parent_id) {
            warnings.push(Warning::new(
                WarningKind::StyleResolutionDegraded {
                    reason: format!("cyclic basedOn chain revisits '{parent_id}'"),
                },
                WarningSite::Style(style_id.to_string()),
            ));
            break;
        }
        visited.insert(parent_id);
        match styles.get(parent_id) {
            Some(parent) => {
                ancestors.push(parent);
                cursor = parent.based_on.as_deref();
            }
            None => {
                warnings.push(Warning::new(
                    WarningKind::StyleResolutionDegraded {
                        reason: format!("basedOn references missing style '{parent_id}'"),
                    },
                    WarningSite::Style(style_id.to_string()),
                ));
                break;
            }
        }
    }
    ancestors.reverse();
    ancestors
}

/// Resolve a paragraph's properties.
///
/// `table_conditionals`, when the paragraph lives inside a table cell,
/// should already be ordered `wholeTable -> band -> corner` by the caller
/// (`crate::flow::table`); this function does not reorder them.
pub fn resolve_paragraph_properties(
    ctx: &StyleContext,
    style_id: Option<&str>,
    table_conditionals: &[TableConditionalFormatting],
    direct: &ParagraphProperties,
    warnings: &mut WarningSink,
) -> ParagraphProperties {
    let mut chain = vec![ctx.doc_defaults.paragraph.clone()];

    if let Some(id) = style_id {
        match ctx.styles.get(id) {
            Some(style) => {
                for ancestor in ancestor_chain(&ctx.styles, id, warnings) {
                    chain.push(ancestor.paragraph_properties.clone());
                }
                chain.push(style.paragraph_properties.clone());
            }
            None => warnings.push(Warning::new(
                WarningKind::StyleResolutionDegraded {
                    reason: format!("paragraph style '{id}' not found"),
                },
                WarningSite::Style(id.to_string()),
            )),
        }
    }

    for region in table_conditionals {
        chain.push(region.paragraph_properties.clone());
    }
    chain.push(direct.clone());

    combine_properties(&chain)
}

/// Resolve a run's properties.
///
/// `linked_character_style_id` is the paragraph style's `linked` character
/// style id (spec §4.B: "linked character style (if run style references
/// it)"), used only when the run itself has no explicit `run_style_id`.
/// When the run does specify its own style, inline formatting still always
/// wins for every key (spec S3 / invariant 2) purely because `direct` is
/// folded last.
pub fn resolve_run_properties(
    ctx: &StyleContext,
    run_style_id: Option<&str>,
    linked_character_style_id: Option<&str>,
    table_conditionals: &[TableConditionalFormatting],
    direct: &RunProperties,
    warnings: &mut WarningSink,
) -> RunProperties {
    let mut chain = vec![ctx.doc_defaults.run.clone()];

    let effective_style_id = run_style_id.or(linked_character_style_id);
    if let Some(id) = effective_style_id {
        match ctx.styles.get(id) {
            Some(style) => {
                for ancestor in ancestor_chain(&ctx.styles, id, warnings) {
                    chain.push(ancestor.run_properties.clone());
                }
                chain.push(style.run_properties.clone());
            }
            None => warnings.push(Warning::new(
                WarningKind::StyleResolutionDegraded {
                    reason: format!("character style '{id}' not found"),
                },
                WarningSite::Style(id.to_string()),
            )),
        }
    }

    for region in table_conditionals {
        chain.push(region.run_properties.clone());
    }
    chain.push(direct.clone());

    combine_properties(&chain)
}

/// Build the ordered conditional-region chain for a cell, given which
/// regions apply to it (spec §3, §9 open question: only the common case —
/// first-row/first-column corner precedence — is pinned; see `DESIGN.md`).
///
/// `regions` must already be in the priority order the caller wants
/// (lowest first); this just looks each one up and skips regions the style
/// doesn't define a conditional block for.
pub fn table_conditional_chain<'a>(
    style: &'a StyleDefinition,
    regions: &[TableRegion],
) -> Vec<TableConditionalFormatting> {
    regions
        .iter()
        .filter_map(|region| style.conditional.get(region).cloned())
        .collect()
}

/// Resolve a table's own properties: table style's `basedOn` chain, root
/// first, then direct formatting. Table styles carry no document-default
/// layer (spec §6.2 types this under `ooxml/types`'s table style, not
/// `docDefaults`).
pub fn resolve_table_properties(
    ctx: &StyleContext,
    table_style_id: Option<&str>,
    direct: &crate::style::context::TableProperties,
    warnings: &mut WarningSink,
) -> crate::style::context::TableProperties {
    let mut chain = Vec::new();
    if let Some(id) = table_style_id {
        match ctx.styles.get(id) {
            Some(style) => {
                for ancestor in ancestor_chain(&ctx.styles, id, warnings) {
                    chain.push(ancestor.table_properties.clone());
                }
                chain.push(style.table_properties.clone());
            }
            None => warnings.push(Warning::new(
                WarningKind::StyleResolutionDegraded {
                    reason: format!("table style '{id}' not found"),
                },
                WarningSite::Style(id.to_string()),
            )),
        }
    }
    chain.push(direct.clone());
    combine_properties(&chain)
}

/// Resolve a table row's properties.
pub fn resolve_table_row_properties(
    ctx: &StyleContext,
    table_style_id: Option<&str>,
    direct: &crate::style::context::TableRowProperties,
    warnings: &mut WarningSink,
) -> crate::style::context::TableRowProperties {
    let mut chain = Vec::new();
    if let Some(id) = table_style_id {
        if let Some(style) = ctx.styles.get(id) {
            for ancestor in ancestor_chain(&ctx.styles, id, warnings) {
                chain.push(ancestor.table_row_properties.clone());
            }
            chain.push(style.table_row_properties.clone());
        }
    }
    chain.push(direct.clone());
    combine_properties(&chain)
}

/// Resolve a table cell's properties, folding in whichever conditional
/// regions (§3, §9 open question) apply to it.
pub fn resolve_table_cell_properties(
    ctx: &StyleContext,
    table_style_id: Option<&str>,
    table_conditionals: &[TableConditionalFormatting],
    direct: &crate::style::context::TableCellProperties,
    warnings: &mut WarningSink,
) -> crate::style::context::TableCellProperties {
    let mut chain = Vec::new();
    if let Some(id) = table_style_id {
        if let Some(style) = ctx.styles.get(id) {
            for ancestor in ancestor_chain(&ctx.styles, id, warnings) {
                chain.push(ancestor.table_cell_properties.clone());
            }
            chain.push(style.table_cell_properties.clone());
        }
    }
    for region in table_conditionals {
        chain.push(region.table_cell_properties.clone());
    }
    chain.push(direct.clone());
    combine_properties(&chain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::context::*;
    use std::collections::BTreeMap;

    fn style(id: &str, based_on: Option<&str>) -> StyleDefinition {
        StyleDefinition {
            id: id.to_string(),
            style_type: StyleType::Paragraph,
            based_on: based_on.map(str::to_string),
            linked: None,
            run_properties: RunProperties::default(),
            paragraph_properties: ParagraphProperties::default(),
            table_properties: TableProperties::default(),
            table_row_properties: TableRowProperties::default(),
            table_cell_properties: TableCellProperties::default(),
            conditional: BTreeMap::new(),
        }
    }

    #[test]
    fn cyclic_based_on_is_broken_and_degrades_not_panics() {
        let mut styles = BTreeMap::new();
        styles.insert("A".to_string(), style("A", Some("B")));
        styles.insert("B".to_string(), style("B", Some("A")));
        let ctx = StyleContext {
            styles,
            ..Default::default()
        };
        let mut warnings = WarningSink::new();
        let _ = resolve_paragraph_properties(
            &ctx,
            Some("A"),
            &[],
            &ParagraphProperties::default(),
            &mut warnings,
        );
        assert!(!warnings.is_empty());
    }

    #[test]
    fn inline_run_property_beats_character_style_for_every_key() {
        let mut char_style = style("Hyperlink", None);
        char_style.style_type = StyleType::Character;
        char_style.run_properties.font_size_half_pt = Some(36); // 18pt
        let mut styles = BTreeMap::new();
        styles.insert("Hyperlink".to_string(), char_style);
        let ctx = StyleContext {
            styles,
            ..Default::default()
        };
        let direct = RunProperties {
            font_size_half_pt: Some(48), // 24pt
            bold: Some(true),
            ..Default::default()
        };
        let mut warnings = WarningSink::new();
        let resolved =
            resolve_run_properties(&ctx, Some("Hyperlink"), None, &[], &direct, &mut warnings);
        assert_eq!(resolved.font_size_half_pt, Some(48));
        assert_eq!(resolved.bold, Some(true));
    }
}
