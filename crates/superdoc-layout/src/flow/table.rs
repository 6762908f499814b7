//! Table conversion (spec §4.E "table / tableRow / tableCell / tableHeader").

use crate::document::{CellSpan, Node, NodeKind};
use crate::flow::blocks::{fallback_block_id, FlowTableCell, FlowTableRow, TableBlock};
use crate::flow::position::PositionWalker;
use crate::numbering::NumberingManager;
use crate::style::context::{StyleContext, TableProperties, TableRegion};
use crate::style::resolver::{
    resolve_table_cell_properties, resolve_table_properties, resolve_table_row_properties,
    table_conditional_chain,
};
use crate::warnings::WarningSink;

/// Which conditional regions apply to a cell at `(row_idx, col_idx)` in a
/// `num_rows x num_cols` grid, lowest-priority first (spec §9 open question:
/// only the common corner-precedence case is pinned — see `DESIGN.md`).
fn regions_for_cell(row_idx: usize, col_idx: usize, num_rows: usize, num_cols: usize) -> Vec<TableRegion> {
    let mut regions = vec![TableRegion::WholeTable];
    regions.push(if col_idx % 2 == 0 {
        TableRegion::Band1Vertical
    } else {
        TableRegion::Band2Vertical
    });
    regions.push(if row_idx % 2 == 0 {
        TableRegion::Band1Horizontal
    } else {
        TableRegion::Band2Horizontal
    });

    let first_col = col_idx == 0;
    let last_col = num_cols > 0 && col_idx + 1 == num_cols;
    let first_row = row_idx == 0;
    let last_row = num_rows > 0 && row_idx + 1 == num_rows;

    if first_col {
        regions.push(TableRegion::FirstCol);
    }
    if last_col {
        regions.push(TableRegion::LastCol);
    }
    if first_row {
        regions.push(TableRegion::FirstRow);
    }
    if last_row {
        regions.push(TableRegion::LastRow);
    }
    // Corner cells take precedence over plain row/column bands.
    if first_row && first_col {
        regions.push(TableRegion::NwCell);
    }
    if first_row && last_col {
        regions.push(TableRegion::NeCell);
    }
    if last_row && first_col {
        regions.push(TableRegion::SwCell);
    }
    if last_row && last_col {
        regions.push(TableRegion::SeCell);
    }
    regions
}

fn cell_span_and_properties(kind: &NodeKind) -> Option<(&CellSpan, &crate::style::context::TableCellProperties, bool)> {
    match kind {
        NodeKind::TableCell { span, properties } => Some((span, properties, false)),
        NodeKind::TableHeader { span, properties } => Some((span, properties, true)),
        _ => None,
    }
}

/// Convert a `table` node into a [`TableBlock`].
#[allow(clippy::too_many_arguments)]
pub fn convert_table(
    grid: &[i32],
    table_style_id: Option<&str>,
    direct_properties: &TableProperties,
    row_nodes: &[Node],
    ctx: &StyleContext,
    numbering: &mut NumberingManager<'_>,
    default_tab_interval_twips: i32,
    warnings: &mut WarningSink,
    pos: &mut PositionWalker,
) -> TableBlock {
    let pm_start = pos.enter();
    let properties = resolve_table_properties(ctx, table_style_id, direct_properties, warnings);

    let num_rows = row_nodes.iter().filter(|n| matches!(n.kind, NodeKind::TableRow { .. })).count();
    let num_cols = grid.len();

    let mut rows = Vec::new();
    let mut row_idx = 0;
    for row_node in row_nodes {
        let NodeKind::TableRow { properties: row_direct } = &row_node.kind else {
            continue;
        };
        pos.enter();
        let row_properties = resolve_table_row_properties(ctx, table_style_id, row_direct, warnings);

        let mut cells = Vec::new();
        let mut col_idx = 0;
        for cell_node in &row_node.content {
            let Some((span, cell_direct, is_header)) = cell_span_and_properties(&cell_node.kind) else {
                continue;
            };
            pos.enter();
            let regions = regions_for_cell(row_idx, col_idx, num_rows, num_cols);
            let conditionals = table_style_id
                .and_then(|id| ctx.styles.get(id))
                .map(|style| table_conditional_chain(style, &regions))
                .unwrap_or_default();
            let cell_properties =
                resolve_table_cell_properties(ctx, table_style_id, &conditionals, cell_direct, warnings);
            let content = crate::flow::convert_blocks(
                &cell_node.content,
                ctx,
                numbering,
                default_tab_interval_twips,
                warnings,
                pos,
            );
            pos.exit();
            cells.push(FlowTableCell {
                span: *span,
                properties: cell_properties,
                is_header,
                content,
            });
            col_idx += usize::try_from(span.colspan.max(1)).unwrap_or(1);
        }
        pos.exit();
        rows.push(FlowTableRow {
            properties: row_properties,
            cells,
        });
        row_idx += 1;
    }
    pos.exit();

    TableBlock {
        block_id: fallback_block_id("table", Some(pm_start)),
        pm_start: Some(pm_start),
        grid: grid.to_vec(),
        table_style_id: table_style_id.map(str::to_string),
        properties,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corner_regions_take_precedence_order_for_top_left_cell() {
        let regions = regions_for_cell(0, 0, 2, 2);
        assert_eq!(regions.last(), Some(&TableRegion::NwCell));
        assert!(regions.contains(&TableRegion::WholeTable));
        assert!(regions.contains(&TableRegion::FirstRow));
        assert!(regions.contains(&TableRegion::FirstCol));
    }

    #[test]
    fn single_row_single_col_table_is_all_corners() {
        let regions = regions_for_cell(0, 0, 1, 1);
        assert!(regions.contains(&TableRegion::NwCell));
        assert!(!regions.contains(&TableRegion::NeCell));
    }

    #[test]
    fn converts_a_simple_two_by_one_table() {
        use crate::document::{Marks, ParagraphAttrs};
        use crate::style::context::{NumberingTables, TableCellProperties, TableRowProperties};

        let ctx = StyleContext::default();
        let tables = NumberingTables::default();
        let mut numbering = NumberingManager::new(&tables);
        numbering.begin();
        let mut warnings = WarningSink::new();
        let mut pos = PositionWalker::new();

        let para = Node::with_content(
            NodeKind::Paragraph(ParagraphAttrs::default()),
            vec![Node::with_content(
                NodeKind::Run { properties: None },
                vec![Node::leaf(NodeKind::Text {
                    text: "cell".to_string(),
                    marks: Marks::default(),
                })],
            )],
        );
        let cell = Node::with_content(
            NodeKind::TableCell {
                span: CellSpan {
                    colspan: 1,
                    rowspan: 1,
                    v_merge_continue: false,
                },
                properties: TableCellProperties::default(),
            },
            vec![para],
        );
        let row = Node::with_content(
            NodeKind::TableRow {
                properties: TableRowProperties::default(),
            },
            vec![cell],
        );

        let block = convert_table(
            &[2000, 2000],
            None,
            &TableProperties::default(),
            &[row],
            &ctx,
            &mut numbering,
            720,
            &mut warnings,
            &mut pos,
        );
        assert_eq!(block.rows.len(), 1);
        assert_eq!(block.rows[0].cells.len(), 1);
        assert_eq!(block.rows[0].cells[0].content.len(), 1);
    }
}
