//! Structured-content passthrough metadata (spec §4.E "structuredContentBlock
//! / documentSection / documentPartObject"): attach a container's own
//! [`SdtMetadata`] to whatever blocks it contains, inner under `sdt`, outer
//! (when nested two deep) under `containerSdt`.

use crate::document::SdtMetadata;
use crate::flow::blocks::FlowBlock;

/// Apply the current SDT nesting stack to a freshly converted block,
/// overriding whatever the block's own `sdt`/`container_sdt` carried in from
/// editor attrs. Only paragraphs, tables, and images carry these fields
/// (spec §4.E names exactly those three); other block kinds are untouched.
pub fn apply_sdt_stack(block: &mut FlowBlock, stack: &[SdtMetadata]) {
    if stack.is_empty() {
        return;
    }
    let (inner, outer) = match stack.len() {
        1 => (Some(stack[0].clone()), None),
        n => (Some(stack[n - 1].clone()), Some(stack[n - 2].clone())),
    };
    match block {
        FlowBlock::Paragraph(p) => {
            p.sdt = inner;
            p.container_sdt = outer;
        }
        FlowBlock::Table(t) => {
            t.sdt = inner;
            t.container_sdt = outer;
        }
        FlowBlock::Image(i) => {
            i.sdt = inner;
            i.container_sdt = outer;
        }
        FlowBlock::Drawing(_) | FlowBlock::PageBreak(_) => {}
    }
}
