//! Field annotation conversion (spec §4.E "fieldAnnotation").
//!
//! A field annotation is an atom inline; it never has a node dispatch
//! choice the way paragraphs or tables do, so this module is just the
//! node-attrs -> [`FlowFieldAnnotation`] projection plus the position bump.

use crate::document::FieldAnnotationAttrs;
use crate::flow::blocks::FlowFieldAnnotation;
use crate::flow::position::PositionWalker;

/// Convert a `fieldAnnotation` node's attrs into a [`FlowFieldAnnotation`],
/// consuming one PM position for the atom.
pub fn convert_field_annotation(
    attrs: &FieldAnnotationAttrs,
    pos: &mut PositionWalker,
) -> FlowFieldAnnotation {
    let start = pos.atom();
    FlowFieldAnnotation {
        attrs: attrs.clone(),
        pm_start: Some(start),
        pm_end: Some(start + 1),
    }
}
