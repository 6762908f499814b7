//! The editor document tree (spec §3, "EditorDocument").
//!
//! This is the input side of the pipeline: a tree of typed nodes owned by
//! the editor. The converter (`crate::flow`) only ever reads it. Node types
//! are a closed enumeration rather than an open `type: String` — per spec
//! §9's "Node.create extension fluency" redesign flag — so that the
//! converter's dispatch table (§4.E) is exhaustive and new node kinds are a
//! compile error at every call site, not a silent no-op.

use std::collections::BTreeMap;

/// A free-form scalar/object value for passthrough attribute keys that the
/// core does not model as a first-class field.
///
/// Most attributes recognized by the core (§6.1) are typed fields on the
/// per-variant attribute bundles below; this exists only for metadata the
/// core carries through without interpreting (e.g. unrecognized SDT
/// properties, host-specific extension data).
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// UTF-8 text.
    String(String),
    /// A signed integer (OOXML lengths, indices).
    Number(i64),
    /// A floating point value.
    Float(f64),
    /// A boolean flag.
    Bool(bool),
    /// Opaque bytes (e.g. an embedded binary blob reference).
    Bytes(Vec<u8>),
    /// A nested bundle of further attributes.
    Bundle(BTreeMap<String, AttrValue>),
}

/// A deterministic, order-independent attribute map for passthrough keys.
pub type AttrMap = BTreeMap<String, AttrValue>;

/// A stable paragraph identifier assigned by the editor (spec §3, `sdBlockId`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SdBlockId(pub String);

/// A monotonic per-paragraph revision counter (spec §3, `sdBlockRev`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SdBlockRev(pub u64);

/// Inline formatting marks carried on a run or text node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Marks {
    /// Bold.
    pub bold: bool,
    /// Italic.
    pub italic: bool,
    /// Underline style name, if any (`"single"`, `"double"`, …).
    pub underline: Option<String>,
    /// Strikethrough.
    pub strike: bool,
    /// Six-hex-digit RGB, or `"auto"` (spec §6.5).
    pub text_color: Option<String>,
    /// Six-hex-digit RGB highlight color.
    pub highlight_color: Option<String>,
    /// Character style id this run references, if any.
    pub style_id: Option<String>,
    /// Explicit font family, overriding any inherited one.
    pub font_family: Option<String>,
    /// Explicit font size in half-points, overriding any inherited one.
    pub font_size_half_pt: Option<i32>,
}

/// A maximal contiguous span of inline content sharing a single mark set
/// plus the editor-tree position it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    /// The run's literal text.
    pub text: String,
    /// Formatting marks applied to this run.
    pub marks: Marks,
    /// Inclusive PM-position start, if the editor tracks positions.
    pub pm_start: Option<usize>,
    /// Exclusive PM-position end, if the editor tracks positions.
    pub pm_end: Option<usize>,
}

/// Geometry in EMU (English Metric Units), the OOXML drawing coordinate unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    /// Width in EMUs.
    pub width: i64,
    /// Height in EMUs.
    pub height: i64,
}

/// OOXML `effectExtent`: asymmetric margins reserved around a shape for
/// shadows/glows, in EMUs.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EffectExtent {
    /// Left margin.
    pub left: i64,
    /// Top margin.
    pub top: i64,
    /// Right margin.
    pub right: i64,
    /// Bottom margin.
    pub bottom: i64,
}

/// The kind of drawing object a `drawing` node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawingKind {
    /// A raster/vector picture.
    Picture,
    /// A vector shape (line, rectangle, etc.).
    VectorShape,
    /// A text box.
    Textbox,
    /// A group of nested drawings.
    Group,
}

/// One of the six field-annotation variants (spec §4.E).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldAnnotationKind {
    /// Plain text field.
    Text,
    /// Image field.
    Image,
    /// Signature field.
    Signature,
    /// Checkbox field.
    Checkbox,
    /// Raw HTML field.
    Html,
    /// Hyperlink field.
    Link,
}

/// A field annotation's attributes (spec §6.1).
#[derive(Debug, Clone, PartialEq)]
pub struct FieldAnnotationAttrs {
    /// Variant discriminator.
    pub kind: FieldAnnotationKind,
    /// The field's stable identifier.
    pub field_id: String,
    /// Human-facing label shown in place of the field's live value.
    pub display_label: Option<String>,
    /// Accent color for the field chip.
    pub field_color: Option<String>,
    /// Whether the field renders with a highlight background.
    ///
    /// Canonicalized at ingestion per spec §9's open question: absent means
    /// `true`; the literal string `"false"` means `false`. Call
    /// [`FieldAnnotationAttrs::canonicalize_highlighted`] to apply this rule
    /// when constructing from a loosely-typed source.
    pub highlighted: bool,
    /// Inline formatting marks to apply to the field's rendered text.
    pub marks: Marks,
    /// Pixel size hint (images/signatures).
    pub size: Option<(f64, f64)>,
    /// Raw HTML payload (`html` kind only).
    pub raw_html: Option<String>,
    /// Link target (`link` kind only).
    pub link_url: Option<String>,
    /// Image source reference (`image` kind only).
    pub image_src: Option<String>,
    /// Whether the field is hidden from the rendered page.
    pub hidden: bool,
    /// Whether the field is locked against editing.
    pub is_locked: bool,
}

impl FieldAnnotationAttrs {
    /// Canonicalize a possibly-string `highlighted` attribute per spec §9:
    /// absent => `true`, the literal string `"false"` => `false`, anything
    /// else truthy => `true`.
    pub fn canonicalize_highlighted(raw: Option<&str>) -> bool {
        match raw {
            None => true,
            Some(s) => s != "false",
        }
    }
}

/// Structured document tag (SDT) metadata attached to a contained block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SdtMetadata {
    /// The SDT's tag/alias, if any.
    pub tag: Option<String>,
    /// Whether the SDT is locked against editing.
    pub locked: bool,
    /// Whether the SDT is hidden.
    pub hidden: bool,
    /// The docPart gallery name, if this SDT is a gallery placeholder (e.g. `"Table of Contents"`).
    pub doc_part_gallery: Option<String>,
    /// Free-form passthrough metadata.
    pub extra: AttrMap,
}

/// Resolved numbering reference on a paragraph, prior to counter resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberingRef {
    /// Concrete numbering definition id.
    pub num_id: u32,
    /// Zero-based indent level.
    pub ilvl: u8,
}

/// Paragraph-level attributes carried on the editor tree, prior to style
/// resolution (direct formatting only; see `crate::style` for the cascade).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParagraphAttrs {
    /// Stable block id, if assigned.
    pub sd_block_id: Option<SdBlockId>,
    /// Monotonic revision, if tracked.
    pub sd_block_rev: Option<SdBlockRev>,
    /// Referenced paragraph style id.
    pub style_id: Option<String>,
    /// Direct-formatting paragraph properties (see `crate::style::context::ParagraphProperties`).
    pub direct_properties: crate::style::context::ParagraphProperties,
    /// Direct-formatting run properties applied to a trailing empty run (the
    /// "paragraph mark" run properties in OOXML), used when the paragraph has
    /// no content runs.
    pub mark_run_properties: Option<crate::style::context::RunProperties>,
    /// Numbering reference, if this paragraph is a list item.
    pub numbering: Option<NumberingRef>,
    /// Set by the TOC handler (§4.E) on unwrapped entries.
    pub is_toc_entry: bool,
    /// The TOC field instruction string, propagated to unwrapped entries.
    pub toc_instruction: Option<String>,
    /// Inner SDT metadata, if this paragraph sits directly inside an SDT.
    pub sdt: Option<SdtMetadata>,
    /// Outer SDT metadata, if this paragraph sits inside a nested SDT.
    pub container_sdt: Option<SdtMetadata>,
}

/// Table cell span/merge attributes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellSpan {
    /// Number of grid columns this cell spans.
    pub colspan: u32,
    /// Number of grid rows this cell spans.
    pub rowspan: u32,
    /// Whether this cell is merged vertically into the cell above.
    pub v_merge_continue: bool,
}

/// A single editor-document node.
///
/// `content` holds the node's ordered children for container kinds; leaf
/// kinds ignore it. The converter (`crate::flow`) walks `content` depth
/// first, so children appear in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// The node's kind and its typed attribute bundle.
    pub kind: NodeKind,
    /// Ordered children, for container kinds.
    pub content: Vec<Node>,
}

impl Node {
    /// Construct a leaf or container node with no children.
    pub fn leaf(kind: NodeKind) -> Self {
        Self {
            kind,
            content: Vec::new(),
        }
    }

    /// Construct a container node with the given children.
    pub fn with_content(kind: NodeKind, content: Vec<Node>) -> Self {
        Self { kind, content }
    }

    /// The PM size this node contributes when walking positions (spec §4.E):
    /// one position for the node's own open/close token plus the recursive
    /// size of its children for container kinds, or the text length for
    /// `Text`.
    pub fn pm_size(&self) -> usize {
        match &self.kind {
            NodeKind::Text { text, .. } => text.chars().count(),
            NodeKind::LineBreak | NodeKind::PageReference { .. } => 1,
            _ => 2 + self.content.iter().map(Node::pm_size).sum::<usize>(),
        }
    }
}

/// The closed set of node kinds the converter understands (spec §3).
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A block-level paragraph.
    Paragraph(ParagraphAttrs),
    /// An inline run wrapping text/inline children.
    Run {
        /// Direct-formatting run properties.
        properties: Option<crate::style::context::RunProperties>,
    },
    /// Literal text content.
    Text {
        /// The text content.
        text: String,
        /// Inline marks applied directly (pre-cascade).
        marks: Marks,
    },
    /// A table.
    Table {
        /// Column widths, in twips, left to right.
        grid: Vec<i32>,
        /// Referenced table style id.
        table_style_id: Option<String>,
        /// Direct-formatting table properties.
        properties: crate::style::context::TableProperties,
    },
    /// A table row.
    TableRow {
        /// Direct-formatting row properties.
        properties: crate::style::context::TableRowProperties,
    },
    /// A table cell.
    TableCell {
        /// Span/merge attributes.
        span: CellSpan,
        /// Direct-formatting cell properties.
        properties: crate::style::context::TableCellProperties,
    },
    /// A table header cell; serializes identically to `TableCell` (spec §4.E).
    TableHeader {
        /// Span/merge attributes.
        span: CellSpan,
        /// Direct-formatting cell properties.
        properties: crate::style::context::TableCellProperties,
    },
    /// An image.
    Image {
        /// Source reference (e.g. a relationship id or URL).
        src: String,
        /// Natural geometry.
        geometry: Geometry,
        /// Anchoring data, if floating.
        anchor: Option<AnchorData>,
        /// Passthrough attrs.
        attrs: AttrMap,
    },
    /// A non-picture drawing (shape, textbox, group).
    Drawing {
        /// Drawing variant.
        drawing_kind: DrawingKind,
        /// Block geometry as declared in the document.
        geometry: Geometry,
        /// Effect-extent margins, if any.
        effect_extent: EffectExtent,
        /// Anchoring data, if floating.
        anchor: Option<AnchorData>,
        /// Passthrough shape attrs (fill, stroke, text content, …).
        attrs: AttrMap,
    },
    /// A field annotation (spec §4.E).
    FieldAnnotation(FieldAnnotationAttrs),
    /// A structured-content container (SDT), document section, or docPart
    /// object: pass-through containers that attach metadata to their
    /// contained blocks.
    StructuredContentBlock {
        /// This container's own metadata.
        metadata: SdtMetadata,
    },
    /// A document section pass-through container.
    DocumentSection {
        /// Section properties (page size, margins, columns), if this is a
        /// terminal section marker rather than a mid-document shorthand.
        page_geometry: Option<crate::paginate::PageGeometry>,
    },
    /// A document part object (e.g. a cover-page building block) pass-through container.
    DocumentPartObject {
        /// This container's own metadata.
        metadata: SdtMetadata,
    },
    /// A table-of-contents gallery container.
    TableOfContents {
        /// The TOC field instruction (e.g. `"TOC \o \"1-3\" \h"`).
        instruction: String,
    },
    /// An inline page break.
    PageBreak,
    /// An inline line break.
    LineBreak,
    /// An inline container wrapping a run, treated as a run wrapper when
    /// computing paragraph-level run properties from its first descendant
    /// (spec §4.E).
    PageReference {
        /// Target bookmark/page reference name.
        target: String,
    },
}

/// Floating-drawing anchor data (subset needed for pagination, spec §4.G).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorData {
    /// Horizontal offset from the anchor origin, in EMUs.
    pub offset_x: i64,
    /// Vertical offset from the anchor origin, in EMUs.
    pub offset_y: i64,
    /// Whether the anchor is relative to the page (`true`) or the paragraph (`false`).
    pub page_relative: bool,
    /// OOXML `relativeHeight` z-ordering value.
    pub relative_height: i64,
}
