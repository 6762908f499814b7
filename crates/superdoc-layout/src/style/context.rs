//! OOXML-equivalent typed property bags and the immutable per-document
//! [`StyleContext`] (spec §3, §6.2).
//!
//! Values here are in native OOXML units (twips for indents/tabs, half
//! points for font sizes, eighths of a point for border widths) until
//! `crate::wordlayout` converts them to pixels. Every bag implements
//! [`crate::style::cascade::Combine`] so the resolver can fold a property
//! chain with [`crate::style::cascade::combine_properties`].

use std::collections::BTreeMap;

use crate::style::cascade::{combine_properties, full_override, override_option, replace_array, Combine};

/// Paragraph/table justification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Justification {
    /// Left-aligned.
    Left,
    /// Centered.
    Center,
    /// Right-aligned.
    Right,
    /// Justified (stretch to fill line width).
    Both,
}

/// Line-spacing interpretation for `spacing.line`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRule {
    /// `line` is an exact height in twips.
    Exact,
    /// `line` is a minimum height in twips.
    AtLeast,
    /// `line` is a multiple of single-line height in 240ths.
    Multiple,
    /// No explicit rule; use font-derived auto height.
    Auto,
}

/// A theme-aware or explicit font family reference.
///
/// Cascade rule (spec §4.A "specialHandlers"): whichever form the
/// higher-priority layer supplies wins outright, clearing the other form
/// from the result, rather than keeping both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontFamily {
    /// A theme font name (e.g. `"minorHAnsi"`), resolved via `themeColors`'
    /// sibling theme-fonts table at paint time.
    pub theme: Option<String>,
    /// An explicit font family name.
    pub explicit: Option<String>,
}

impl FontFamily {
    fn is_empty(&self) -> bool {
        self.theme.is_none() && self.explicit.is_none()
    }

    /// Special-cased merge: a higher-priority theme font clears any lower
    /// explicit font, and vice versa; an empty `over` leaves `base` as-is.
    fn combine_over(base: &Self, over: &Self) -> Self {
        if over.is_empty() {
            return base.clone();
        }
        if over.theme.is_some() {
            FontFamily {
                theme: over.theme.clone(),
                explicit: None,
            }
        } else {
            FontFamily {
                theme: None,
                explicit: over.explicit.clone(),
            }
        }
    }
}

/// Paragraph indentation, in twips.
///
/// Cascade rule (spec §4.A / §4.B "indent resolution"): `first_line` and
/// `hanging` are mutually exclusive — whichever the higher-priority layer
/// sets clears the other from the result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Indent {
    /// Left indent.
    pub left: Option<i32>,
    /// Right indent.
    pub right: Option<i32>,
    /// First-line additional indent (positive pushes the first line right).
    pub first_line: Option<i32>,
    /// Hanging indent (positive pushes all but the first line right).
    pub hanging: Option<i32>,
}

impl Indent {
    fn combine_over(base: &Self, over: &Self) -> Self {
        let left = override_option(&base.left, &over.left);
        let right = override_option(&base.right, &over.right);
        let (first_line, hanging) = if over.first_line.is_some() {
            (over.first_line, None)
        } else if over.hanging.is_some() {
            (None, over.hanging)
        } else {
            (base.first_line, base.hanging)
        };
        Indent {
            left,
            right,
            first_line,
            hanging,
        }
    }
}

/// Paragraph spacing, in twips (`before`/`after`) and `line`-rule-dependent units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Spacing {
    /// Space before the paragraph, in twips.
    pub before: Option<i32>,
    /// Space after the paragraph, in twips.
    pub after: Option<i32>,
    /// Line spacing value, interpreted per `line_rule`.
    pub line: Option<i32>,
    /// How `line` is interpreted.
    pub line_rule: Option<LineRule>,
}

impl Combine for Spacing {
    fn combine_over(base: &Self, over: &Self) -> Self {
        Spacing {
            before: override_option(&base.before, &over.before),
            after: override_option(&base.after, &over.after),
            line: override_option(&base.line, &over.line),
            line_rule: override_option(&base.line_rule, &over.line_rule),
        }
    }
}

/// Tab-stop alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabAlignment {
    /// Left-aligned tab.
    Left,
    /// Centered tab.
    Center,
    /// Right-aligned tab.
    Right,
    /// Decimal-aligned tab.
    Decimal,
    /// Bar tab (draws a vertical rule, does not move text).
    Bar,
}

/// A single explicit tab stop, in twips from the left margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabStop {
    /// Position from the left margin, in twips.
    pub position: i32,
    /// Alignment behavior.
    pub alignment: TabAlignment,
}

/// Shading (background fill), treated as an atomic composite (spec §4.A
/// `fullOverrideKeys`): a higher layer's shading replaces the lower one's
/// wholesale rather than blending `pattern`/`fill`/`color` independently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Shading {
    /// Fill pattern name (`"clear"`, `"pct25"`, …).
    pub pattern: Option<String>,
    /// Background fill color, six-hex-digit RGB or `"auto"`.
    pub fill: Option<String>,
    /// Foreground pattern color.
    pub color: Option<String>,
}

/// A single border edge: width in eighths-of-a-point, style name, and color.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BorderEdge {
    /// Line style name (`"single"`, `"double"`, `"dashed"`, …).
    pub style: Option<String>,
    /// Width in eighths of a point.
    pub width_eighths: Option<i32>,
    /// Border color, six-hex-digit RGB or `"auto"`.
    pub color: Option<String>,
}

/// The four (or six, for tables) border edges, treated atomically like
/// [`Shading`]: a higher layer's border set replaces the lower one's
/// wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Borders {
    /// Top edge.
    pub top: Option<BorderEdge>,
    /// Bottom edge.
    pub bottom: Option<BorderEdge>,
    /// Left edge.
    pub left: Option<BorderEdge>,
    /// Right edge.
    pub right: Option<BorderEdge>,
    /// Interior horizontal edge (tables only).
    pub inside_h: Option<BorderEdge>,
    /// Interior vertical edge (tables only).
    pub inside_v: Option<BorderEdge>,
}

/// Cell margins, in twips.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellMargins {
    /// Top margin.
    pub top: Option<i32>,
    /// Bottom margin.
    pub bottom: Option<i32>,
    /// Left margin.
    pub left: Option<i32>,
    /// Right margin.
    pub right: Option<i32>,
}

/// Vertical-merge state for a table cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VMerge {
    /// Starts a new vertical merge region.
    Restart,
    /// Continues the merge region started by the cell above.
    Continue,
}

/// Resolved run (character-level) properties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunProperties {
    /// Font family (theme or explicit).
    pub font_family: Option<FontFamily>,
    /// Font size in half-points.
    pub font_size_half_pt: Option<i32>,
    /// Bold.
    pub bold: Option<bool>,
    /// Italic.
    pub italic: Option<bool>,
    /// Underline style name.
    pub underline: Option<String>,
    /// Strikethrough.
    pub strike: Option<bool>,
    /// Text color, six-hex-digit RGB or `"auto"`.
    pub color: Option<String>,
    /// Highlight color.
    pub highlight: Option<String>,
    /// Referenced character style id (carried through for diagnostics; the
    /// resolver has already walked it into the chain by the time this bag
    /// is the *result* of a cascade).
    pub style_id: Option<String>,
}

impl Combine for RunProperties {
    fn combine_over(base: &Self, over: &Self) -> Self {
        RunProperties {
            font_family: match (&base.font_family, &over.font_family) {
                (_, None) => base.font_family.clone(),
                (None, Some(o)) => Some(o.clone()),
                (Some(b), Some(o)) => Some(FontFamily::combine_over(b, o)),
            },
            font_size_half_pt: override_option(&base.font_size_half_pt, &over.font_size_half_pt),
            bold: override_option(&base.bold, &over.bold),
            italic: override_option(&base.italic, &over.italic),
            underline: override_option(&base.underline, &over.underline),
            strike: override_option(&base.strike, &over.strike),
            color: override_option(&base.color, &over.color),
            highlight: override_option(&base.highlight, &over.highlight),
            style_id: override_option(&base.style_id, &over.style_id),
        }
    }
}

/// Resolved paragraph properties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParagraphProperties {
    /// Indentation.
    pub indent: Option<Indent>,
    /// Spacing.
    pub spacing: Option<Spacing>,
    /// Justification.
    pub justification: Option<Justification>,
    /// Explicit tab stops (array field: replaced wholesale, never merged).
    pub tabs: Vec<TabStop>,
    /// Keep this paragraph with the next one (no page break between them).
    pub keep_next: Option<bool>,
    /// Keep all lines of this paragraph together on one page.
    pub keep_lines: Option<bool>,
    /// Force a page break before this paragraph.
    pub page_break_before: Option<bool>,
    /// Enable widow/orphan control.
    pub widow_control: Option<bool>,
    /// Background shading.
    pub shading: Option<Shading>,
    /// Paragraph borders.
    pub borders: Option<Borders>,
}

impl Combine for ParagraphProperties {
    fn combine_over(base: &Self, over: &Self) -> Self {
        ParagraphProperties {
            indent: match (&base.indent, &over.indent) {
                (_, None) => base.indent,
                (None, Some(o)) => Some(*o),
                (Some(b), Some(o)) => Some(Indent::combine_over(b, o)),
            },
            spacing: match (&base.spacing, &over.spacing) {
                (_, None) => base.spacing,
                (None, Some(o)) => Some(*o),
                (Some(b), Some(o)) => Some(Spacing::combine_over(b, o)),
            },
            justification: override_option(&base.justification, &over.justification),
            tabs: replace_array(&base.tabs, &over.tabs),
            keep_next: override_option(&base.keep_next, &over.keep_next),
            keep_lines: override_option(&base.keep_lines, &over.keep_lines),
            page_break_before: override_option(&base.page_break_before, &over.page_break_before),
            widow_control: override_option(&base.widow_control, &over.widow_control),
            shading: full_override(&base.shading, &over.shading),
            borders: full_override(&base.borders, &over.borders),
        }
    }
}

/// Resolved table-level properties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableProperties {
    /// Preferred table width, in twips.
    pub width: Option<i32>,
    /// Table justification (alignment on the page).
    pub justification: Option<Justification>,
    /// Background shading.
    pub shading: Option<Shading>,
    /// Table borders.
    pub borders: Option<Borders>,
    /// Default cell margins for cells that don't override them.
    pub cell_margins: Option<CellMargins>,
}

impl Combine for TableProperties {
    fn combine_over(base: &Self, over: &Self) -> Self {
        TableProperties {
            width: override_option(&base.width, &over.width),
            justification: override_option(&base.justification, &over.justification),
            shading: full_override(&base.shading, &over.shading),
            borders: full_override(&base.borders, &over.borders),
            cell_margins: override_option(&base.cell_margins, &over.cell_margins),
        }
    }
}

/// Resolved table-row properties.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableRowProperties {
    /// Row height, in twips.
    pub height: Option<i32>,
    /// Whether this row may not be split across pages.
    pub cant_split: Option<bool>,
    /// Whether this row repeats as a header on continuation pages.
    pub repeat_header: Option<bool>,
}

impl Combine for TableRowProperties {
    fn combine_over(base: &Self, over: &Self) -> Self {
        TableRowProperties {
            height: override_option(&base.height, &over.height),
            cant_split: override_option(&base.cant_split, &over.cant_split),
            repeat_header: override_option(&base.repeat_header, &over.repeat_header),
        }
    }
}

/// Resolved table-cell properties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableCellProperties {
    /// Preferred cell width, in twips.
    pub width: Option<i32>,
    /// Background shading.
    pub shading: Option<Shading>,
    /// Cell borders.
    pub borders: Option<Borders>,
    /// Vertical-merge state.
    pub v_merge: Option<VMerge>,
    /// Cell margins.
    pub margins: Option<CellMargins>,
}

impl Combine for TableCellProperties {
    fn combine_over(base: &Self, over: &Self) -> Self {
        TableCellProperties {
            width: override_option(&base.width, &over.width),
            shading: full_override(&base.shading, &over.shading),
            borders: full_override(&base.borders, &over.borders),
            v_merge: override_option(&base.v_merge, &over.v_merge),
            margins: override_option(&base.margins, &over.margins),
        }
    }
}

/// Which conditional region of a table style a set of properties applies to
/// (spec §3's `conditional tableStyleProperties keyed by region`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TableRegion {
    /// Applies to the whole table; always contributes first.
    WholeTable,
    /// First row band.
    FirstRow,
    /// Last row band.
    LastRow,
    /// First column band.
    FirstCol,
    /// Last column band.
    LastCol,
    /// Odd-numbered row band.
    Band1Horizontal,
    /// Even-numbered row band.
    Band2Horizontal,
    /// Odd-numbered column band.
    Band1Vertical,
    /// Even-numbered column band.
    Band2Vertical,
    /// Top-left corner cell.
    NwCell,
    /// Top-right corner cell.
    NeCell,
    /// Bottom-left corner cell.
    SwCell,
    /// Bottom-right corner cell.
    SeCell,
}

/// One conditional table-style region's contribution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableConditionalFormatting {
    /// Run properties contributed by this region.
    pub run_properties: RunProperties,
    /// Paragraph properties contributed by this region.
    pub paragraph_properties: ParagraphProperties,
    /// Table-cell properties contributed by this region.
    pub table_cell_properties: TableCellProperties,
}

/// The OOXML style type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleType {
    /// A paragraph style.
    Paragraph,
    /// A character (run) style.
    Character,
    /// A table style.
    Table,
    /// A numbering style (rarely used directly; numbering definitions are
    /// the primary numbering carrier — see `crate::numbering`).
    Numbering,
}

/// A single style definition (spec §3).
#[derive(Debug, Clone, PartialEq)]
pub struct StyleDefinition {
    /// The style's id, as referenced by `styleId` attributes.
    pub id: String,
    /// Which kind of style this is.
    pub style_type: StyleType,
    /// The styleId this style is based on, if any.
    pub based_on: Option<String>,
    /// For a paragraph style, the linked character style to also apply to
    /// its runs, if any.
    pub linked: Option<String>,
    /// Run properties contributed directly by this style.
    pub run_properties: RunProperties,
    /// Paragraph properties contributed directly by this style.
    pub paragraph_properties: ParagraphProperties,
    /// Table properties (table styles only).
    pub table_properties: TableProperties,
    /// Table-row properties (table styles only).
    pub table_row_properties: TableRowProperties,
    /// Table-cell properties (table styles only).
    pub table_cell_properties: TableCellProperties,
    /// Conditional region overrides (table styles only).
    pub conditional: BTreeMap<TableRegion, TableConditionalFormatting>,
}

/// Document-wide default properties, the lowest-priority cascade layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocDefaults {
    /// Default paragraph properties.
    pub paragraph: ParagraphProperties,
    /// Default run properties.
    pub run: RunProperties,
}

/// Numbering format for a list level (spec §4.C).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NumFormat {
    /// `1, 2, 3, …`
    Decimal,
    /// `a, b, c, …`
    LowerLetter,
    /// `A, B, C, …`
    UpperLetter,
    /// `i, ii, iii, …`
    LowerRoman,
    /// `I, II, III, …`
    UpperRoman,
    /// A literal glyph; `lvlText` is used as-is.
    Bullet,
}

/// Marker whitespace policy after the marker glyph(s) (spec, glossary "Suffix").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suffix {
    /// A tab character follows the marker.
    Tab,
    /// A single space follows the marker.
    Space,
    /// Nothing follows the marker.
    Nothing,
}

/// One abstract numbering level definition.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelDef {
    /// Starting counter value.
    pub start: i32,
    /// Numbering format.
    pub num_fmt: NumFormat,
    /// Marker template, e.g. `"%1.%2)"`; `%n` refers to the counter at level `n - 1`.
    pub lvl_text: String,
    /// Marker justification.
    pub justification: Justification,
    /// Whitespace policy after the marker.
    pub suffix: Suffix,
}

/// Per-level overrides a concrete numbering definition applies on top of its
/// abstract definition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelOverride {
    /// Overridden starting counter value.
    pub start_override: Option<i32>,
}

/// An abstract numbering definition: up to nine levels (spec §3: `level
/// indices ∈ [0,8]`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AbstractNumDef {
    /// Level definitions, keyed by zero-based level index.
    pub levels: BTreeMap<u8, LevelDef>,
}

/// A concrete numbering definition referencing an abstract one.
#[derive(Debug, Clone, PartialEq)]
pub struct ConcreteNumDef {
    /// The abstract numbering definition this concretizes.
    pub abstract_num_id: u32,
    /// Per-level overrides.
    pub lvl_overrides: BTreeMap<u8, LevelOverride>,
}

/// The two numbering tables (spec §3).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberingTables {
    /// Abstract numbering definitions, keyed by abstractNumId.
    pub abstract_defs: BTreeMap<u32, AbstractNumDef>,
    /// Concrete numbering definitions, keyed by numId.
    pub concrete_defs: BTreeMap<u32, ConcreteNumDef>,
}

impl NumberingTables {
    /// Resolve a concrete numId + level to its effective level definition,
    /// applying any `lvlOverrides`. Returns `None` if `num_id` or the
    /// abstract definition it resolves to don't exist (spec §7 "Numbering
    /// gap"); does not validate that `ilvl` itself is present on the
    /// abstract definition beyond the lookup failing naturally.
    pub fn effective_level(&self, num_id: u32, ilvl: u8) -> Option<(&LevelDef, Option<i32>)> {
        let concrete = self.concrete_defs.get(&num_id)?;
        let abstract_def = self.abstract_defs.get(&concrete.abstract_num_id)?;
        let level = abstract_def.levels.get(&ilvl)?;
        let start_override = concrete
            .lvl_overrides
            .get(&ilvl)
            .and_then(|o| o.start_override);
        Some((level, start_override))
    }
}

/// The immutable, per-document style context (spec §3, §6.2).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleContext {
    /// Document-wide defaults, the lowest cascade layer.
    pub doc_defaults: DocDefaults,
    /// All style definitions, keyed by styleId.
    pub styles: BTreeMap<String, StyleDefinition>,
    /// Numbering tables.
    pub numbering: NumberingTables,
    /// Theme color name -> six-hex-digit RGB.
    pub theme_colors: BTreeMap<String, String>,
}

impl StyleContext {
    /// Fold an explicit, already-ordered chain of paragraph-property layers.
    pub fn combine_paragraph(chain: &[ParagraphProperties]) -> ParagraphProperties {
        combine_properties(chain)
    }

    /// Fold an explicit, already-ordered chain of run-property layers.
    pub fn combine_run(chain: &[RunProperties]) -> RunProperties {
        combine_properties(chain)
    }
}
