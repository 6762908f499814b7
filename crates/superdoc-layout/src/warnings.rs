//! First-class render warnings.
//!
//! The core never throws across the render boundary (spec §7): every
//! recoverable failure is recorded here instead, and returned to the host
//! alongside the [`crate::Layout`] it nonetheless produced. Hosts decide
//! whether to surface these to a user; the pipeline's own behavior never
//! depends on whether a warning was read.

use std::fmt;

/// The block or style-graph location a warning refers to, when known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarningSite {
    /// A specific block, by its stable id.
    Block(String),
    /// A style definition, by styleId.
    Style(String),
    /// A numbering definition, by (numId, ilvl).
    Numbering {
        /// Concrete numbering id.
        num_id: u32,
        /// Zero-based level index.
        ilvl: u8,
    },
    /// No specific site; applies to the whole render.
    Document,
}

impl fmt::Display for WarningSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningSite::Block(id) => write!(f, "block {id}"),
            WarningSite::Style(id) => write!(f, "style {id}"),
            WarningSite::Numbering { num_id, ilvl } => {
                write!(f, "numbering {num_id}/{ilvl}")
            }
            WarningSite::Document => write!(f, "document"),
        }
    }
}

/// The taxonomy of recoverable failures described in spec §7.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarningKind {
    /// Unknown node type, orphan attribute, or missing required attr: node was skipped.
    InputMalformed {
        /// Human-readable reason (e.g. `"unknown node type 'foo'"`).
        reason: String,
    },
    /// Cyclic `basedOn`, missing referenced style, or unresolved `abstractNumId`.
    StyleResolutionDegraded {
        /// Human-readable reason.
        reason: String,
    },
    /// A paragraph referenced `{numId, ilvl}` with no matching definition.
    NumberingGap {
        /// The numId that failed to resolve.
        num_id: u32,
        /// The requested level.
        ilvl: u8,
    },
    /// A cached entry mapped to a negative new position and was discarded.
    CacheInconsistent {
        /// Human-readable reason.
        reason: String,
    },
    /// The measurer could not shape a run (font not loaded, shaper exception).
    MeasurerFailure {
        /// Human-readable reason.
        reason: String,
    },
    /// An atomic block was taller than the page and could not be split; it was clipped.
    UnresolvableOverflow {
        /// The content height that did not fit, in pixels.
        content_height_px: f64,
        /// The available height it was clipped to, in pixels.
        available_height_px: f64,
    },
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningKind::InputMalformed { reason } => write!(f, "input malformed: {reason}"),
            WarningKind::StyleResolutionDegraded { reason } => {
                write!(f, "style resolution degraded: {reason}")
            }
            WarningKind::NumberingGap { num_id, ilvl } => {
                write!(f, "numbering gap: numId={num_id} ilvl={ilvl} has no definition")
            }
            WarningKind::CacheInconsistent { reason } => {
                write!(f, "cache inconsistent: {reason}")
            }
            WarningKind::MeasurerFailure { reason } => write!(f, "measurer failure: {reason}"),
            WarningKind::UnresolvableOverflow {
                content_height_px,
                available_height_px,
            } => write!(
                f,
                "unresolvable overflow: content height {content_height_px}px \
                 exceeds available {available_height_px}px; clipped"
            ),
        }
    }
}

/// A single warning attached to a render result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// What went wrong.
    pub kind: WarningKind,
    /// Where it happened, if known.
    pub site: WarningSite,
}

impl Warning {
    /// Construct a warning for the given site.
    pub fn new(kind: WarningKind, site: WarningSite) -> Self {
        Self { kind, site }
    }

    /// Construct a document-scoped warning (no specific block/style/numbering site).
    pub fn document(kind: WarningKind) -> Self {
        Self::new(kind, WarningSite::Document)
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.kind, self.site)
    }
}

/// Accumulates warnings for a single render and mirrors each one to the
/// `log` facade at the severity the taxonomy implies (spec §2.1 [ADDED]).
#[derive(Debug, Clone, Default)]
pub struct WarningSink {
    warnings: Vec<Warning>,
}

impl WarningSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning, logging it at debug level.
    pub fn push(&mut self, warning: Warning) {
        log::debug!("{warning}");
        self.warnings.push(warning);
    }

    /// Consume the sink, returning the accumulated warnings in emission order.
    pub fn into_vec(self) -> Vec<Warning> {
        self.warnings
    }

    /// Number of warnings recorded so far.
    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    /// Whether no warnings have been recorded.
    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Programmer-facing misuse of the public API (spec §2.2 [ADDED]).
///
/// Unlike [`Warning`], these are returned as `Err` because they indicate the
/// host called the API incorrectly rather than fed it a malformed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// A [`crate::paginate::PageGeometry`] with non-positive usable width or height.
    InvalidPageGeometry {
        /// Usable content width, in pixels.
        width_px: f64,
        /// Usable content height, in pixels.
        height_px: f64,
    },
    /// The cache was queried or committed without a matching `begin()`.
    CacheNotBegun,
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::InvalidPageGeometry { width_px, height_px } => write!(
                f,
                "invalid page geometry: width={width_px}px height={height_px}px"
            ),
            LayoutError::CacheNotBegun => {
                write!(f, "flow block cache used without a matching begin()")
            }
        }
    }
}

impl std::error::Error for LayoutError {}
