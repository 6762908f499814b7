//! Word-paragraph layout (spec §4.D): per-paragraph indent, first-line /
//! hanging behavior, and list-marker / tab geometry in CSS pixels.
//!
//! This module consumes already-resolved OOXML properties (twips) plus a
//! pre-measured marker glyph width and produces `WordLayout`, a pure
//! pixel-space description consumed by `crate::paginate` and
//! `crate::painter`. It does not measure text itself — glyph widths come
//! from whatever `crate::measure::Measurer` the host plugs in.

use crate::style::context::{Indent, Justification, Suffix, TabAlignment, TabStop};
use crate::units::twips_to_px;

/// Minimum marker box width reserved when `hanging` is absent or too small
/// to hold the marker glyphs (a conservative floor, not a measured value).
const MIN_MARKER_BOX_PX: f64 = 18.0;

/// Gap between the marker box and the paragraph's run text.
const DEFAULT_MARKER_GUTTER_PX: f64 = 6.0;

/// Inputs describing a list marker, already resolved and measured.
#[derive(Debug, Clone)]
pub struct MarkerInput {
    /// The expanded marker text (spec §4.C).
    pub text: String,
    /// Marker justification.
    pub justification: Justification,
    /// Post-marker whitespace policy.
    pub suffix: Suffix,
    /// Measured width of `text` set in the paragraph's run font, in pixels.
    /// `None` before the measurer has run (spec §8 invariant 10: an
    /// unresolved/non-finite/zero width means no marker DOM is produced).
    pub text_width_px: Option<f64>,
}

/// Whether a marker should actually render (spec §8 invariant 10 / §4.J
/// "List marker gating"): the width must be present, finite, and non-zero.
pub fn marker_should_render(width_px: Option<f64>) -> bool {
    matches!(width_px, Some(w) if w.is_finite() && w > 0.0)
}

/// Marker geometry for a numbered/bulleted paragraph (spec §4.D).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerGeometry {
    /// Logical box reserved for the marker; `None` for left-justified
    /// markers, which expose no fixed width (spec: "Left-justified markers
    /// expose no fixed width; text flows beside").
    pub marker_box_width_px: Option<f64>,
    /// Measured width of the marker glyph(s); see [`MarkerInput::text_width_px`].
    pub marker_text_width_px: Option<f64>,
    /// Gap between the marker box and the run text.
    pub marker_gutter_px: f64,
    /// Post-marker whitespace policy.
    pub suffix: Suffix,
}

/// Per-paragraph pixel-space layout (spec §4.D `wordLayout`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WordLayout {
    /// Left indent, in pixels.
    pub indent_left_px: f64,
    /// First-line additional indent, in pixels (0 if absent or `hanging` wins).
    pub first_line_px: f64,
    /// Hanging indent, in pixels (0 if absent).
    pub hanging_px: f64,
    /// Whether `first_line_px` (rather than `hanging_px`) governs the first line.
    pub first_line_indent_mode: bool,
    /// The x position where run text begins on the paragraph's first line.
    pub text_start_px: f64,
    /// The document-wide default tab interval, in pixels.
    pub default_tab_interval_px: f64,
    /// Marker geometry, if this is a numbered/bulleted paragraph.
    pub marker: Option<MarkerGeometry>,
}

/// Find the next tab stop at or past `from_px`, using explicit `tabs` first
/// and falling back to the next multiple of `default_interval_px` (spec
/// §4.D "snapped to the next tab stop"; §4.J "Tab-suffix computation" reuses
/// this same rule from the painter side).
pub fn next_tab_stop(from_px: f64, tabs: &[TabStop], default_interval_px: f64) -> f64 {
    let explicit = tabs
        .iter()
        .filter(|t| t.alignment != TabAlignment::Bar)
        .map(|t| twips_to_px(t.position))
        .filter(|&pos| pos >= from_px)
        .fold(f64::INFINITY, f64::min);

    if explicit.is_finite() {
        return explicit;
    }
    if default_interval_px <= 0.0 {
        return from_px;
    }
    let steps = (from_px / default_interval_px).floor() + 1.0;
    steps * default_interval_px
}

/// Compute a paragraph's word-layout geometry.
pub fn compute_word_layout(
    indent: &Indent,
    tabs: &[TabStop],
    default_tab_interval_twips: i32,
    marker: Option<MarkerInput>,
) -> WordLayout {
    let indent_left_px = indent.left.map(twips_to_px).unwrap_or(0.0);
    let default_tab_interval_px = twips_to_px(default_tab_interval_twips);

    let hanging_px = indent.hanging.map(twips_to_px).unwrap_or(0.0);
    let first_line_indent_mode = indent.hanging.is_none() && matches!(indent.first_line, Some(v) if v > 0);
    let first_line_px = if first_line_indent_mode {
        indent.first_line.map(twips_to_px).unwrap_or(0.0)
    } else {
        0.0
    };

    let marker_geometry = marker.as_ref().map(|m| {
        let measured = m.text_width_px.filter(|w| w.is_finite() && *w > 0.0).unwrap_or(0.0);
        let marker_box_width_px = match m.justification {
            Justification::Left => None,
            _ => Some(hanging_px.max(measured).max(MIN_MARKER_BOX_PX)),
        };
        MarkerGeometry {
            marker_box_width_px,
            marker_text_width_px: m.text_width_px,
            marker_gutter_px: DEFAULT_MARKER_GUTTER_PX,
            suffix: m.suffix,
        }
    });

    let text_start_px = match &marker_geometry {
        Some(geom) => {
            let measured = geom
                .marker_text_width_px
                .filter(|w| w.is_finite() && *w > 0.0)
                .unwrap_or(0.0);
            match geom.suffix {
                Suffix::Tab => next_tab_stop(indent_left_px + measured, tabs, default_tab_interval_px),
                Suffix::Space => indent_left_px + measured + geom.marker_gutter_px,
                Suffix::Nothing => indent_left_px + measured,
            }
        }
        None => indent_left_px + first_line_px.max(0.0),
    };

    WordLayout {
        indent_left_px,
        first_line_px,
        hanging_px,
        first_line_indent_mode,
        text_start_px,
        default_tab_interval_px,
        marker: marker_geometry,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s4_firstline_exclusivity_reflected_in_zero_hanging() {
        // Cascade already dropped `hanging` when `firstLine` won (see
        // style::context::Indent::combine_over); word layout just trusts that.
        let indent = Indent {
            left: Some(360),
            first_line: Some(720),
            hanging: None,
            right: None,
        };
        let layout = compute_word_layout(&indent, &[], 720, None);
        assert!(layout.first_line_indent_mode);
        assert_eq!(layout.hanging_px, 0.0);
        assert!(layout.first_line_px > 0.0);
    }

    #[test]
    fn left_justified_marker_has_no_fixed_box_width() {
        let indent = Indent {
            left: Some(720),
            hanging: Some(360),
            ..Default::default()
        };
        let marker = MarkerInput {
            text: "1.".to_string(),
            justification: Justification::Left,
            suffix: Suffix::Tab,
            text_width_px: Some(14.0),
        };
        let layout = compute_word_layout(&indent, &[], 720, Some(marker));
        assert_eq!(layout.marker.unwrap().marker_box_width_px, None);
    }

    #[test]
    fn right_justified_marker_gets_fixed_box_width() {
        let indent = Indent {
            left: Some(720),
            hanging: Some(360),
            ..Default::default()
        };
        let marker = MarkerInput {
            text: "1.".to_string(),
            justification: Justification::Right,
            suffix: Suffix::Tab,
            text_width_px: Some(14.0),
        };
        let layout = compute_word_layout(&indent, &[], 720, Some(marker));
        assert!(layout.marker.unwrap().marker_box_width_px.unwrap() > 0.0);
    }

    #[test]
    fn next_tab_stop_prefers_explicit_tab_over_default_interval() {
        let tabs = vec![TabStop {
            position: 1000,
            alignment: TabAlignment::Left,
        }];
        let got = next_tab_stop(0.0, &tabs, 720.0);
        assert!((got - twips_to_px(1000)).abs() < 1e-6);
    }

    #[test]
    fn next_tab_stop_falls_back_to_default_interval() {
        let got = next_tab_stop(10.0, &[], 48.0);
        assert!((got - 48.0).abs() < 1e-6);
    }

    #[test]
    fn unmeasured_or_non_finite_marker_width_does_not_render() {
        assert!(!marker_should_render(None));
        assert!(!marker_should_render(Some(0.0)));
        assert!(!marker_should_render(Some(f64::NAN)));
        assert!(!marker_should_render(Some(f64::INFINITY)));
        assert!(marker_should_render(Some(12.0)));
    }
}
