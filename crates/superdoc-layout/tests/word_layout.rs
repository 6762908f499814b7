//! Integration tests for word-paragraph layout geometry against the public
//! `wordlayout` API: indent/marker/tab-stop placement in pixel space.

use superdoc_layout::style::context::{Indent, Justification, Suffix, TabAlignment, TabStop};
use superdoc_layout::units::twips_to_px;
use superdoc_layout::wordlayout::{compute_word_layout, marker_should_render, next_tab_stop, MarkerInput};

#[test]
fn plain_paragraph_with_no_indent_or_marker_starts_at_zero() {
    let layout = compute_word_layout(&Indent::default(), &[], 720, None);
    assert_eq!(layout.indent_left_px, 0.0);
    assert_eq!(layout.text_start_px, 0.0);
    assert!(layout.marker.is_none());
}

#[test]
fn left_indent_shifts_the_text_start() {
    let indent = Indent { left: Some(720), ..Default::default() };
    let layout = compute_word_layout(&indent, &[], 720, None);
    assert_eq!(layout.indent_left_px, twips_to_px(720));
    assert_eq!(layout.text_start_px, twips_to_px(720));
}

#[test]
fn hanging_indent_does_not_affect_first_line_text_start_without_a_marker() {
    let indent = Indent { left: Some(720), hanging: Some(360), ..Default::default() };
    let layout = compute_word_layout(&indent, &[], 720, None);
    assert_eq!(layout.hanging_px, twips_to_px(360));
    assert!(!layout.first_line_indent_mode);
    assert_eq!(layout.text_start_px, twips_to_px(720));
}

#[test]
fn numbered_paragraph_with_tab_suffix_snaps_text_start_to_a_tab_stop() {
    let indent = Indent { left: Some(720), hanging: Some(360), ..Default::default() };
    let marker = MarkerInput {
        text: "1.".to_string(),
        justification: Justification::Left,
        suffix: Suffix::Tab,
        text_width_px: Some(14.0),
    };
    let layout = compute_word_layout(&indent, &[], 720, Some(marker));
    let expected = next_tab_stop(twips_to_px(720) + 14.0, &[], twips_to_px(720));
    assert!((layout.text_start_px - expected).abs() < 1e-9);
}

#[test]
fn space_suffix_adds_a_fixed_gutter_instead_of_snapping() {
    let indent = Indent { left: Some(0), hanging: Some(360), ..Default::default() };
    let marker = MarkerInput {
        text: "\u{2022}".to_string(),
        justification: Justification::Left,
        suffix: Suffix::Space,
        text_width_px: Some(10.0),
    };
    let layout = compute_word_layout(&indent, &[], 720, Some(marker));
    assert!((layout.text_start_px - (10.0 + 6.0)).abs() < 1e-9);
}

#[test]
fn unmeasured_marker_width_falls_back_to_zero_rather_than_panicking() {
    let indent = Indent { left: Some(0), hanging: Some(360), ..Default::default() };
    let marker = MarkerInput {
        text: "1.".to_string(),
        justification: Justification::Right,
        suffix: Suffix::Tab,
        text_width_px: None,
    };
    let layout = compute_word_layout(&indent, &[], 720, Some(marker));
    assert!(!marker_should_render(layout.marker.unwrap().marker_text_width_px));
}

#[test]
fn explicit_tab_stop_before_the_default_interval_wins() {
    let tabs = vec![TabStop { position: 200, alignment: TabAlignment::Left }];
    let got = next_tab_stop(0.0, &tabs, 720.0);
    assert!((got - twips_to_px(200)).abs() < 1e-9);
}

#[test]
fn bar_tabs_are_not_stopping_points() {
    let tabs = vec![TabStop { position: 100, alignment: TabAlignment::Bar }];
    let got = next_tab_stop(0.0, &tabs, 48.0);
    assert!((got - 48.0).abs() < 1e-9, "a bar tab must be skipped, falling back to the default interval");
}
