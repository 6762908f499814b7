//! Integration tests for the cascade engine against the public property-bag
//! types: determinism, order sensitivity, and the three merge knobs (deep
//! merge, full override, array replace-wholesale).

use superdoc_layout::style::cascade::combine_properties;
use superdoc_layout::style::context::{
    Borders, Indent, Justification, ParagraphProperties, RunProperties, Shading, TabAlignment, TabStop,
};

#[test]
fn empty_chain_is_default() {
    let combined: ParagraphProperties = combine_properties(&[]);
    assert_eq!(combined, ParagraphProperties::default());
}

#[test]
fn later_layer_wins_per_key_not_wholesale() {
    let doc_default = RunProperties {
        bold: Some(false),
        italic: Some(false),
        ..Default::default()
    };
    let style = RunProperties {
        bold: Some(true),
        ..Default::default()
    };
    let combined = combine_properties(&[doc_default, style]);
    assert_eq!(combined.bold, Some(true));
    assert_eq!(combined.italic, Some(false));
}

#[test]
fn indent_firstline_and_hanging_are_mutually_exclusive() {
    let style_layer = ParagraphProperties {
        indent: Some(Indent {
            left: Some(360),
            hanging: Some(360),
            ..Default::default()
        }),
        ..Default::default()
    };
    let direct_layer = ParagraphProperties {
        indent: Some(Indent {
            first_line: Some(720),
            ..Default::default()
        }),
        ..Default::default()
    };
    let combined = combine_properties(&[style_layer, direct_layer]);
    let indent = combined.indent.unwrap();
    assert_eq!(indent.left, Some(360));
    assert_eq!(indent.first_line, Some(720));
    assert_eq!(indent.hanging, None);
}

#[test]
fn shading_is_a_full_override_not_a_field_merge() {
    let base = ParagraphProperties {
        shading: Some(Shading {
            pattern: Some("clear".to_string()),
            fill: Some("FFFFFF".to_string()),
            color: Some("000000".to_string()),
        }),
        ..Default::default()
    };
    let over = ParagraphProperties {
        shading: Some(Shading {
            pattern: Some("pct25".to_string()),
            fill: None,
            color: None,
        }),
        ..Default::default()
    };
    let combined = combine_properties(&[base, over]);
    let shading = combined.shading.unwrap();
    assert_eq!(shading.pattern.as_deref(), Some("pct25"));
    assert_eq!(shading.fill, None, "full override must not keep the base's fill");
}

#[test]
fn borders_full_override_behaves_the_same_as_shading() {
    let base = ParagraphProperties {
        borders: Some(Borders {
            top: None,
            ..Default::default()
        }),
        ..Default::default()
    };
    let over = ParagraphProperties::default();
    let combined = combine_properties(&[base.clone(), over]);
    assert_eq!(combined.borders, base.borders, "an absent `over` borders field leaves base untouched");
}

#[test]
fn tabs_are_replaced_wholesale_never_merged_element_wise() {
    let base = ParagraphProperties {
        tabs: vec![
            TabStop { position: 100, alignment: TabAlignment::Left },
            TabStop { position: 200, alignment: TabAlignment::Right },
        ],
        ..Default::default()
    };
    let over = ParagraphProperties {
        tabs: vec![TabStop { position: 50, alignment: TabAlignment::Center }],
        ..Default::default()
    };
    let combined = combine_properties(&[base, over]);
    assert_eq!(combined.tabs.len(), 1);
    assert_eq!(combined.tabs[0].position, 50);
}

#[test]
fn empty_over_tabs_falls_back_to_base_tabs() {
    let base = ParagraphProperties {
        tabs: vec![TabStop { position: 100, alignment: TabAlignment::Left }],
        ..Default::default()
    };
    let over = ParagraphProperties::default();
    let combined = combine_properties(&[base, over]);
    assert_eq!(combined.tabs.len(), 1);
}

#[test]
fn determinism_across_repeated_folds_of_the_same_chain() {
    let chain = vec![
        ParagraphProperties {
            justification: Some(Justification::Left),
            ..Default::default()
        },
        ParagraphProperties {
            justification: Some(Justification::Center),
            ..Default::default()
        },
    ];
    let first = combine_properties(&chain);
    let second = combine_properties(&chain);
    assert_eq!(first, second);
}

#[test]
fn chain_order_is_significant() {
    let left = ParagraphProperties {
        justification: Some(Justification::Left),
        ..Default::default()
    };
    let center = ParagraphProperties {
        justification: Some(Justification::Center),
        ..Default::default()
    };
    let forward = combine_properties(&[left.clone(), center.clone()]);
    let backward = combine_properties(&[center, left]);
    assert_ne!(forward.justification, backward.justification);
}
