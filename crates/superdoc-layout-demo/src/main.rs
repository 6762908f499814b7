//! Exercises `superdoc-layout`'s public API end to end: builds a small
//! in-memory document by hand, runs it through `render()`, and prints the
//! resulting layout and warnings to stdout.

use superdoc_layout::document::{Marks, Node, NodeKind, NumberingRef, ParagraphAttrs};
use superdoc_layout::measure::SimpleMeasurer;
use superdoc_layout::style::context::{
    AbstractNumDef, ConcreteNumDef, Justification, LevelDef, NumFormat, NumberingTables, Suffix,
};
use superdoc_layout::{render, FlowBlockCache, PageGeometry, RenderOptions, StyleContext};

use std::collections::BTreeMap;

fn text_paragraph(text: &str) -> Node {
    Node::with_content(
        NodeKind::Paragraph(ParagraphAttrs::default()),
        vec![Node::with_content(
            NodeKind::Run { properties: None },
            vec![Node::leaf(NodeKind::Text {
                text: text.to_string(),
                marks: Marks::default(),
            })],
        )],
    )
}

fn numbered_paragraph(text: &str, num_id: u32, ilvl: u8) -> Node {
    let mut attrs = ParagraphAttrs {
        numbering: Some(NumberingRef { num_id, ilvl }),
        ..Default::default()
    };
    attrs.sd_block_id = None;
    Node::with_content(
        NodeKind::Paragraph(attrs),
        vec![Node::with_content(
            NodeKind::Run { properties: None },
            vec![Node::leaf(NodeKind::Text {
                text: text.to_string(),
                marks: Marks::default(),
            })],
        )],
    )
}

fn sample_numbering_tables() -> NumberingTables {
    let mut levels = BTreeMap::new();
    levels.insert(
        0,
        LevelDef {
            start: 1,
            num_fmt: NumFormat::Decimal,
            lvl_text: "%1.".to_string(),
            justification: Justification::Left,
            suffix: Suffix::Tab,
        },
    );
    let mut abstract_defs = BTreeMap::new();
    abstract_defs.insert(1, AbstractNumDef { levels });
    let mut concrete_defs = BTreeMap::new();
    concrete_defs.insert(
        1,
        ConcreteNumDef {
            abstract_num_id: 1,
            lvl_overrides: BTreeMap::new(),
        },
    );
    NumberingTables {
        abstract_defs,
        concrete_defs,
    }
}

fn main() {
    env_logger::init();

    let document = vec![
        text_paragraph("Quarterly Report"),
        text_paragraph(
            "This document summarizes results for the quarter, broken out by region \
             and product line, with commentary on the drivers behind each movement.",
        ),
        numbered_paragraph("Revenue grew 12% year over year.", 1, 0),
        numbered_paragraph("Operating margin held steady at 18%.", 1, 0),
        Node::leaf(NodeKind::PageBreak),
        text_paragraph("Appendix: methodology notes follow on subsequent pages."),
    ];

    let ctx = StyleContext::default();
    let numbering_tables = sample_numbering_tables();
    let geometry = PageGeometry::default_single_column();
    let options = RenderOptions::default();
    let measurer = SimpleMeasurer::new();
    let mut cache = FlowBlockCache::new();

    match render(&document, &ctx, &numbering_tables, &geometry, &options, &measurer, &mut cache) {
        Ok(result) => {
            println!(
                "laid out {} page(s) at {:.0}x{:.0}px",
                result.layout.pages.len(),
                result.layout.page_size.width,
                result.layout.page_size.height
            );
            for page in &result.layout.pages {
                println!("-- page {} ({} fragments) --", page.number, page.fragments.len());
                for fragment in &page.fragments {
                    println!("   {fragment:?}");
                }
            }
            if result.warnings.is_empty() {
                println!("no warnings");
            } else {
                println!("{} warning(s):", result.warnings.len());
                for warning in &result.warnings {
                    println!("   {warning}");
                }
            }
        }
        Err(err) => {
            eprintln!("render failed: {err}");
            std::process::exit(1);
        }
    }
}
