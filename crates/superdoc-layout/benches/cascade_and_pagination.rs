use std::collections::BTreeMap;

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use superdoc_layout::cache::FlowBlockCache;
use superdoc_layout::document::{Marks, Node, NodeKind, NumberingRef, ParagraphAttrs};
use superdoc_layout::measure::SimpleMeasurer;
use superdoc_layout::paginate::PageGeometry;
use superdoc_layout::render;
use superdoc_layout::style::cascade::combine_properties;
use superdoc_layout::style::context::{
    AbstractNumDef, ConcreteNumDef, Justification, LevelDef, NumFormat, NumberingTables, ParagraphProperties,
    StyleContext, StyleDefinition, StyleType, Suffix,
};
use superdoc_layout::RenderOptions;

fn style_chain(depth: usize) -> Vec<ParagraphProperties> {
    (0..depth)
        .map(|i| ParagraphProperties {
            justification: if i % 2 == 0 { Some(Justification::Left) } else { None },
            ..Default::default()
        })
        .collect()
}

fn bench_cascade_merge_depth(c: &mut Criterion) {
    let chain = style_chain(12);
    c.bench_function("cascade/combine_paragraph_properties_depth_12", |b| {
        b.iter(|| {
            let combined: ParagraphProperties = combine_properties(black_box(&chain));
            black_box(combined);
        })
    });
}

fn numbered_paragraph(text: &str, num_id: u32, ilvl: u8) -> Node {
    let attrs = ParagraphAttrs { numbering: Some(NumberingRef { num_id, ilvl }), ..Default::default() };
    Node::with_content(
        NodeKind::Paragraph(attrs),
        vec![Node::with_content(
            NodeKind::Run { properties: None },
            vec![Node::leaf(NodeKind::Text { text: text.to_string(), marks: Marks::default() })],
        )],
    )
}

fn large_document(paragraph_count: usize) -> Vec<Node> {
    (0..paragraph_count)
        .map(|i| numbered_paragraph(&format!("paragraph {i} the quick brown fox jumps over the lazy dog"), 1, (i % 2) as u8))
        .collect()
}

fn numbering_tables() -> NumberingTables {
    let mut levels = BTreeMap::new();
    levels.insert(0, LevelDef { start: 1, num_fmt: NumFormat::Decimal, lvl_text: "%1.".to_string(), justification: Justification::Left, suffix: Suffix::Tab });
    levels.insert(1, LevelDef { start: 1, num_fmt: NumFormat::Decimal, lvl_text: "%1.%2".to_string(), justification: Justification::Left, suffix: Suffix::Tab });
    let mut abstract_defs = BTreeMap::new();
    abstract_defs.insert(1, AbstractNumDef { levels });
    let mut concrete_defs = BTreeMap::new();
    concrete_defs.insert(1, ConcreteNumDef { abstract_num_id: 1, lvl_overrides: BTreeMap::new() });
    NumberingTables { abstract_defs, concrete_defs }
}

fn style_context_with_a_paragraph_style() -> StyleContext {
    let mut styles = BTreeMap::new();
    styles.insert(
        "Body".to_string(),
        StyleDefinition {
            id: "Body".to_string(),
            style_type: StyleType::Paragraph,
            based_on: None,
            linked: None,
            run_properties: Default::default(),
            paragraph_properties: ParagraphProperties { justification: Some(Justification::Left), ..Default::default() },
            table_properties: Default::default(),
            table_row_properties: Default::default(),
            table_cell_properties: Default::default(),
            conditional: BTreeMap::new(),
        },
    );
    StyleContext { styles, ..Default::default() }
}

fn bench_full_render_large_numbered_document(c: &mut Criterion) {
    let document = large_document(2_000);
    let ctx = style_context_with_a_paragraph_style();
    let numbering = numbering_tables();
    let geometry = PageGeometry::default_single_column();
    let options = RenderOptions::default();
    let measurer = SimpleMeasurer::new();

    c.bench_function("render/2000_numbered_paragraphs", |b| {
        b.iter_batched(
            FlowBlockCache::new,
            |mut cache| {
                let result = render(&document, &ctx, &numbering, &geometry, &options, &measurer, &mut cache).unwrap();
                black_box(result.layout.pages.len());
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_repeated_render_reuses_a_shared_cache(c: &mut Criterion) {
    let document = large_document(500);
    let ctx = style_context_with_a_paragraph_style();
    let numbering = numbering_tables();
    let geometry = PageGeometry::default_single_column();
    let options = RenderOptions::default();
    let measurer = SimpleMeasurer::new();
    let mut cache = FlowBlockCache::new();

    c.bench_function("render/500_paragraphs_repeated_against_one_cache", |b| {
        b.iter(|| {
            let result = render(
                black_box(&document),
                &ctx,
                &numbering,
                &geometry,
                &options,
                &measurer,
                &mut cache,
            )
            .unwrap();
            black_box(result.layout.pages.len());
        })
    });
}

criterion_group!(
    benches,
    bench_cascade_merge_depth,
    bench_full_render_large_numbered_document,
    bench_repeated_render_reuses_a_shared_cache
);
criterion_main!(benches);
