use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::{json, Map, Value};
use token_resolver::merge::merge;
use token_resolver::tracker::leaf_paths;
use token_resolver::{load, tree_from_value, ModifierSelection, TokenTree};

// ============================================================================
// Test Data: Generated Token Trees
// ============================================================================

/// A tree with `groups` groups of `tokens` DTCG tokens each, valued with `tag`.
fn generate_tree(groups: usize, tokens: usize, tag: &str) -> Value {
    let mut root = Map::new();
    for g in 0..groups {
        let mut group = Map::new();
        for t in 0..tokens {
            group.insert(
                format!("token-{t}"),
                json!({ "$value": format!("{tag}-{g}-{t}"), "$type": "color" }),
            );
        }
        root.insert(format!("group-{g}"), Value::Object(group));
    }
    Value::Object(root)
}

fn tree(groups: usize, tokens: usize, tag: &str) -> TokenTree {
    tree_from_value(generate_tree(groups, tokens, tag)).unwrap()
}

fn design_system(groups: usize) -> Vec<(String, String)> {
    let resolver = json!({
        "name": "bench",
        "sets": [{ "name": "core", "sources": ["base.json", "brand.json"] }],
        "modifiers": [
            { "name": "theme", "values": [
                { "name": "light", "values": [] },
                { "name": "dark", "values": ["dark.json"] }
            ] },
            { "name": "density", "values": [
                { "name": "comfortable", "values": [] },
                { "name": "compact", "values": ["compact.json"] }
            ] }
        ]
    });
    vec![
        ("resolver.json".to_string(), resolver.to_string()),
        ("base.json".to_string(), generate_tree(groups, 20, "base").to_string()),
        ("brand.json".to_string(), generate_tree(groups / 2, 20, "brand").to_string()),
        ("dark.json".to_string(), generate_tree(groups, 10, "dark").to_string()),
        ("compact.json".to_string(), generate_tree(groups / 4, 5, "compact").to_string()),
    ]
}

// ============================================================================
// Merge and Tracking
// ============================================================================

fn bench_merge_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_scaling");

    for groups in [10, 50, 200] {
        let trees = vec![
            tree(groups, 20, "a"),
            tree(groups, 20, "b"),
            tree(groups / 2, 40, "c"),
        ];
        group.throughput(Throughput::Elements((groups * 20) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(groups), &trees, |b, trees| {
            b.iter(|| merge(black_box(trees)))
        });
    }

    group.finish();
}

fn bench_leaf_paths(c: &mut Criterion) {
    let large = tree(200, 20, "a");
    c.bench_function("leaf_paths_4000_tokens", |b| {
        b.iter(|| leaf_paths(black_box(&large), "."))
    });
}

// ============================================================================
// End-to-End
// ============================================================================

fn bench_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("load");

    for groups in [10, 100] {
        let files = design_system(groups);
        group.bench_with_input(BenchmarkId::from_parameter(groups), &files, |b, files| {
            b.iter(|| load(black_box(files.clone())))
        });
    }

    group.finish();
}

fn bench_apply(c: &mut Criterion) {
    let resolver = load(design_system(100)).unwrap();
    let selection: ModifierSelection = [
        ("theme".to_string(), "dark".to_string()),
        ("density".to_string(), "compact".to_string()),
    ]
    .into_iter()
    .collect();

    c.bench_function("apply_dark_compact", |b| {
        b.iter(|| resolver.apply(black_box(&selection)))
    });

    c.bench_function("diff_against_defaults", |b| {
        let defaults = resolver.default_selection();
        b.iter(|| resolver.diff(black_box(&defaults), black_box(&selection)))
    });
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(merge_benches, bench_merge_scaling, bench_leaf_paths);

criterion_group!(e2e_benches, bench_load, bench_apply);

criterion_main!(merge_benches, e2e_benches);
