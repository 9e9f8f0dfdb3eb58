//! Performance benchmarks for lineage graphs and catalog filtering.
//!
//! Run with: `cargo bench --bench lineage`
//!
//! ## Performance Targets
//!
//! | Operation | Target | Notes |
//! |-----------|--------|-------|
//! | Graph build | <5ms at 1k objects | Includes node synthesis |
//! | Filter pass | <1ms at 1k items | Four active constraints |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::{json, Value};

use feature_lineage::{
    build_lineage_graph, CatalogTable, FilterEngine, FilterQuery, LineageSnapshot, ObjectRef,
    Relationship, RelationshipIndex,
};

/// Registry with `n` objects per category, chained entity → view → service.
fn make_snapshot(n: usize) -> LineageSnapshot {
    let entities: Vec<_> = (0..n).map(|i| json!({"spec": {"name": format!("e{i}")}})).collect();
    let sources: Vec<_> = (0..n)
        .map(|i| json!({"name": format!("d{i}"), "type": "BATCH_FILE"}))
        .collect();
    let views: Vec<_> = (0..n)
        .map(|i| json!({"featureView": {"spec": {"name": format!("fv{i}")}}}))
        .collect();
    let relationships: Vec<_> = (0..n)
        .flat_map(|i| {
            [
                json!({"source": {"name": format!("e{i}"), "type": "entity"},
                       "target": {"name": format!("fv{i}"), "type": "featureView"}}),
                json!({"source": {"name": format!("d{i}"), "type": "batchDataSource"},
                       "target": {"name": format!("fv{i}"), "type": "featureView"}}),
                json!({"source": {"name": format!("fv{i}"), "type": "featureView"},
                       "target": {"name": format!("fs{}", i % 16), "type": "featureService"}}),
            ]
        })
        .collect();

    LineageSnapshot::from_value(json!({
        "objects": {"entities": entities, "dataSources": sources, "featureViews": views},
        "relationships": relationships
    }))
    .unwrap()
}

fn make_items(n: usize) -> Vec<Value> {
    (0..n)
        .map(|i| {
            json!({
                "spec": {
                    "name": format!("entity_{i}"),
                    "owner": if i % 3 == 0 { "ml@example.com" } else { "data@example.com" },
                    "tags": {"team": if i % 2 == 0 { "ml" } else { "risk" }, "tier": "gold"}
                },
                "meta": {"createdTimestamp": format!("2023-0{}-01T00:00:00Z", i % 9 + 1)}
            })
        })
        .collect()
}

fn bench_build_graph(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_graph");

    for n in [10, 100, 1000] {
        let snapshot = make_snapshot(n);
        group.throughput(Throughput::Elements((n * 3) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &snapshot, |b, snapshot| {
            b.iter(|| black_box(build_lineage_graph(snapshot)))
        });
    }
    group.finish();
}

fn bench_apply_filters(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_filters");
    let engine = FilterEngine::for_table(CatalogTable::Entities);
    let query = FilterQuery::new()
        .with("name", "entity_1")
        .with("owner", "ml@")
        .with("tag", "team=ml")
        .with("created", "2023-03-01");

    for n in [100, 1000] {
        let items = make_items(n);
        let index = RelationshipIndex::from_relationships((0..n).map(|i| {
            Relationship::new(
                ObjectRef::new(format!("entity_{i}"), "entity"),
                ObjectRef::new(format!("fv{i}"), "featureView"),
            )
        }));
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &items, |b, items| {
            b.iter(|| black_box(engine.apply_filters(items, &index, &query).len()))
        });
    }
    group.finish();
}

fn bench_fingerprint(c: &mut Criterion) {
    let graph = build_lineage_graph(&make_snapshot(1000));
    c.bench_function("fingerprint_1000", |b| b.iter(|| black_box(graph.fingerprint())));
}

criterion_group!(benches, bench_build_graph, bench_apply_filters, bench_fingerprint);
criterion_main!(benches);
