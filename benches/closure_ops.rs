//! Benchmarks for closure computation.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use taxonomia::config::TaxonomyConfig;
use taxonomia::entity::EntityId;
use taxonomia::graph::closure::{Closure, ClosureStrategy};
use taxonomia::graph::{RelationEdge, RelationKind};
use taxonomia::taxonomy::Taxonomy;
use taxonomia::taxonomy::import::ImportMode;

const DEPTH: u64 = 1_000;

fn ent(id: u64) -> EntityId {
    EntityId::new(id).unwrap()
}

/// `C1 ⊑ C2 ⊑ … ⊑ C<DEPTH>`, loaded by raw import.
fn deep_chain(strategy: ClosureStrategy) -> Taxonomy {
    let mut tax = Taxonomy::new(TaxonomyConfig {
        strategy,
        ..Default::default()
    })
    .unwrap();
    let edges: Vec<RelationEdge> = (1..DEPTH)
        .map(|i| RelationEdge::new(ent(i), RelationKind::SubClassOf, ent(i + 1)))
        .collect();
    tax.import(&edges, ImportMode::Raw).unwrap();
    tax
}

/// A ring of subclass edges, only reachable through raw import.
fn ring() -> Taxonomy {
    let mut tax = Taxonomy::default();
    let edges: Vec<RelationEdge> = (1..=DEPTH)
        .map(|i| RelationEdge::new(ent(i), RelationKind::SubClassOf, ent(i % DEPTH + 1)))
        .collect();
    tax.import(&edges, ImportMode::Raw).unwrap();
    tax
}

fn bench_deep_chain(c: &mut Criterion) {
    let tax = deep_chain(ClosureStrategy::OnDemand);
    c.bench_function("super_classes_chain_1k", |bench| {
        bench.iter(|| black_box(tax.super_classes(black_box(ent(1)))))
    });
    c.bench_function("check_sub_class_of_chain_1k", |bench| {
        bench.iter(|| black_box(tax.check_sub_class_of(ent(1), ent(DEPTH))))
    });
}

fn bench_cycle(c: &mut Criterion) {
    let tax = ring();
    c.bench_function("super_classes_ring_1k", |bench| {
        bench.iter(|| black_box(tax.super_classes(black_box(ent(1)))))
    });
}

fn bench_materialized(c: &mut Criterion) {
    let mut tax = deep_chain(ClosureStrategy::Materialized);
    tax.materialize();
    c.bench_function("super_classes_materialized_1k", |bench| {
        bench.iter(|| black_box(tax.answer(Closure::SuperClasses, black_box(ent(1)))))
    });
}

fn bench_declare(c: &mut Criterion) {
    c.bench_function("declare_chain_100", |bench| {
        bench.iter(|| {
            let mut tax = Taxonomy::default();
            let ids: Vec<EntityId> = (0..100)
                .map(|i| tax.declare_class(&format!("ex:C{i}")).unwrap())
                .collect();
            for w in ids.windows(2) {
                tax.declare_sub_class_of(w[0], w[1]).unwrap();
            }
            black_box(tax.stores().len())
        })
    });
}

criterion_group!(
    benches,
    bench_deep_chain,
    bench_cycle,
    bench_materialized,
    bench_declare
);
criterion_main!(benches);
