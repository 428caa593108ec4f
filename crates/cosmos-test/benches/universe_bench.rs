//! Benchmarks for COSMOS composition and causal graph operations

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use cosmos_core::{Constants, FirstViable, PotentialTransition};
use cosmos_state::{CausalGraph, Universe};
use cosmos_test::{affine_possibility, affine_transition, Affine};

fn bench_compose_chain(c: &mut Criterion) {
    let universe: Universe<i64> = Universe::with_constants(Constants::default());
    let chain: Vec<_> = (0..32)
        .map(|i| affine_transition(format!("t{}", i), Affine::add(1), 1.0))
        .collect();

    c.bench_function("compose_chain_32", |b| {
        b.iter(|| black_box(universe.compose_chain(black_box(&chain))))
    });
}

fn bench_evolve(c: &mut Criterion) {
    let mut universe: Universe<i64> = Universe::with_constants(Constants::default());
    let chain: Vec<_> = (0..32)
        .map(|i| affine_transition(format!("t{}", i), Affine::mul(3), 1.0))
        .collect();

    c.bench_function("evolve_32", |b| {
        b.iter(|| black_box(universe.evolve(black_box(1), &chain)))
    });
}

fn bench_graph_record(c: &mut Criterion) {
    c.bench_function("graph_record_chain_256", |b| {
        b.iter(|| {
            let mut graph = CausalGraph::new();
            let mut state = 0i64;
            for i in 0..256 {
                state = graph
                    .record_transition(&state, affine_transition(format!("e{}", i), Affine::add(1), 1.0))
                    .unwrap();
            }
            black_box(graph.edge_count())
        })
    });
}

fn bench_commit_batch(c: &mut Criterion) {
    c.bench_function("commit_batch_64", |b| {
        b.iter(|| {
            let mut universe: Universe<i64> = Universe::with_constants(Constants::default());
            for n in 1..=64 {
                universe.aggregate(PotentialTransition::new(
                    0,
                    vec![affine_possibility(format!("+{}", n), Affine::add(n), 1.0)],
                ));
            }
            black_box(universe.commit(&0, &FirstViable).unwrap().len())
        })
    });
}

criterion_group!(
    benches,
    bench_compose_chain,
    bench_evolve,
    bench_graph_record,
    bench_commit_batch,
);
criterion_main!(benches);
