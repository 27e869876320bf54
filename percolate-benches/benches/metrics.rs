//! Shortest-path metric benchmarks.
//!
//! Floyd–Warshall is cubic in the node count, so these groups track how the
//! all-pairs pass and the full metric bundle scale with graph size.
#![expect(
    missing_docs,
    reason = "Criterion macros generate items without doc comments"
)]
#![expect(
    clippy::shadow_reuse,
    reason = "Criterion bench_with_input closures rebind parameter names"
)]
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use percolate_benches::{
    error::BenchSetupError,
    params::GraphBenchParams,
    source::{SyntheticConfig, delaunay_graph},
};
use percolate_core::{GraphMetrics, all_pairs_shortest_paths};

const SEED: u64 = 42;

const POINT_COUNTS: &[usize] = &[50, 100, 200];

fn metrics_impl(c: &mut Criterion) -> Result<(), BenchSetupError> {
    let mut group = c.benchmark_group("shortest_paths");
    group.sample_size(20);

    for &point_count in POINT_COUNTS {
        let graph = delaunay_graph(&SyntheticConfig::new(point_count, SEED))?;
        let params = GraphBenchParams { point_count };

        group.bench_with_input(
            BenchmarkId::new("floyd_warshall", &params),
            &graph,
            |b, graph| {
                b.iter(|| all_pairs_shortest_paths(graph));
            },
        );
        group.bench_with_input(
            BenchmarkId::new("graph_metrics", &params),
            &graph,
            |b, graph| {
                b.iter(|| GraphMetrics::compute(graph));
            },
        );
    }

    group.finish();
    Ok(())
}

fn metrics(c: &mut Criterion) {
    if let Err(err) = metrics_impl(c) {
        panic!("metrics benchmark setup failed: {err}");
    }
}

criterion_group!(benches, metrics);
criterion_main!(benches);
