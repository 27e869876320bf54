//! End-to-end sweep benchmarks comparing trial scheduling strategies.
#![expect(
    missing_docs,
    reason = "Criterion macros generate items without doc comments"
)]
#![expect(
    clippy::shadow_reuse,
    reason = "Criterion bench_with_input closures rebind parameter names"
)]
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use percolate_benches::{error::BenchSetupError, params::SweepBenchParams};
use percolate_core::{ExecutionStrategy, SweepBuilder, linspace};

const ITERATIONS: usize = 4;

const STRATEGIES: &[(&str, ExecutionStrategy)] = &[
    ("sequential", ExecutionStrategy::Sequential),
    ("auto", ExecutionStrategy::Auto),
];

fn sweep_impl(c: &mut Criterion) -> Result<(), BenchSetupError> {
    let mut group = c.benchmark_group("sweep");
    group.sample_size(10);
    let p_values = linspace(0.5, 0.9, 5);

    for &(label, strategy) in STRATEGIES {
        let sweep = SweepBuilder::new()
            .with_iterations(ITERATIONS)
            .with_p_values(p_values.clone())
            .with_node_range(60, 80)
            .with_seed(3)
            .with_execution_strategy(strategy)
            .build()?;
        let params = SweepBenchParams {
            iterations: ITERATIONS,
            p_count: p_values.len(),
            strategy: label,
        };

        group.bench_with_input(BenchmarkId::from_parameter(&params), &sweep, |b, sweep| {
            b.iter(|| sweep.run());
        });
    }

    group.finish();
    Ok(())
}

fn sweep(c: &mut Criterion) {
    if let Err(err) = sweep_impl(c) {
        panic!("sweep benchmark setup failed: {err}");
    }
}

criterion_group!(benches, sweep);
criterion_main!(benches);
