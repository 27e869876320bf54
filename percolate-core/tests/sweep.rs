//! Tests for sweep configuration, ordering, isolation and instrumentation.

mod common;

use common::FaultySampler;
use percolate_core::{
    AnalysisError, ExecutionStrategy, FailurePolicy, GeometryError, SweepBuilder, SweepError,
    percolation_order_parameter, run_sweep, trial_seed,
};
use percolate_test_support::recording::capture;
use rstest::rstest;
use tracing::Level;

#[test]
fn single_trial_without_removal_is_fully_connected() {
    let report = run_sweep(1, &[0.0], (40, 50), 42).expect("valid configuration");
    assert_eq!(report.len(), 1);
    assert_eq!(report.failure_count(), 0);
    let trial = report.results().next().expect("one result");
    assert_eq!(trial.iteration, 0);
    assert_eq!(trial.p, 0.0);
    assert_eq!(trial.removed_edges, 0);
    assert_eq!(trial.percolation_order_parameter, 1.0);
    assert_eq!(trial.component_nodes, trial.point_count);
    assert_eq!(trial.seed, trial_seed(42, 0, 0));
}

#[test]
fn failing_iteration_is_isolated() {
    let sweep = SweepBuilder::new()
        .with_iterations(5)
        .with_p_values(vec![0.2])
        .with_seed(7)
        .build()
        .expect("valid configuration");
    let report = sweep
        .run_with_sampler(&FaultySampler::new(3))
        .expect("best effort never aborts");

    assert_eq!(report.len(), 5);
    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    let failure = failures[0];
    assert_eq!(failure.iteration, 3);
    assert_eq!(failure.p, 0.2);
    assert_eq!(failure.seed, trial_seed(7, 3, 0));
    assert_eq!(
        failure.error,
        AnalysisError::Geometry(GeometryError::TooFewPoints { count: 2 })
    );

    let succeeded: Vec<usize> = report.results().map(|trial| trial.iteration).collect();
    assert_eq!(succeeded, vec![0, 1, 2, 4]);
}

#[rstest]
#[case::sequential(ExecutionStrategy::Sequential)]
#[case::auto(ExecutionStrategy::Auto)]
fn fail_fast_returns_the_first_failure(#[case] strategy: ExecutionStrategy) {
    let sweep = SweepBuilder::new()
        .with_iterations(5)
        .with_p_values(vec![0.1, 0.3])
        .with_failure_policy(FailurePolicy::FailFast)
        .with_execution_strategy(strategy)
        .build()
        .expect("valid configuration");
    let err = sweep
        .run_with_sampler(&FaultySampler::new(2))
        .expect_err("iteration 2 fails");
    assert_eq!(err.code().as_str(), "SWEEP_TRIAL_FAILURE");
    let SweepError::Trial(trial) = err else {
        panic!("expected a trial failure");
    };
    assert_eq!((trial.iteration, trial.p_index), (2, 0));
}

#[cfg(feature = "parallel")]
#[test]
fn sequential_and_parallel_reports_match() {
    let builder = SweepBuilder::new()
        .with_iterations(3)
        .with_p_values(vec![0.0, 0.5, 0.8])
        .with_node_range(30, 45)
        .with_seed(1234);
    let sequential = builder
        .clone()
        .with_execution_strategy(ExecutionStrategy::Sequential)
        .build()
        .expect("valid configuration")
        .run()
        .expect("sweep runs");
    let parallel = builder
        .with_execution_strategy(ExecutionStrategy::Parallel)
        .build()
        .expect("valid configuration")
        .run()
        .expect("sweep runs");
    assert_eq!(sequential, parallel);
    let order: Vec<(usize, usize)> = sequential
        .outcomes()
        .iter()
        .map(|outcome| match outcome {
            Ok(trial) => (trial.iteration, trial.p_index),
            Err(error) => (error.iteration, error.p_index),
        })
        .collect();
    assert_eq!(
        order,
        vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2), (2, 0), (2, 1), (2, 2)]
    );
}

#[test]
fn same_seed_reproduces_the_sweep() {
    let first = run_sweep(2, &[0.4], (20, 30), 5).expect("valid configuration");
    let second = run_sweep(2, &[0.4], (20, 30), 5).expect("valid configuration");
    let other = run_sweep(2, &[0.4], (20, 30), 6).expect("valid configuration");
    assert_eq!(first, second);
    assert_ne!(first, other);
}

#[test]
fn sweep_emits_run_and_trial_spans() {
    let sweep = SweepBuilder::new()
        .with_iterations(2)
        .with_p_values(vec![0.5])
        .with_node_range(20, 20)
        .with_execution_strategy(ExecutionStrategy::Sequential)
        .build()
        .expect("valid configuration");
    let (report, layer) = capture(|| sweep.run_with_sampler(&FaultySampler::new(1)));
    let report = report.expect("best effort never aborts");
    assert_eq!(report.failure_count(), 1);

    let runs = layer.spans_named("core.sweep.run");
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].field("iterations"), Some("2"));

    let trials = layer.spans_named("core.sweep.trial");
    assert_eq!(trials.len(), 2);
    assert_eq!(trials[1].field("iteration"), Some("1"));
    assert!(!layer.spans_named("core.triangulate").is_empty());

    let failed = layer.events_with_message("trial failed");
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].level, Level::WARN);
    assert_eq!(failed[0].field("code"), Some("GEOMETRY_TOO_FEW_POINTS"));

    let complete = layer.events_with_message("sweep complete");
    assert_eq!(complete.len(), 1);
    assert_eq!(complete[0].field("failed"), Some("1"));
}

#[test]
fn replayed_trials_match_their_results() {
    let sweep = SweepBuilder::new()
        .with_iterations(2)
        .with_p_values(vec![0.0, 0.6])
        .with_node_range(30, 40)
        .with_seed(77)
        .with_execution_strategy(ExecutionStrategy::Sequential)
        .build()
        .expect("valid configuration");
    let report = sweep.run().expect("sweep runs");
    for trial in report.results() {
        let graph = sweep
            .replay_trial(trial.iteration, trial.p_index)
            .expect("inside the sweep")
            .expect("replay succeeds");
        assert_eq!(graph.node_count(), trial.point_count);
        assert_eq!(
            percolation_order_parameter(&graph),
            Ok(trial.percolation_order_parameter)
        );
    }
    assert!(sweep.replay_trial(0, 2).is_none());
    assert!(sweep.replay_trial(2, 0).is_none());
}

#[cfg(feature = "serde")]
#[test]
fn trial_results_round_trip_through_json() {
    use percolate_core::TrialResult;

    let report = run_sweep(2, &[0.0, 0.4], (20, 30), 11).expect("valid configuration");
    for trial in report.results() {
        let json = serde_json::to_value(trial).expect("serializable");
        assert_eq!(json["iteration"], trial.iteration);
        assert_eq!(json["seed"], trial.seed);
        assert_eq!(
            json["percolation_order_parameter"],
            trial.percolation_order_parameter
        );
        let back: TrialResult = serde_json::from_value(json).expect("deserializable");
        assert_eq!(&back, trial);
    }
}
