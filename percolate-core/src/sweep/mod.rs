//! Monte-Carlo percolation sweeps.
//!
//! A sweep runs one trial for every `(iteration, p)` pair: sample points,
//! triangulate, remove edges at probability `p`, then measure the thinned
//! graph. Trials are independent and seeded individually, so they can run in
//! any order and on any thread without changing the report.

mod builder;
mod result;
mod seed;

use std::num::NonZeroUsize;

use rand::{SeedableRng, rngs::SmallRng};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, info, info_span, instrument, warn};

use crate::{
    error::{Result, SweepError, TrialError},
    geometry::{PointSampler, UniformPoints, triangulate},
    graph::Graph,
    metrics::GraphMetrics,
    percolation::{percolation_order_parameter, remove_random_edges},
};

pub use self::{
    builder::{
        DEFAULT_ITERATIONS, DEFAULT_MAX_NODES, DEFAULT_MIN_NODES, ExecutionStrategy,
        FailurePolicy, SweepBuilder,
    },
    result::{SweepReport, TrialResult},
    seed::trial_seed,
};

/// `steps` evenly spaced values from `start` to `end`, both included.
///
/// A single step yields `[start]`; zero steps yield an empty list.
///
/// # Examples
/// ```
/// use percolate_core::linspace;
///
/// assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
/// assert_eq!(linspace(0.3, 0.9, 1), vec![0.3]);
/// ```
#[must_use]
pub fn linspace(start: f64, end: f64, steps: usize) -> Vec<f64> {
    match steps {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let last = steps - 1;
            let step = (end - start) / last as f64;
            (0..steps)
                .map(|i| if i == last { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// A validated sweep configuration.
///
/// # Examples
/// ```
/// use percolate_core::{ExecutionStrategy, SweepBuilder};
///
/// let sweep = SweepBuilder::new()
///     .with_iterations(2)
///     .with_p_values(vec![0.0, 0.5])
///     .with_node_range(15, 20)
///     .with_seed(3)
///     .build()?;
/// let report = sweep.run()?;
/// assert_eq!(report.len(), 4);
/// let order: Vec<(usize, usize)> = report
///     .results()
///     .map(|trial| (trial.iteration, trial.p_index))
///     .collect();
/// assert_eq!(order, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
/// # Ok::<(), percolate_core::SweepError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Sweep {
    iterations: NonZeroUsize,
    p_values: Vec<f64>,
    sampler: UniformPoints,
    seed: u64,
    failure_policy: FailurePolicy,
    execution_strategy: ExecutionStrategy,
}

impl Sweep {
    pub(crate) const fn new(
        iterations: NonZeroUsize,
        p_values: Vec<f64>,
        sampler: UniformPoints,
        seed: u64,
        failure_policy: FailurePolicy,
        execution_strategy: ExecutionStrategy,
    ) -> Self {
        Self {
            iterations,
            p_values,
            sampler,
            seed,
            failure_policy,
            execution_strategy,
        }
    }

    /// Number of iterations.
    #[must_use]
    #[rustfmt::skip]
    pub const fn iterations(&self) -> NonZeroUsize { self.iterations }

    /// Removal probabilities in visiting order.
    #[must_use]
    #[rustfmt::skip]
    pub fn p_values(&self) -> &[f64] { &self.p_values }

    /// The point sampler used by [`Sweep::run`].
    #[must_use]
    #[rustfmt::skip]
    pub const fn sampler(&self) -> &UniformPoints { &self.sampler }

    /// Base seed of the sweep.
    #[must_use]
    #[rustfmt::skip]
    pub const fn seed(&self) -> u64 { self.seed }

    /// Failure handling policy.
    #[must_use]
    #[rustfmt::skip]
    pub const fn failure_policy(&self) -> FailurePolicy { self.failure_policy }

    /// Trial scheduling strategy.
    #[must_use]
    #[rustfmt::skip]
    pub const fn execution_strategy(&self) -> ExecutionStrategy { self.execution_strategy }

    /// Total number of trials: iterations × probabilities.
    #[must_use]
    pub fn trial_count(&self) -> usize {
        self.iterations.get() * self.p_values.len()
    }

    /// Runs every trial with uniformly sampled point sets.
    ///
    /// # Errors
    /// See [`Sweep::run_with_sampler`].
    pub fn run(&self) -> core::result::Result<SweepReport, SweepError> {
        self.run_with_sampler(&self.sampler)
    }

    /// Runs every trial, drawing point sets from `sampler`.
    ///
    /// Under [`FailurePolicy::BestEffort`] failed trials are recorded in the
    /// report next to the successful ones. Under [`FailurePolicy::FailFast`]
    /// the first failure in sweep order is returned instead.
    ///
    /// # Errors
    /// Returns [`SweepError::BackendUnavailable`] when
    /// [`ExecutionStrategy::Parallel`] is requested without the `parallel`
    /// feature, and [`SweepError::Trial`] for a failure under
    /// [`FailurePolicy::FailFast`].
    #[instrument(
        name = "core.sweep.run",
        err,
        skip(self, sampler),
        fields(
            iterations = self.iterations.get(),
            p_values = self.p_values.len(),
            seed = self.seed,
            strategy = ?self.execution_strategy,
            policy = ?self.failure_policy,
        ),
    )]
    pub fn run_with_sampler<S: PointSampler + Sync>(
        &self,
        sampler: &S,
    ) -> core::result::Result<SweepReport, SweepError> {
        let outcomes = match self.execution_strategy {
            #[cfg(feature = "parallel")]
            ExecutionStrategy::Auto | ExecutionStrategy::Parallel => self.run_parallel(sampler),
            #[cfg(not(feature = "parallel"))]
            ExecutionStrategy::Auto => self.run_sequential(sampler),
            #[cfg(not(feature = "parallel"))]
            ExecutionStrategy::Parallel => {
                return Err(SweepError::BackendUnavailable {
                    requested: ExecutionStrategy::Parallel,
                });
            }
            ExecutionStrategy::Sequential => self.run_sequential(sampler),
        }?;

        let report = SweepReport::new(outcomes);
        info!(
            trials = report.len(),
            succeeded = report.success_count(),
            failed = report.failure_count(),
            "sweep complete"
        );
        Ok(report)
    }

    /// Rebuilds the edge-thinned graph of one uniformly sampled trial.
    ///
    /// The trial seed is derived exactly as in [`Sweep::run`], so the graph is
    /// the one that trial measured, before largest-component normalization.
    /// Returns `None` when `(iteration, p_index)` lies outside the sweep.
    ///
    /// # Examples
    /// ```
    /// use percolate_core::{SweepBuilder, percolation_order_parameter};
    ///
    /// let sweep = SweepBuilder::new()
    ///     .with_iterations(1)
    ///     .with_p_values(vec![0.3])
    ///     .with_node_range(25, 25)
    ///     .build()?;
    /// let report = sweep.run()?;
    /// let trial = report.results().next().expect("one trial");
    /// let graph = sweep.replay_trial(0, 0).expect("inside the sweep")?;
    /// assert_eq!(percolation_order_parameter(&graph)?, trial.percolation_order_parameter);
    /// assert!(sweep.replay_trial(1, 0).is_none());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn replay_trial(&self, iteration: usize, p_index: usize) -> Option<Result<Graph>> {
        if iteration >= self.iterations.get() {
            return None;
        }
        let p = *self.p_values.get(p_index)?;
        let seed = trial_seed(self.seed, iteration, p_index);
        Some(build_trial_graphs(&self.sampler, iteration, p, seed).map(|trial| trial.thinned))
    }

    fn trial_coordinates(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.iterations.get())
            .flat_map(move |iteration| (0..self.p_values.len()).map(move |p| (iteration, p)))
    }

    fn run_sequential<S: PointSampler>(
        &self,
        sampler: &S,
    ) -> core::result::Result<Vec<core::result::Result<TrialResult, TrialError>>, SweepError> {
        let mut outcomes = Vec::with_capacity(self.trial_count());
        for (iteration, p_index) in self.trial_coordinates() {
            let outcome = self.run_trial(sampler, iteration, p_index);
            if let (FailurePolicy::FailFast, Err(error)) = (self.failure_policy, &outcome) {
                return Err(error.clone().into());
            }
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    #[cfg(feature = "parallel")]
    fn run_parallel<S: PointSampler + Sync>(
        &self,
        sampler: &S,
    ) -> core::result::Result<Vec<core::result::Result<TrialResult, TrialError>>, SweepError> {
        let coordinates: Vec<(usize, usize)> = self.trial_coordinates().collect();
        let outcomes: Vec<_> = coordinates
            .into_par_iter()
            .map(|(iteration, p_index)| self.run_trial(sampler, iteration, p_index))
            .collect();
        if self.failure_policy == FailurePolicy::FailFast {
            if let Some(Err(error)) = outcomes.iter().find(|outcome| outcome.is_err()) {
                return Err(error.clone().into());
            }
        }
        Ok(outcomes)
    }

    fn run_trial<S: PointSampler + ?Sized>(
        &self,
        sampler: &S,
        iteration: usize,
        p_index: usize,
    ) -> core::result::Result<TrialResult, TrialError> {
        let p = self.p_values.get(p_index).copied().unwrap_or_default();
        let seed = trial_seed(self.seed, iteration, p_index);
        let span = info_span!("core.sweep.trial", iteration, p, seed);
        let _entered = span.enter();

        analyse_trial(sampler, iteration, p_index, p, seed).map_err(|error| {
            warn!(code = error.detail_code(), %error, "trial failed");
            TrialError {
                iteration,
                p_index,
                p,
                seed,
                error,
            }
        })
    }
}

/// Graphs built for one trial before normalization.
struct TrialGraphs {
    point_count: usize,
    edge_count: usize,
    thinned: Graph,
}

fn build_trial_graphs<S: PointSampler + ?Sized>(
    sampler: &S,
    iteration: usize,
    p: f64,
    seed: u64,
) -> Result<TrialGraphs> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let points = sampler.sample(iteration, &mut rng)?;
    let triangles = triangulate(&points)?;
    let graph = Graph::from_triangulation(&points, &triangles)?;
    let thinned = remove_random_edges(&graph, p, &mut rng)?;
    Ok(TrialGraphs {
        point_count: points.len(),
        edge_count: graph.edge_count(),
        thinned,
    })
}

fn analyse_trial<S: PointSampler + ?Sized>(
    sampler: &S,
    iteration: usize,
    p_index: usize,
    p: f64,
    seed: u64,
) -> Result<TrialResult> {
    let TrialGraphs {
        point_count,
        edge_count,
        thinned,
    } = build_trial_graphs(sampler, iteration, p, seed)?;
    let order = percolation_order_parameter(&thinned)?;
    let metrics = GraphMetrics::compute(&thinned)?;
    debug!(
        points = point_count,
        component = metrics.node_count,
        order,
        "trial complete"
    );

    Ok(TrialResult {
        iteration,
        p_index,
        p,
        seed,
        point_count,
        removed_edges: edge_count - thinned.edge_count(),
        component_nodes: metrics.node_count,
        component_edges: metrics.edge_count,
        total_effective_resistance: metrics.total_effective_resistance,
        average_shortest_path: metrics.average_shortest_path,
        average_edge_length: metrics.average_edge_length,
        percolation_order_parameter: order,
    })
}

/// Runs a best-effort sweep with default scale and scheduling.
///
/// # Errors
/// Returns a [`SweepError`] when the configuration is invalid; trial failures
/// are recorded in the report.
///
/// # Examples
/// ```
/// use percolate_core::run_sweep;
///
/// let report = run_sweep(1, &[0.0], (30, 30), 11)?;
/// assert_eq!(report.success_count(), 1);
/// let trial = report.results().next().expect("one trial");
/// assert_eq!(trial.percolation_order_parameter, 1.0);
/// assert_eq!(trial.point_count, 30);
/// # Ok::<(), percolate_core::SweepError>(())
/// ```
pub fn run_sweep(
    num_iterations: usize,
    p_values: &[f64],
    node_count_range: (usize, usize),
    seed: u64,
) -> core::result::Result<SweepReport, SweepError> {
    let (min_nodes, max_nodes) = node_count_range;
    SweepBuilder::new()
        .with_iterations(num_iterations)
        .with_p_values(p_values.to_vec())
        .with_node_range(min_nodes, max_nodes)
        .with_seed(seed)
        .build()?
        .run()
}
