//! Builder utilities for configuring percolation sweeps.
//!
//! Exposes the execution strategy and failure policy selection surface and
//! the validation performed before a [`Sweep`] is constructed.

use std::num::NonZeroUsize;

use crate::{
    error::SweepError,
    geometry::{DEFAULT_SCALE, UniformPoints},
};

use super::{Sweep, linspace};

/// Indicates how [`Sweep::run`] schedules trials.
///
/// `Auto` resolves deterministically: it runs trials on the rayon pool when
/// the `parallel` feature is compiled in and sequentially otherwise. Trial
/// seeds do not depend on scheduling, so every strategy produces the same
/// report for the same configuration.
///
/// # Examples
/// ```
/// use percolate_core::ExecutionStrategy;
///
/// let strategy = ExecutionStrategy::default();
/// assert!(matches!(strategy, ExecutionStrategy::Auto));
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStrategy {
    /// Allow the library to select a scheduler automatically.
    #[default]
    Auto,
    /// Run trials one after another on the calling thread.
    Sequential,
    /// Run trials on the rayon thread pool.
    Parallel,
}

/// What a sweep does when a trial fails.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Record the failure in the report and keep going.
    #[default]
    BestEffort,
    /// Stop and return the first failure in sweep order.
    FailFast,
}

/// Number of iterations run by default.
pub const DEFAULT_ITERATIONS: usize = 19;
/// Smallest node count drawn by default.
pub const DEFAULT_MIN_NODES: usize = 90;
/// Largest node count drawn by default.
pub const DEFAULT_MAX_NODES: usize = 100;

/// Configures and constructs [`Sweep`] instances.
///
/// Defaults: 19 iterations, ten probabilities evenly spaced over
/// `[0.5, 0.9]`, 90 to 100 nodes in a square of side 1200, seed 0,
/// [`FailurePolicy::BestEffort`] and [`ExecutionStrategy::Auto`].
///
/// # Examples
/// ```
/// use percolate_core::{ExecutionStrategy, SweepBuilder};
///
/// let sweep = SweepBuilder::new()
///     .with_iterations(3)
///     .with_p_values(vec![0.1, 0.2])
///     .with_execution_strategy(ExecutionStrategy::Sequential)
///     .build()
///     .expect("builder configuration is valid");
/// assert_eq!(sweep.iterations().get(), 3);
/// assert_eq!(sweep.trial_count(), 6);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SweepBuilder {
    iterations: usize,
    p_values: Vec<f64>,
    min_nodes: usize,
    max_nodes: usize,
    scale: f64,
    seed: u64,
    failure_policy: FailurePolicy,
    execution_strategy: ExecutionStrategy,
}

impl Default for SweepBuilder {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            p_values: linspace(0.5, 0.9, 10),
            min_nodes: DEFAULT_MIN_NODES,
            max_nodes: DEFAULT_MAX_NODES,
            scale: DEFAULT_SCALE,
            seed: 0,
            failure_policy: FailurePolicy::default(),
            execution_strategy: ExecutionStrategy::default(),
        }
    }
}

impl SweepBuilder {
    /// Creates a builder populated with default parameters.
    ///
    /// # Examples
    /// ```
    /// use percolate_core::SweepBuilder;
    ///
    /// let builder = SweepBuilder::new();
    /// assert_eq!(builder.iterations(), 19);
    /// assert_eq!(builder.p_values().len(), 10);
    /// assert_eq!(builder.node_range(), (90, 100));
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the number of iterations.
    #[must_use]
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Overrides the removal probabilities, visited in the given order.
    #[must_use]
    pub fn with_p_values(mut self, p_values: Vec<f64>) -> Self {
        self.p_values = p_values;
        self
    }

    /// Overrides the inclusive node count range.
    #[must_use]
    pub fn with_node_range(mut self, min_nodes: usize, max_nodes: usize) -> Self {
        self.min_nodes = min_nodes;
        self.max_nodes = max_nodes;
        self
    }

    /// Overrides the side length of the sampling square.
    #[must_use]
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Overrides the base seed every trial seed is derived from.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets how trial failures are handled.
    #[must_use]
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Sets the execution strategy used when running the sweep.
    ///
    /// # Examples
    /// ```
    /// use percolate_core::{ExecutionStrategy, SweepBuilder};
    ///
    /// let builder = SweepBuilder::new().with_execution_strategy(ExecutionStrategy::Sequential);
    /// assert_eq!(builder.execution_strategy(), ExecutionStrategy::Sequential);
    /// ```
    #[must_use]
    pub fn with_execution_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.execution_strategy = strategy;
        self
    }

    /// Returns the configured number of iterations.
    #[must_use]
    #[rustfmt::skip]
    pub fn iterations(&self) -> usize { self.iterations }

    /// Returns the configured removal probabilities.
    #[must_use]
    #[rustfmt::skip]
    pub fn p_values(&self) -> &[f64] { &self.p_values }

    /// Returns the configured node count range.
    #[must_use]
    #[rustfmt::skip]
    pub fn node_range(&self) -> (usize, usize) { (self.min_nodes, self.max_nodes) }

    /// Returns the configured sampling square side.
    #[must_use]
    #[rustfmt::skip]
    pub fn scale(&self) -> f64 { self.scale }

    /// Returns the configured base seed.
    #[must_use]
    #[rustfmt::skip]
    pub fn seed(&self) -> u64 { self.seed }

    /// Returns the configured failure policy.
    #[must_use]
    #[rustfmt::skip]
    pub fn failure_policy(&self) -> FailurePolicy { self.failure_policy }

    /// Returns the configured execution strategy.
    #[must_use]
    #[rustfmt::skip]
    pub fn execution_strategy(&self) -> ExecutionStrategy { self.execution_strategy }

    /// Validates the configuration and constructs a [`Sweep`].
    ///
    /// # Errors
    /// Returns [`SweepError::InvalidIterations`] for zero iterations,
    /// [`SweepError::EmptyProbabilities`] when no probability is given,
    /// [`SweepError::InvalidProbability`] for a probability outside `[0, 1]`
    /// and [`SweepError::Geometry`] for an empty node range or an unusable
    /// scale.
    ///
    /// # Examples
    /// ```
    /// use percolate_core::{SweepBuilder, SweepError};
    ///
    /// let err = SweepBuilder::new().with_iterations(0).build().unwrap_err();
    /// assert!(matches!(err, SweepError::InvalidIterations { got: 0 }));
    /// ```
    pub fn build(self) -> Result<Sweep, SweepError> {
        let iterations = NonZeroUsize::new(self.iterations).ok_or(SweepError::InvalidIterations {
            got: self.iterations,
        })?;
        if self.p_values.is_empty() {
            return Err(SweepError::EmptyProbabilities);
        }
        if let Some((index, &p)) = self
            .p_values
            .iter()
            .enumerate()
            .find(|(_, p)| !(0.0..=1.0).contains(*p))
        {
            return Err(SweepError::InvalidProbability { index, p });
        }
        let sampler = UniformPoints::new(self.min_nodes, self.max_nodes, self.scale)?;

        Ok(Sweep::new(
            iterations,
            self.p_values,
            sampler,
            self.seed,
            self.failure_policy,
            self.execution_strategy,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    use crate::error::GeometryError;

    #[test]
    fn defaults_reproduce_the_reference_sweep() {
        let builder = SweepBuilder::new();
        assert_eq!(builder.iterations(), 19);
        assert_eq!(builder.node_range(), (90, 100));
        assert_eq!(builder.scale(), 1200.0);
        assert_eq!(builder.seed(), 0);
        assert_eq!(builder.failure_policy(), FailurePolicy::BestEffort);
        assert_eq!(builder.execution_strategy(), ExecutionStrategy::Auto);
        let p = builder.p_values();
        assert_eq!(p.len(), 10);
        assert_eq!(p[0], 0.5);
        assert_eq!(p[9], 0.9);
    }

    #[rstest]
    #[case(SweepBuilder::new().with_iterations(0), SweepError::InvalidIterations { got: 0 })]
    #[case(SweepBuilder::new().with_p_values(Vec::new()), SweepError::EmptyProbabilities)]
    #[case(
        SweepBuilder::new().with_p_values(vec![0.2, 1.2]),
        SweepError::InvalidProbability { index: 1, p: 1.2 }
    )]
    #[case(
        SweepBuilder::new().with_node_range(10, 5),
        SweepError::Geometry(GeometryError::InvalidNodeRange { min: 10, max: 5 })
    )]
    #[case(
        SweepBuilder::new().with_scale(0.0),
        SweepError::Geometry(GeometryError::InvalidScale { scale: 0.0 })
    )]
    fn build_rejects_invalid_configuration(
        #[case] builder: SweepBuilder,
        #[case] expected: SweepError,
    ) {
        assert_eq!(builder.build().expect_err("invalid configuration"), expected);
    }

    #[test]
    fn build_rejects_nan_probability() {
        let err = SweepBuilder::new()
            .with_p_values(vec![f64::NAN])
            .build()
            .expect_err("NaN probability");
        assert!(matches!(err, SweepError::InvalidProbability { index: 0, .. }));
    }

    #[test]
    fn build_carries_configuration_into_sweep() {
        let sweep = SweepBuilder::new()
            .with_iterations(4)
            .with_p_values(vec![0.0, 0.5, 1.0])
            .with_node_range(20, 30)
            .with_seed(17)
            .with_failure_policy(FailurePolicy::FailFast)
            .build()
            .expect("valid configuration");
        assert_eq!(sweep.iterations().get(), 4);
        assert_eq!(sweep.p_values(), &[0.0, 0.5, 1.0]);
        assert_eq!(sweep.sampler().min_count(), 20);
        assert_eq!(sweep.sampler().max_count(), 30);
        assert_eq!(sweep.seed(), 17);
        assert_eq!(sweep.failure_policy(), FailurePolicy::FailFast);
        assert_eq!(sweep.trial_count(), 12);
    }
}
