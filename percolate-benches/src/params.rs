//! Benchmark parameter labels.

use std::fmt;

/// Parameters for a single-graph benchmark run.
#[derive(Clone, Debug)]
pub struct GraphBenchParams {
    /// Number of points triangulated.
    pub point_count: usize,
}

impl fmt::Display for GraphBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n={}", self.point_count)
    }
}

/// Parameters for a sweep benchmark run.
#[derive(Clone, Debug)]
pub struct SweepBenchParams {
    /// Repetitions of the probability list.
    pub iterations: usize,
    /// Number of removal probabilities.
    pub p_count: usize,
    /// Scheduling label, such as `sequential`.
    pub strategy: &'static str,
}

impl fmt::Display for SweepBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/it={},p={}",
            self.strategy, self.iterations, self.p_count
        )
    }
}
