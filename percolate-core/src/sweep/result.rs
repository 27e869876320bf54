//! Per-trial records and the ordered sweep report.

use crate::error::TrialError;

/// Measurements of one completed trial.
///
/// The three structural metrics describe the largest component of the
/// thinned graph; the order parameter describes the thinned graph as a whole.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrialResult {
    /// Zero-based iteration index.
    pub iteration: usize,
    /// Position of `p` in the sweep's probability list.
    pub p_index: usize,
    /// Edge removal probability.
    pub p: f64,
    /// Seed of the trial's random source.
    pub seed: u64,
    /// Number of points sampled for the trial.
    pub point_count: usize,
    /// Edges removed from the triangulation.
    pub removed_edges: usize,
    /// Nodes in the largest component after removal.
    pub component_nodes: usize,
    /// Edges in the largest component after removal.
    pub component_edges: usize,
    /// Harmonic effective-resistance proxy of the component.
    pub total_effective_resistance: f64,
    /// Mean shortest-path length of the component.
    pub average_shortest_path: f64,
    /// Mean edge length of the component.
    pub average_edge_length: f64,
    /// Fraction of nodes in the largest component after removal.
    pub percolation_order_parameter: f64,
}

/// Outcome of every trial of a sweep, in sweep order (by iteration, then by
/// probability).
///
/// # Examples
/// ```
/// use percolate_core::SweepBuilder;
///
/// let report = SweepBuilder::new()
///     .with_iterations(2)
///     .with_p_values(vec![0.0])
///     .with_node_range(12, 12)
///     .build()?
///     .run()?;
/// assert_eq!(report.len(), 2);
/// assert_eq!(report.success_count(), 2);
/// assert!(report.results().all(|trial| trial.percolation_order_parameter == 1.0));
/// # Ok::<(), percolate_core::SweepError>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SweepReport {
    outcomes: Vec<Result<TrialResult, TrialError>>,
}

impl SweepReport {
    pub(crate) const fn new(outcomes: Vec<Result<TrialResult, TrialError>>) -> Self {
        Self { outcomes }
    }

    /// Every trial outcome in sweep order.
    #[must_use]
    #[rustfmt::skip]
    pub fn outcomes(&self) -> &[Result<TrialResult, TrialError>] { &self.outcomes }

    /// Number of trials run.
    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Returns `true` when no trial ran.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Successful trials in sweep order.
    pub fn results(&self) -> impl Iterator<Item = &TrialResult> {
        self.outcomes.iter().filter_map(|outcome| outcome.as_ref().ok())
    }

    /// Failed trials in sweep order.
    pub fn failures(&self) -> impl Iterator<Item = &TrialError> {
        self.outcomes.iter().filter_map(|outcome| outcome.as_ref().err())
    }

    /// Number of successful trials.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.results().count()
    }

    /// Number of failed trials.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    /// Successful trials of one iteration, ordered by probability.
    pub fn results_for_iteration(&self, iteration: usize) -> impl Iterator<Item = &TrialResult> {
        self.results()
            .filter(move |trial| trial.iteration == iteration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::error::EmptyGraphError;

    fn trial(iteration: usize, p_index: usize) -> TrialResult {
        TrialResult {
            iteration,
            p_index,
            p: 0.5,
            seed: 0,
            point_count: 10,
            removed_edges: 4,
            component_nodes: 8,
            component_edges: 9,
            total_effective_resistance: 1.0,
            average_shortest_path: 2.0,
            average_edge_length: 3.0,
            percolation_order_parameter: 0.8,
        }
    }

    #[test]
    fn report_splits_successes_and_failures() {
        let failure = TrialError {
            iteration: 1,
            p_index: 0,
            p: 1.0,
            seed: 3,
            error: EmptyGraphError::NoEdges.into(),
        };
        let report = SweepReport::new(vec![
            Ok(trial(0, 0)),
            Ok(trial(0, 1)),
            Err(failure.clone()),
            Ok(trial(1, 1)),
        ]);
        assert_eq!(report.len(), 4);
        assert_eq!(report.success_count(), 3);
        assert_eq!(report.failure_count(), 1);
        assert_eq!(report.failures().next(), Some(&failure));
        let first: Vec<usize> = report.results_for_iteration(0).map(|t| t.p_index).collect();
        assert_eq!(first, vec![0, 1]);
        assert_eq!(report.results_for_iteration(1).count(), 1);
        assert!(matches!(report.outcomes()[2], Err(_)));
    }
}
