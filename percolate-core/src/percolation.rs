//! Random edge removal and the percolation order parameter.
//!
//! Removal is bond percolation with an exact budget: for a probability `p`
//! exactly `⌊p·|E|⌋` edges are dropped, chosen uniformly without replacement.

use std::num::NonZeroUsize;

use rand::{Rng, seq::index};
use tracing::{info, instrument};

use crate::{
    connectivity::components,
    error::{AnalysisError, EmptyGraphError, Result},
    graph::Graph,
};

pub(crate) fn validate_probability(p: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&p) {
        return Err(AnalysisError::InvalidProbability { p });
    }
    Ok(())
}

/// Number of edges removed from `edges` at probability `p`.
fn removal_budget(edges: usize, p: f64) -> usize {
    let budget = (p * edges as f64).floor() as usize;
    budget.min(edges)
}

/// Returns a copy of `graph` with exactly `⌊p·|E|⌋` uniformly chosen edges
/// removed. Nodes are kept, including any left isolated, and surviving edges
/// keep their relative order.
///
/// # Errors
/// Returns [`AnalysisError::InvalidProbability`] when `p` is NaN or outside
/// `[0, 1]`.
///
/// # Examples
/// ```
/// use percolate_core::{Graph, Point, remove_random_edges};
/// use rand::{SeedableRng, rngs::SmallRng};
///
/// let points = [Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(0.0, 1.0)];
/// let graph = Graph::from_triangulation(&points, &[[0, 1, 2]])?;
/// let mut rng = SmallRng::seed_from_u64(5);
/// let thinned = remove_random_edges(&graph, 0.5, &mut rng)?;
/// assert_eq!(thinned.edge_count(), 2);
/// assert_eq!(thinned.node_count(), 3);
/// assert_eq!(graph.edge_count(), 3);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[instrument(
    name = "core.remove_random_edges",
    err,
    skip(graph, rng),
    fields(p = p, edges = graph.edge_count())
)]
pub fn remove_random_edges<R: Rng + ?Sized>(graph: &Graph, p: f64, rng: &mut R) -> Result<Graph> {
    validate_probability(p)?;
    let edges = graph.edge_count();
    let budget = removal_budget(edges, p);
    if budget == 0 {
        return Ok(graph.clone());
    }
    let removed = index::sample(rng, edges, budget).into_vec();
    Ok(graph.without_edges(&removed))
}

/// Fraction of nodes in the largest connected component: `1.0` for a
/// connected graph, `|largest| / |V|` otherwise.
///
/// # Errors
/// Returns [`EmptyGraphError::NoNodes`] for an empty graph.
///
/// # Examples
/// ```
/// use percolate_core::{GraphBuilder, Point, percolation_order_parameter};
///
/// let mut builder = GraphBuilder::new(vec![Point::default(); 4]);
/// builder.add_edge(0, 1)?;
/// let graph = builder.build();
/// // Coincident points still count as separate nodes.
/// assert_eq!(percolation_order_parameter(&graph)?, 0.5);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn percolation_order_parameter(graph: &Graph) -> core::result::Result<f64, EmptyGraphError> {
    if graph.is_empty() {
        return Err(EmptyGraphError::NoNodes);
    }
    let parts = components(graph);
    if parts.count() == 1 {
        return Ok(1.0);
    }
    Ok(parts.largest_size() as f64 / graph.node_count() as f64)
}

/// Structural change between a graph and a thinned copy of it.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RemovalComparison {
    /// Edges before removal.
    pub edges_before: usize,
    /// Edges after removal.
    pub edges_after: usize,
    /// Connected components before removal.
    pub components_before: usize,
    /// Connected components after removal.
    pub components_after: usize,
    /// Largest component size before removal.
    pub largest_before: usize,
    /// Largest component size after removal.
    pub largest_after: usize,
}

impl RemovalComparison {
    /// Shrinkage of the largest component: `largest_after / largest_before`.
    #[must_use]
    pub fn largest_ratio(&self) -> f64 {
        self.largest_after as f64 / self.largest_before as f64
    }
}

/// Compares the component structure of `before` and `after`.
///
/// # Errors
/// Returns [`EmptyGraphError::NoNodes`] when either graph is empty.
pub fn compare_removal(
    before: &Graph,
    after: &Graph,
) -> core::result::Result<RemovalComparison, EmptyGraphError> {
    if before.is_empty() || after.is_empty() {
        return Err(EmptyGraphError::NoNodes);
    }
    let parts_before = components(before);
    let parts_after = components(after);
    let comparison = RemovalComparison {
        edges_before: before.edge_count(),
        edges_after: after.edge_count(),
        components_before: parts_before.count(),
        components_after: parts_after.count(),
        largest_before: parts_before.largest_size(),
        largest_after: parts_after.largest_size(),
    };
    info!(
        edges_before = comparison.edges_before,
        edges_after = comparison.edges_after,
        components_before = comparison.components_before,
        components_after = comparison.components_after,
        ratio = comparison.largest_ratio(),
        "edge removal compared"
    );
    Ok(comparison)
}

/// Order parameter statistics for one removal probability.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CurvePoint {
    /// Removal probability.
    pub p: f64,
    /// Mean order parameter over the samples.
    pub mean: f64,
    /// Smallest sampled order parameter.
    pub min: f64,
    /// Largest sampled order parameter.
    pub max: f64,
    /// Number of independent removals sampled.
    pub samples: usize,
}

/// Samples the order parameter of `graph` after random removal at each of
/// `p_values`, in the given order, drawing `samples` independent removals
/// per probability from `rng`.
///
/// # Errors
/// Returns [`AnalysisError::InvalidProbability`] for an out-of-range
/// probability and [`EmptyGraphError::NoNodes`] for an empty graph.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use percolate_core::{Graph, Point, percolation_curve};
/// use rand::{SeedableRng, rngs::SmallRng};
///
/// let points = [Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(0.0, 1.0)];
/// let graph = Graph::from_triangulation(&points, &[[0, 1, 2]])?;
/// let samples = NonZeroUsize::new(4).expect("non-zero");
/// let curve = percolation_curve(&graph, &[0.0, 1.0], samples, &mut SmallRng::seed_from_u64(1))?;
/// assert_eq!(curve[0].mean, 1.0);
/// assert!((curve[1].mean - 1.0 / 3.0).abs() < 1e-12);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn percolation_curve<R: Rng + ?Sized>(
    graph: &Graph,
    p_values: &[f64],
    samples: NonZeroUsize,
    rng: &mut R,
) -> Result<Vec<CurvePoint>> {
    if graph.is_empty() {
        return Err(EmptyGraphError::NoNodes.into());
    }
    p_values
        .iter()
        .map(|&p| {
            validate_probability(p)?;
            let mut total = 0.0;
            let mut min = f64::INFINITY;
            let mut max = f64::NEG_INFINITY;
            for _ in 0..samples.get() {
                let thinned = remove_random_edges(graph, p, rng)?;
                let order = percolation_order_parameter(&thinned)?;
                total += order;
                min = min.min(order);
                max = max.max(order);
            }
            Ok(CurvePoint {
                p,
                mean: total / samples.get() as f64,
                min,
                max,
                samples: samples.get(),
            })
        })
        .collect()
}
