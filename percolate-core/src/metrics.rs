//! Shortest-path metrics over connected proximity graphs.
//!
//! All-pairs shortest paths are computed with Floyd–Warshall (`O(N³)` time,
//! `O(N²)` memory). The graphs analysed here have around a hundred nodes, so
//! the dense matrix is the simplest correct representation.

use tracing::{debug, instrument};

use crate::{
    connectivity::{components, largest_component},
    error::{AnalysisError, DegenerateDistanceError, EmptyGraphError, Result},
    graph::{Edge, Graph},
};

/// Dense symmetric matrix of shortest-path lengths over a connected graph.
///
/// Row `i` holds the distances from node `i` to every node of the graph the
/// matrix was computed for, indexed the same way as [`Graph::nodes`].
#[derive(Clone, Debug, PartialEq)]
pub struct ShortestPathMatrix {
    nodes: usize,
    distances: Vec<f64>,
}

impl ShortestPathMatrix {
    /// Number of nodes (rows and columns).
    #[must_use]
    #[rustfmt::skip]
    pub const fn node_count(&self) -> usize { self.nodes }

    /// Distance between `left` and `right`, or `None` when either is out of
    /// range.
    #[must_use]
    pub fn get(&self, left: usize, right: usize) -> Option<f64> {
        if left >= self.nodes || right >= self.nodes {
            return None;
        }
        self.distances.get(left * self.nodes + right).copied()
    }

    /// Distances from `node` to every node, or `None` when out of range.
    #[must_use]
    pub fn row(&self, node: usize) -> Option<&[f64]> {
        let start = node.checked_mul(self.nodes)?;
        self.distances.get(start..start + self.nodes)
    }

    /// Iterates over every unordered pair `(i, j, d(i, j))` with `i < j`.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        (0..self.nodes).flat_map(move |left| {
            (left + 1..self.nodes)
                .map(move |right| (left, right, self.distances[left * self.nodes + right]))
        })
    }
}

/// Computes shortest-path lengths between every pair of nodes.
///
/// # Errors
/// Returns [`EmptyGraphError::NoNodes`] for an empty graph and
/// [`AnalysisError::Disconnected`] when some pair of nodes is unreachable.
/// Reduce the graph with [`largest_component`] first to analyse its main
/// component.
///
/// # Examples
/// ```
/// use percolate_core::{Graph, Point, all_pairs_shortest_paths};
///
/// let points = [Point::new(0.0, 0.0), Point::new(3.0, 0.0), Point::new(3.0, 4.0)];
/// let graph = Graph::from_triangulation(&points, &[[0, 1, 2]])?;
/// let matrix = all_pairs_shortest_paths(&graph)?;
/// assert_eq!(matrix.get(0, 2), Some(5.0));
/// assert_eq!(matrix.get(2, 0), Some(5.0));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[instrument(
    name = "core.all_pairs_shortest_paths",
    err,
    skip(graph),
    fields(nodes = graph.node_count(), edges = graph.edge_count())
)]
pub fn all_pairs_shortest_paths(graph: &Graph) -> Result<ShortestPathMatrix> {
    let n = graph.node_count();
    if n == 0 {
        return Err(EmptyGraphError::NoNodes.into());
    }
    let parts = components(graph);
    if parts.count() > 1 {
        return Err(AnalysisError::Disconnected {
            components: parts.count(),
        });
    }

    let mut distances = vec![f64::INFINITY; n * n];
    for node in 0..n {
        distances[node * n + node] = 0.0;
    }
    for edge in graph.edges() {
        let (u, v, w) = (edge.source(), edge.target(), edge.weight());
        if w < distances[u * n + v] {
            distances[u * n + v] = w;
            distances[v * n + u] = w;
        }
    }

    let mut via = vec![0.0; n];
    for k in 0..n {
        via.copy_from_slice(&distances[k * n..(k + 1) * n]);
        for i in 0..n {
            let to_k = distances[i * n + k];
            if to_k.is_infinite() {
                continue;
            }
            let row = &mut distances[i * n..(i + 1) * n];
            for (current, &from_k) in row.iter_mut().zip(&via) {
                let candidate = to_k + from_k;
                if candidate < *current {
                    *current = candidate;
                }
            }
        }
    }

    debug!("shortest paths complete");
    Ok(ShortestPathMatrix {
        nodes: n,
        distances,
    })
}

/// Sums `1 / d(i, j)` over every unordered pair of distinct nodes.
///
/// This is a harmonic proxy that treats each shortest path as a single
/// resistor; it is not the Laplacian resistance distance. A single-node
/// matrix yields `0.0`.
///
/// # Errors
/// Returns [`DegenerateDistanceError`] when two distinct nodes are at
/// distance zero.
///
/// # Examples
/// ```
/// use percolate_core::{Graph, Point, all_pairs_shortest_paths, total_effective_resistance};
///
/// let points = [Point::new(0.0, 0.0), Point::new(2.0, 0.0), Point::new(4.0, 0.0)];
/// let mut builder = percolate_core::GraphBuilder::new(points.to_vec());
/// builder.add_edge(0, 1)?;
/// builder.add_edge(1, 2)?;
/// let matrix = all_pairs_shortest_paths(&builder.build())?;
/// // 1/2 + 1/2 + 1/4
/// assert_eq!(total_effective_resistance(&matrix)?, 1.25);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn total_effective_resistance(
    matrix: &ShortestPathMatrix,
) -> core::result::Result<f64, DegenerateDistanceError> {
    let mut total = 0.0;
    for (left, right, distance) in matrix.pairs() {
        if distance == 0.0 {
            return Err(DegenerateDistanceError { left, right });
        }
        total += distance.recip();
    }
    Ok(total)
}

/// Mean shortest-path length over ordered pairs of distinct nodes:
/// `Σ_{i≠j} d(i, j) / (N (N − 1))`.
///
/// # Errors
/// Returns [`EmptyGraphError::NoNodePairs`] when the matrix covers fewer
/// than two nodes.
pub fn average_shortest_path(
    matrix: &ShortestPathMatrix,
) -> core::result::Result<f64, EmptyGraphError> {
    let n = matrix.node_count();
    if n < 2 {
        return Err(EmptyGraphError::NoNodePairs { nodes: n });
    }
    let half: f64 = matrix.pairs().map(|(_, _, distance)| distance).sum();
    let ordered_pairs = (n * (n - 1)) as f64;
    Ok(2.0 * half / ordered_pairs)
}

/// Mean edge weight of `graph`.
///
/// # Errors
/// Returns [`EmptyGraphError::NoEdges`] when `graph` has no edges.
///
/// # Examples
/// ```
/// use percolate_core::{Graph, Point, average_edge_length};
///
/// let points = [Point::new(0.0, 0.0), Point::new(3.0, 0.0), Point::new(3.0, 4.0)];
/// let graph = Graph::from_triangulation(&points, &[[0, 1, 2]])?;
/// assert_eq!(average_edge_length(&graph)?, 4.0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn average_edge_length(graph: &Graph) -> core::result::Result<f64, EmptyGraphError> {
    if graph.edge_count() == 0 {
        return Err(EmptyGraphError::NoEdges);
    }
    let total: f64 = graph.edges().iter().map(Edge::weight).sum();
    let count = graph.edge_count() as f64;
    Ok(total / count)
}

/// The three structural metrics of a graph's largest component.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphMetrics {
    /// Nodes in the analysed component.
    pub node_count: usize,
    /// Edges in the analysed component.
    pub edge_count: usize,
    /// Harmonic effective-resistance proxy, see [`total_effective_resistance`].
    pub total_effective_resistance: f64,
    /// See [`average_shortest_path`].
    pub average_shortest_path: f64,
    /// See [`average_edge_length`].
    pub average_edge_length: f64,
}

impl GraphMetrics {
    /// Reduces `graph` to its largest component and computes every metric on
    /// that component.
    ///
    /// # Errors
    /// Returns an [`AnalysisError`] when the graph is empty, its largest
    /// component has no edges, or two distinct nodes coincide.
    ///
    /// # Examples
    /// ```
    /// use percolate_core::{Graph, GraphMetrics, Point, triangulate};
    ///
    /// let square = [
    ///     Point::new(0.0, 0.0),
    ///     Point::new(0.0, 1.0),
    ///     Point::new(1.0, 0.0),
    ///     Point::new(1.0, 1.0),
    /// ];
    /// let graph = Graph::from_triangulation(&square, &triangulate(&square)?)?;
    /// let metrics = GraphMetrics::compute(&graph)?;
    /// assert_eq!(metrics.node_count, 4);
    /// assert_eq!(metrics.edge_count, 5);
    /// assert!((metrics.average_edge_length - 1.0828).abs() < 1e-4);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn compute(graph: &Graph) -> Result<Self> {
        let component = largest_component(graph)?;
        let matrix = all_pairs_shortest_paths(&component)?;
        Ok(Self {
            node_count: component.node_count(),
            edge_count: component.edge_count(),
            total_effective_resistance: total_effective_resistance(&matrix)?,
            average_shortest_path: average_shortest_path(&matrix)?,
            average_edge_length: average_edge_length(&component)?,
        })
    }
}
