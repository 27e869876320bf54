//! Weighted undirected proximity graphs.
//!
//! A [`Graph`] is an immutable node list plus an edge list in insertion order.
//! Edges are weighted by the Euclidean distance between their endpoints and
//! are stored in canonical form (`source < target`). Graphs are assembled
//! through [`GraphBuilder`], which enforces the structural invariants: no
//! self-loops, at most one edge per unordered pair and finite non-negative
//! weights.
//!
//! Operations that derive a graph from another one (subgraph extraction,
//! edge removal) always return a new value and leave the input untouched.

use std::collections::{HashMap, HashSet, hash_map::Entry};

use tracing::warn;

use crate::{
    datasource::{CoordinatePair, CoordinateSource},
    error::{DataSourceError, GraphError},
    geometry::Point,
};

/// A graph node: its original identifier and its position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Node {
    id: usize,
    position: Point,
}

impl Node {
    /// Index of the node in the graph it was first built in. Subgraphs keep
    /// the identifier so nodes can be matched across derived graphs.
    #[must_use]
    #[rustfmt::skip]
    pub const fn id(&self) -> usize { self.id }

    /// Node coordinates.
    #[must_use]
    #[rustfmt::skip]
    pub const fn position(&self) -> Point { self.position }
}

/// An undirected weighted edge in canonical form (`source < target`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    source: usize,
    target: usize,
    weight: f64,
}

impl Edge {
    /// Returns the smaller endpoint index.
    #[must_use]
    #[rustfmt::skip]
    pub const fn source(&self) -> usize { self.source }

    /// Returns the larger endpoint index.
    #[must_use]
    #[rustfmt::skip]
    pub const fn target(&self) -> usize { self.target }

    /// Returns the Euclidean length of the edge.
    #[must_use]
    #[rustfmt::skip]
    pub const fn weight(&self) -> f64 { self.weight }

    /// Returns whether the edge touches `node`.
    #[must_use]
    pub const fn contains(&self, node: usize) -> bool {
        self.source == node || self.target == node
    }
}

const fn canonical(left: usize, right: usize) -> (usize, usize) {
    if left <= right {
        (left, right)
    } else {
        (right, left)
    }
}

/// Incrementally assembles a [`Graph`] over a fixed set of node positions.
///
/// # Examples
/// ```
/// use percolate_core::{GraphBuilder, Point};
///
/// let mut builder = GraphBuilder::new(vec![Point::new(0.0, 0.0), Point::new(3.0, 4.0)]);
/// assert!(builder.add_edge(0, 1)?);
/// assert!(!builder.add_edge(1, 0)?, "reverse edge is the same edge");
/// let graph = builder.build();
/// assert_eq!(graph.edge_count(), 1);
/// assert_eq!(graph.edges()[0].weight(), 5.0);
/// # Ok::<(), percolate_core::GraphError>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct GraphBuilder {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    seen: HashSet<(usize, usize)>,
}

impl GraphBuilder {
    /// Creates a builder whose node `i` sits at `positions[i]`.
    #[must_use]
    pub fn new(positions: Vec<Point>) -> Self {
        let nodes = positions
            .into_iter()
            .enumerate()
            .map(|(id, position)| Node { id, position })
            .collect();
        Self::from_nodes(nodes)
    }

    fn from_nodes(nodes: Vec<Node>) -> Self {
        Self {
            nodes,
            edges: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Adds a node at `position` and returns its index.
    pub fn add_node(&mut self, position: Point) -> usize {
        let id = self.nodes.len();
        self.nodes.push(Node { id, position });
        id
    }

    /// Number of nodes added so far.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Inserts the edge `{left, right}` unless it already exists. The weight
    /// is the Euclidean distance between the endpoint positions.
    ///
    /// Returns `true` when the edge was inserted.
    ///
    /// # Errors
    /// Returns [`GraphError::NodeOutOfBounds`] for unknown endpoints,
    /// [`GraphError::SelfLoop`] when `left == right`, and
    /// [`GraphError::InvalidWeight`] when the distance is not finite.
    pub fn add_edge(&mut self, left: usize, right: usize) -> Result<bool, GraphError> {
        let source_position = self.position_of(left)?;
        let target_position = self.position_of(right)?;
        if left == right {
            return Err(GraphError::SelfLoop { node: left });
        }
        let weight = source_position.distance(target_position);
        if !weight.is_finite() {
            return Err(GraphError::InvalidWeight {
                left,
                right,
                weight,
            });
        }
        let (source, target) = canonical(left, right);
        if !self.seen.insert((source, target)) {
            return Ok(false);
        }
        self.edges.push(Edge {
            source,
            target,
            weight,
        });
        Ok(true)
    }

    fn position_of(&self, node: usize) -> Result<Point, GraphError> {
        self.nodes
            .get(node)
            .map(|n| n.position)
            .ok_or(GraphError::NodeOutOfBounds {
                node,
                node_count: self.nodes.len(),
            })
    }

    /// Finishes construction.
    #[must_use]
    pub fn build(self) -> Graph {
        Graph {
            nodes: self.nodes,
            edges: self.edges,
            index: self.seen,
        }
    }
}

/// Result of building a graph from coordinate rows.
#[derive(Clone, Debug, PartialEq)]
pub struct CoordinateGraph {
    /// The assembled graph.
    pub graph: Graph,
    /// Rows whose two endpoints coincide.
    pub skipped_self_loops: usize,
    /// Rows containing NaN or infinite values.
    pub skipped_non_finite: usize,
}

#[derive(Default)]
struct CoordinateIndex {
    builder: GraphBuilder,
    by_value: HashMap<(u64, u64), usize>,
    skipped_self_loops: usize,
    skipped_non_finite: usize,
}

impl CoordinateIndex {
    fn node_for(&mut self, point: Point) -> usize {
        let builder = &mut self.builder;
        *self
            .by_value
            .entry(coordinate_key(point))
            .or_insert_with(|| builder.add_node(point))
    }

    fn push(&mut self, row: usize, pair: CoordinatePair) {
        if !pair.is_finite() {
            warn!(row, "skipping row with non-finite coordinates");
            self.skipped_non_finite += 1;
            return;
        }
        // Skipped rows contribute no nodes.
        if coordinate_key(pair.from()) == coordinate_key(pair.to()) {
            warn!(row, "skipping row whose endpoints coincide");
            self.skipped_self_loops += 1;
            return;
        }
        let left = self.node_for(pair.from());
        let right = self.node_for(pair.to());
        // Finite endpoints can still overflow to an infinite length.
        if let Err(error) = self.builder.add_edge(left, right) {
            warn!(row, %error, "skipping row that does not form a valid edge");
            self.skipped_non_finite += 1;
        }
    }

    fn finish(self) -> CoordinateGraph {
        CoordinateGraph {
            graph: self.builder.build(),
            skipped_self_loops: self.skipped_self_loops,
            skipped_non_finite: self.skipped_non_finite,
        }
    }
}

/// Hashable identity of a coordinate; `-0.0` and `0.0` map to the same key.
fn coordinate_key(point: Point) -> (u64, u64) {
    ((point.x + 0.0).to_bits(), (point.y + 0.0).to_bits())
}

/// An immutable weighted undirected graph.
///
/// # Examples
/// ```
/// use percolate_core::{Graph, Point};
///
/// let points = [Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(0.0, 1.0)];
/// let graph = Graph::from_triangulation(&points, &[[0, 1, 2]])?;
/// assert_eq!(graph.node_count(), 3);
/// assert_eq!(graph.edge_count(), 3);
/// assert!(graph.contains_edge(2, 0));
/// # Ok::<(), percolate_core::GraphError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    index: HashSet<(usize, usize)>,
}

impl Graph {
    /// Builds the graph of a triangulation: every point becomes a node and
    /// every triangle side an edge. Sides shared by neighbouring triangles
    /// are inserted once.
    ///
    /// # Errors
    /// Returns a [`GraphError`] when a triangle references a missing point or
    /// repeats a vertex.
    pub fn from_triangulation(
        points: &[Point],
        triangles: &[[usize; 3]],
    ) -> Result<Self, GraphError> {
        let mut builder = GraphBuilder::new(points.to_vec());
        for &[a, b, c] in triangles {
            builder.add_edge(a, b)?;
            builder.add_edge(b, c)?;
            builder.add_edge(c, a)?;
        }
        Ok(builder.build())
    }

    /// Builds a graph from empirical rows: each row is one edge between two
    /// nodes identified by coordinate value. Rows with coincident endpoints
    /// or non-finite values are skipped and logged, and add no nodes.
    ///
    /// # Examples
    /// ```
    /// use percolate_core::{CoordinatePair, Graph};
    ///
    /// let graph = Graph::from_coordinate_pairs(&[
    ///     CoordinatePair::new(0.0, 0.0, 1.0, 0.0),
    ///     CoordinatePair::new(1.0, 0.0, 1.0, 1.0),
    ///     CoordinatePair::new(1.0, 0.0, 0.0, 0.0),
    /// ]);
    /// assert_eq!(graph.node_count(), 3);
    /// assert_eq!(graph.edge_count(), 2);
    /// ```
    #[must_use]
    pub fn from_coordinate_pairs(pairs: &[CoordinatePair]) -> Self {
        Self::collect_pairs(pairs.iter().copied()).graph
    }

    /// Builds a graph from every row of `source`, reporting skipped rows.
    ///
    /// # Errors
    /// Returns [`DataSourceError::EmptyData`] for an empty source and
    /// propagates row access failures.
    pub fn from_source<S: CoordinateSource + ?Sized>(
        source: &S,
    ) -> Result<CoordinateGraph, DataSourceError> {
        if source.is_empty() {
            return Err(DataSourceError::EmptyData);
        }
        let pairs = source.pairs()?;
        Ok(Self::collect_pairs(pairs))
    }

    fn collect_pairs(pairs: impl IntoIterator<Item = CoordinatePair>) -> CoordinateGraph {
        let mut index = CoordinateIndex::default();
        for (row, pair) in pairs.into_iter().enumerate() {
            index.push(row, pair);
        }
        index.finish()
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns `true` when the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in index order.
    #[must_use]
    #[rustfmt::skip]
    pub fn nodes(&self) -> &[Node] { &self.nodes }

    /// Edges in insertion order.
    #[must_use]
    #[rustfmt::skip]
    pub fn edges(&self) -> &[Edge] { &self.edges }

    /// Position of node `index`, if it exists.
    #[must_use]
    pub fn position(&self, index: usize) -> Option<Point> {
        self.nodes.get(index).map(Node::position)
    }

    /// Returns whether `{left, right}` is an edge.
    #[must_use]
    pub fn contains_edge(&self, left: usize, right: usize) -> bool {
        self.index.contains(&canonical(left, right))
    }

    /// Smallest edge weight, or `None` for an edgeless graph.
    #[must_use]
    pub fn min_edge_weight(&self) -> Option<f64> {
        self.edges.iter().map(Edge::weight).min_by(f64::total_cmp)
    }

    /// Returns the subgraph induced by `members`: those nodes (re-indexed in
    /// the given order, keeping their [`Node::id`]) and every edge between
    /// them, in the original edge order.
    ///
    /// # Errors
    /// Returns [`GraphError::NodeOutOfBounds`] when a member does not exist.
    pub fn induced_subgraph(&self, members: &[usize]) -> Result<Self, GraphError> {
        if let Some(&node) = members.iter().find(|&&member| member >= self.nodes.len()) {
            return Err(GraphError::NodeOutOfBounds {
                node,
                node_count: self.nodes.len(),
            });
        }
        Ok(self.induce(members))
    }

    /// [`Graph::induced_subgraph`] for members already known to exist;
    /// unknown members are ignored.
    pub(crate) fn induce(&self, members: &[usize]) -> Self {
        let mut remap: HashMap<usize, usize> = HashMap::with_capacity(members.len());
        let mut nodes = Vec::with_capacity(members.len());
        for &member in members {
            let Some(&node) = self.nodes.get(member) else {
                continue;
            };
            if let Entry::Vacant(slot) = remap.entry(member) {
                slot.insert(nodes.len());
                nodes.push(node);
            }
        }

        let mut builder = GraphBuilder::from_nodes(nodes);
        for edge in &self.edges {
            if let (Some(&source), Some(&target)) =
                (remap.get(&edge.source), remap.get(&edge.target))
            {
                let (source, target) = canonical(source, target);
                if builder.seen.insert((source, target)) {
                    builder.edges.push(Edge {
                        source,
                        target,
                        weight: edge.weight,
                    });
                }
            }
        }
        builder.build()
    }

    /// Returns a copy that keeps only the edges whose position in
    /// [`Graph::edges`] satisfies `keep`.
    #[must_use]
    pub fn retain_edges(&self, mut keep: impl FnMut(usize) -> bool) -> Self {
        let edges: Vec<Edge> = self
            .edges
            .iter()
            .enumerate()
            .filter(|(position, _)| keep(*position))
            .map(|(_, edge)| *edge)
            .collect();
        let index = edges.iter().map(|e| (e.source, e.target)).collect();
        Self {
            nodes: self.nodes.clone(),
            edges,
            index,
        }
    }

    /// Returns a copy without the edges at the given positions in
    /// [`Graph::edges`]. Unknown positions are ignored.
    #[must_use]
    pub fn without_edges(&self, positions: &[usize]) -> Self {
        let removed: HashSet<usize> = positions.iter().copied().collect();
        self.retain_edges(|position| !removed.contains(&position))
    }
}
