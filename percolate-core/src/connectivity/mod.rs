//! Connected components and normalization to the largest component.
//!
//! Shortest paths and the resistance proxy are only defined over a connected
//! graph, so every metric computation first reduces its input with
//! [`largest_component`].

mod union_find;

use std::borrow::Cow;

use tracing::debug;

use crate::{error::EmptyGraphError, graph::Graph};

use self::union_find::DisjointSet;

/// Partition of a graph's nodes into connected components.
///
/// Components are ordered by their smallest node index, which is the order an
/// index-order traversal meets them. Members are listed in ascending order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Components {
    members: Vec<Vec<usize>>,
    labels: Vec<usize>,
}

impl Components {
    /// Number of components.
    #[must_use]
    pub fn count(&self) -> usize {
        self.members.len()
    }

    /// Iterates over the components in order.
    pub fn iter(&self) -> impl Iterator<Item = &[usize]> {
        self.members.iter().map(Vec::as_slice)
    }

    /// Component sizes in order.
    #[must_use]
    pub fn sizes(&self) -> Vec<usize> {
        self.iter().map(<[usize]>::len).collect()
    }

    /// The component with the most nodes; ties go to the earliest component.
    #[must_use]
    pub fn largest(&self) -> Option<&[usize]> {
        self.iter().reduce(|best, candidate| {
            if candidate.len() > best.len() {
                candidate
            } else {
                best
            }
        })
    }

    /// Node count of the largest component, `0` for an empty graph.
    #[must_use]
    pub fn largest_size(&self) -> usize {
        self.largest().map_or(0, <[usize]>::len)
    }

    /// Position of the component containing `node`.
    #[must_use]
    pub fn component_of(&self, node: usize) -> Option<usize> {
        self.labels.get(node).copied()
    }
}

fn union_edges(graph: &Graph) -> DisjointSet {
    let mut set = DisjointSet::new(graph.node_count());
    for edge in graph.edges() {
        set.union(edge.source(), edge.target());
    }
    set
}

/// Partitions the nodes of `graph` into connected components.
///
/// # Examples
/// ```
/// use percolate_core::{GraphBuilder, Point, components};
///
/// let mut builder = GraphBuilder::new(vec![Point::new(0.0, 0.0); 1]);
/// for x in 1..5 {
///     builder.add_node(Point::new(f64::from(x), 0.0));
/// }
/// builder.add_edge(0, 1)?;
/// builder.add_edge(3, 4)?;
/// let parts = components(&builder.build());
/// assert_eq!(parts.count(), 3);
/// assert_eq!(parts.largest(), Some(&[0, 1][..]));
/// # Ok::<(), percolate_core::GraphError>(())
/// ```
#[must_use]
pub fn components(graph: &Graph) -> Components {
    let node_count = graph.node_count();
    let mut set = union_edges(graph);
    let mut root_component: Vec<Option<usize>> = vec![None; node_count];
    let mut members: Vec<Vec<usize>> = Vec::with_capacity(set.sets());
    let mut labels = Vec::with_capacity(node_count);

    for node in 0..node_count {
        let root = set.find(node);
        let component = match root_component[root] {
            Some(component) => component,
            None => {
                let component = members.len();
                root_component[root] = Some(component);
                members.push(Vec::new());
                component
            }
        };
        members[component].push(node);
        labels.push(component);
    }

    Components { members, labels }
}

/// Returns `true` when `graph` has at least one node and every node is
/// reachable from every other.
#[must_use]
pub fn is_connected(graph: &Graph) -> bool {
    !graph.is_empty() && union_edges(graph).sets() == 1
}

/// Reduces `graph` to its largest connected component.
///
/// A connected graph is returned borrowed, without copying. Otherwise the
/// subgraph induced by the largest component (ties go to the component
/// holding the smallest node index) is returned owned. The input is never
/// modified.
///
/// # Errors
/// Returns [`EmptyGraphError::NoNodes`] when `graph` has no nodes.
///
/// # Examples
/// ```
/// use std::borrow::Cow;
/// use percolate_core::{GraphBuilder, Point, largest_component};
///
/// let mut builder = GraphBuilder::new(vec![
///     Point::new(0.0, 0.0),
///     Point::new(1.0, 0.0),
///     Point::new(5.0, 5.0),
/// ]);
/// builder.add_edge(0, 1)?;
/// let graph = builder.build();
/// let component = largest_component(&graph)?;
/// assert!(matches!(component, Cow::Owned(_)));
/// assert_eq!(component.node_count(), 2);
/// assert!(matches!(largest_component(&component)?, Cow::Borrowed(_)));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn largest_component(graph: &Graph) -> Result<Cow<'_, Graph>, EmptyGraphError> {
    if graph.is_empty() {
        return Err(EmptyGraphError::NoNodes);
    }
    if is_connected(graph) {
        return Ok(Cow::Borrowed(graph));
    }
    let parts = components(graph);
    let members = parts.largest().unwrap_or_default();
    debug!(
        components = parts.count(),
        largest = members.len(),
        nodes = graph.node_count(),
        "normalising to largest component"
    );
    Ok(Cow::Owned(graph.induce(members)))
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::{fixture, rstest};

    use crate::{geometry::Point, graph::GraphBuilder};

    /// Two triangles (nodes 0-2 and 3-5) plus an isolated node 6.
    #[fixture]
    fn split_graph() -> Graph {
        let positions = (0..7)
            .map(|i| Point::new(f64::from(i), f64::from(i % 2)))
            .collect();
        let mut builder = GraphBuilder::new(positions);
        for (a, b) in [(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3)] {
            builder.add_edge(a, b).expect("valid edge");
        }
        builder.build()
    }

    #[rstest]
    fn components_are_ordered_by_first_node(split_graph: Graph) {
        let parts = components(&split_graph);
        assert_eq!(parts.count(), 3);
        assert_eq!(parts.sizes(), vec![3, 3, 1]);
        assert_eq!(
            parts.iter().collect::<Vec<_>>(),
            vec![&[0, 1, 2][..], &[3, 4, 5][..], &[6][..]]
        );
        assert_eq!(parts.component_of(4), Some(1));
        assert_eq!(parts.component_of(6), Some(2));
        assert_eq!(parts.component_of(7), None);
    }

    #[rstest]
    fn largest_prefers_earliest_on_ties(split_graph: Graph) {
        let parts = components(&split_graph);
        assert_eq!(parts.largest(), Some(&[0, 1, 2][..]));
        assert_eq!(parts.largest_size(), 3);
    }

    #[rstest]
    fn largest_component_extracts_induced_subgraph(split_graph: Graph) {
        let component = largest_component(&split_graph).expect("non-empty graph");
        assert_eq!(component.node_count(), 3);
        assert_eq!(component.edge_count(), 3);
        assert!(is_connected(&component));
        assert_eq!(split_graph.node_count(), 7, "input must be untouched");
    }

    #[rstest]
    fn largest_component_is_idempotent(split_graph: Graph) {
        let once = largest_component(&split_graph).expect("non-empty graph");
        let twice = largest_component(&once).expect("non-empty graph");
        assert_eq!(*once, *twice);
        assert!(matches!(twice, Cow::Borrowed(_)));
    }

    #[test]
    fn largest_component_rejects_empty_graph() {
        let graph = GraphBuilder::new(Vec::new()).build();
        assert_eq!(
            largest_component(&graph).expect_err("empty graph"),
            EmptyGraphError::NoNodes
        );
        assert!(!is_connected(&graph));
        assert_eq!(components(&graph).largest_size(), 0);
    }

    #[test]
    fn single_node_is_connected() {
        let graph = GraphBuilder::new(vec![Point::new(1.0, 1.0)]).build();
        assert!(is_connected(&graph));
        let component = largest_component(&graph).expect("one node");
        assert!(matches!(component, Cow::Borrowed(_)));
    }
}
