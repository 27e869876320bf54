//! End-to-end scenarios for graph construction, metrics and percolation.

mod common;

use std::num::NonZeroUsize;

use common::{Rows, unit_square};
use percolate_core::{
    AnalysisError, CoordinatePair, DataSourceError, EmptyGraphError, Graph, GraphMetrics,
    compare_removal, components, largest_component, percolation_curve,
    percolation_order_parameter, remove_random_edges, triangulate,
};
use rand::{SeedableRng, rngs::SmallRng};
use rstest::{fixture, rstest};

#[fixture]
fn square_graph() -> Graph {
    let points = unit_square();
    let triangles = triangulate(&points).expect("square triangulates");
    Graph::from_triangulation(&points, &triangles).expect("valid triangles")
}

/// A 6×6 jittered lattice, triangulated.
#[fixture]
fn lattice() -> Graph {
    let points: Vec<_> = (0..36)
        .map(|i| {
            let (row, col) = (i / 6, i % 6);
            let jitter = f64::from((i * 7) % 5) * 0.01;
            percolate_core::Point::new(f64::from(col) + jitter, f64::from(row) - jitter)
        })
        .collect();
    let triangles = triangulate(&points).expect("lattice triangulates");
    Graph::from_triangulation(&points, &triangles).expect("valid triangles")
}

#[rstest]
fn unit_square_has_two_triangles_and_five_edges(square_graph: Graph) {
    assert_eq!(square_graph.node_count(), 4);
    assert_eq!(square_graph.edge_count(), 5);
    let metrics = GraphMetrics::compute(&square_graph).expect("connected square");
    assert!((metrics.average_edge_length - 1.0828).abs() < 1e-4);
}

#[rstest]
fn removing_nothing_keeps_the_graph(lattice: Graph) {
    let thinned =
        remove_random_edges(&lattice, 0.0, &mut SmallRng::seed_from_u64(8)).expect("valid p");
    assert_eq!(thinned.edges(), lattice.edges());
    assert_eq!(percolation_order_parameter(&thinned), Ok(1.0));
}

#[rstest]
fn removing_everything_isolates_every_node(lattice: Graph) {
    let thinned =
        remove_random_edges(&lattice, 1.0, &mut SmallRng::seed_from_u64(8)).expect("valid p");
    assert_eq!(thinned.edge_count(), 0);
    let order = percolation_order_parameter(&thinned).expect("nodes remain");
    assert!((order - 1.0 / 36.0).abs() < 1e-12);
    assert_eq!(
        GraphMetrics::compute(&thinned),
        Err(AnalysisError::EmptyGraph(EmptyGraphError::NoNodePairs {
            nodes: 1
        }))
    );
}

#[rstest]
fn order_parameter_falls_as_removal_grows(lattice: Graph) {
    let samples = NonZeroUsize::new(40).expect("non-zero");
    let curve = percolation_curve(
        &lattice,
        &[0.0, 0.25, 0.5, 0.75, 1.0],
        samples,
        &mut SmallRng::seed_from_u64(2024),
    )
    .expect("valid probabilities");
    for pair in curve.windows(2) {
        assert!(
            pair[1].mean <= pair[0].mean + 1e-9,
            "mean order parameter rose from p = {} to p = {}",
            pair[0].p,
            pair[1].p
        );
    }
}

#[rstest]
fn largest_component_is_idempotent_after_removal(lattice: Graph) {
    let thinned =
        remove_random_edges(&lattice, 0.6, &mut SmallRng::seed_from_u64(5)).expect("valid p");
    let once = largest_component(&thinned).expect("non-empty");
    let twice = largest_component(&once).expect("non-empty");
    assert_eq!(*once, *twice);
    assert_eq!(components(&once).count(), 1);
}

#[rstest]
fn removal_comparison_tracks_component_growth(lattice: Graph) {
    let thinned =
        remove_random_edges(&lattice, 0.9, &mut SmallRng::seed_from_u64(1)).expect("valid p");
    let comparison = compare_removal(&lattice, &thinned).expect("non-empty graphs");
    assert_eq!(comparison.edges_before, lattice.edge_count());
    assert_eq!(comparison.edges_after, thinned.edge_count());
    assert_eq!(comparison.components_before, 1);
    assert!(comparison.components_after > 1);
    assert!(comparison.largest_ratio() < 1.0);
}

#[test]
fn empirical_rows_build_a_graph_through_the_source_trait() {
    let rows = Rows::new(vec![
        CoordinatePair::new(0.0, 0.0, 3.0, 4.0),
        CoordinatePair::new(3.0, 4.0, 6.0, 0.0),
        CoordinatePair::new(6.0, 0.0, 0.0, 0.0),
        CoordinatePair::new(10.0, 10.0, 10.0, 10.0),
        CoordinatePair::new(20.0, 20.0, 21.0, 20.0),
    ]);
    let built = Graph::from_source(&rows).expect("rows are readable");
    assert_eq!(built.skipped_self_loops, 1);
    assert_eq!(built.graph.node_count(), 5);
    assert_eq!(built.graph.edge_count(), 4);

    let metrics = GraphMetrics::compute(&built.graph).expect("main component");
    assert_eq!(metrics.node_count, 3);
    assert!((metrics.average_edge_length - 16.0 / 3.0).abs() < 1e-12);
}

#[test]
fn empty_source_is_rejected() {
    let rows = Rows::new(Vec::new());
    assert_eq!(
        Graph::from_source(&rows).expect_err("no rows"),
        DataSourceError::EmptyData
    );
}
