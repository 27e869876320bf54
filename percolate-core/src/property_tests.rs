//! Property suites over random triangulated point sets.

use proptest::prelude::*;
use rand::{SeedableRng, rngs::SmallRng};

use crate::{
    connectivity::{is_connected, largest_component},
    geometry::{Point, triangulate},
    graph::Graph,
    metrics::{all_pairs_shortest_paths, average_shortest_path},
    percolation::{percolation_order_parameter, remove_random_edges},
    test_utils::{lattice_points, suite_proptest_config},
};

fn triangulated(points: &[Point]) -> Option<Graph> {
    let triangles = triangulate(points).ok()?;
    Graph::from_triangulation(points, &triangles).ok()
}

proptest! {
    #![proptest_config(suite_proptest_config(64))]

    #[test]
    fn edge_weights_are_euclidean(points in lattice_points(3, 40)) {
        let Some(graph) = triangulated(&points) else {
            return Err(TestCaseError::reject("points do not triangulate"));
        };
        for edge in graph.edges() {
            let a = points[edge.source()];
            let b = points[edge.target()];
            let expected = ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt();
            prop_assert!((edge.weight() - expected).abs() < 1e-9);
            prop_assert!(edge.source() < edge.target());
        }
    }

    #[test]
    fn largest_component_is_idempotent(
        points in lattice_points(3, 40),
        p in 0.0_f64..=1.0,
        seed in any::<u64>(),
    ) {
        let Some(graph) = triangulated(&points) else {
            return Err(TestCaseError::reject("points do not triangulate"));
        };
        let thinned = remove_random_edges(&graph, p, &mut SmallRng::seed_from_u64(seed))
            .map_err(|error| TestCaseError::fail(error.to_string()))?;
        let once = largest_component(&thinned)
            .map_err(|error| TestCaseError::fail(error.to_string()))?;
        prop_assert!(is_connected(&once));
        let twice = largest_component(&once)
            .map_err(|error| TestCaseError::fail(error.to_string()))?;
        prop_assert_eq!(&*once, &*twice);
    }

    #[test]
    fn removal_drops_exact_budget_of_existing_edges(
        points in lattice_points(3, 40),
        p in 0.0_f64..=1.0,
        seed in any::<u64>(),
    ) {
        let Some(graph) = triangulated(&points) else {
            return Err(TestCaseError::reject("points do not triangulate"));
        };
        let before = graph.clone();
        let thinned = remove_random_edges(&graph, p, &mut SmallRng::seed_from_u64(seed))
            .map_err(|error| TestCaseError::fail(error.to_string()))?;
        let budget = (p * graph.edge_count() as f64).floor() as usize;
        prop_assert_eq!(thinned.edge_count(), graph.edge_count() - budget);
        prop_assert_eq!(thinned.node_count(), graph.node_count());
        for edge in thinned.edges() {
            prop_assert!(graph.contains_edge(edge.source(), edge.target()));
        }
        prop_assert_eq!(graph, before);
    }

    #[test]
    fn order_parameter_lies_in_unit_interval(
        points in lattice_points(3, 40),
        p in 0.0_f64..=1.0,
        seed in any::<u64>(),
    ) {
        let Some(graph) = triangulated(&points) else {
            return Err(TestCaseError::reject("points do not triangulate"));
        };
        let thinned = remove_random_edges(&graph, p, &mut SmallRng::seed_from_u64(seed))
            .map_err(|error| TestCaseError::fail(error.to_string()))?;
        let order = percolation_order_parameter(&thinned)
            .map_err(|error| TestCaseError::fail(error.to_string()))?;
        prop_assert!(order > 0.0 && order <= 1.0);
        prop_assert!(order * thinned.node_count() as f64 >= 1.0 - 1e-9);
    }

    #[test]
    fn average_shortest_path_is_at_least_min_edge_weight(points in lattice_points(3, 30)) {
        let Some(graph) = triangulated(&points) else {
            return Err(TestCaseError::reject("points do not triangulate"));
        };
        let component = largest_component(&graph)
            .map_err(|error| TestCaseError::fail(error.to_string()))?;
        let matrix = all_pairs_shortest_paths(&component)
            .map_err(|error| TestCaseError::fail(error.to_string()))?;
        let asp = average_shortest_path(&matrix)
            .map_err(|error| TestCaseError::fail(error.to_string()))?;
        let min = component.min_edge_weight();
        prop_assert!(min.is_some_and(|min| asp >= min - 1e-9));
    }
}
