//! Seeded synthetic Delaunay graphs.

use percolate_core::{DEFAULT_SCALE, Graph, generate_points, triangulate};
use rand::{SeedableRng, rngs::SmallRng};

use crate::error::BenchSetupError;

/// Configuration for [`delaunay_graph`].
#[derive(Clone, Debug)]
pub struct SyntheticConfig {
    /// Exact number of points drawn.
    pub point_count: usize,
    /// Side length of the sampling square.
    pub scale: f64,
    /// Seed for the point generator.
    pub seed: u64,
}

impl SyntheticConfig {
    /// Configuration over the default sampling square.
    #[must_use]
    pub const fn new(point_count: usize, seed: u64) -> Self {
        Self {
            point_count,
            scale: DEFAULT_SCALE,
            seed,
        }
    }
}

/// Draws `config.point_count` uniform points and returns their Delaunay
/// graph.
///
/// # Errors
/// Returns [`BenchSetupError`] when the points cannot be generated or
/// triangulated.
pub fn delaunay_graph(config: &SyntheticConfig) -> Result<Graph, BenchSetupError> {
    let mut rng = SmallRng::seed_from_u64(config.seed);
    let points = generate_points(config.point_count, config.point_count, config.scale, &mut rng)?;
    let triangles = triangulate(&points)?;
    Ok(Graph::from_triangulation(&points, &triangles)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    use percolate_core::is_connected;
    use rstest::rstest;

    #[rstest]
    #[case(10)]
    #[case(50)]
    fn graphs_are_connected_and_seeded(#[case] point_count: usize) -> Result<(), BenchSetupError> {
        let config = SyntheticConfig::new(point_count, 42);
        let graph = delaunay_graph(&config)?;
        assert_eq!(graph.node_count(), point_count);
        assert!(is_connected(&graph));
        assert_eq!(delaunay_graph(&config)?, graph);
        Ok(())
    }

    #[rstest]
    fn too_few_points_are_rejected() {
        let result = delaunay_graph(&SyntheticConfig::new(2, 1));
        assert!(matches!(result, Err(BenchSetupError::Geometry(_))));
    }
}
