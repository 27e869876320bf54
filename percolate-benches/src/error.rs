//! Benchmark setup error type.
//!
//! Lets setup functions propagate failures with `?` instead of panicking
//! inside Criterion closures.

use percolate_core::{AnalysisError, GeometryError, GraphError, SweepError};

/// Errors that may occur during benchmark setup.
#[derive(Debug, thiserror::Error)]
pub enum BenchSetupError {
    /// Point generation or triangulation failed.
    #[error("synthetic geometry failed: {0}")]
    Geometry(#[from] GeometryError),
    /// The triangulation could not be turned into a graph.
    #[error("graph construction failed: {0}")]
    Graph(#[from] GraphError),
    /// Measuring the prepared graph failed.
    #[error("analysis failed: {0}")]
    Analysis(#[from] AnalysisError),
    /// The sweep configuration was rejected.
    #[error("sweep setup failed: {0}")]
    Sweep(#[from] SweepError),
}
