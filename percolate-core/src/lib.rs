//! Percolate core library.
//!
//! Builds weighted proximity graphs from point sets (Delaunay
//! triangulations) or digitized coordinate pairs, measures them through
//! all-pairs shortest paths, and studies their robustness under random edge
//! removal across seeded Monte-Carlo sweeps.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod connectivity;
mod datasource;
mod error;
mod geometry;
mod graph;
mod metrics;
mod percolation;
mod report;
mod sweep;

#[cfg(test)]
mod property_tests;
#[cfg(test)]
mod test_utils;

pub use crate::{
    connectivity::{Components, components, is_connected, largest_component},
    datasource::{CoordinatePair, CoordinateSource},
    error::{
        AnalysisError, AnalysisErrorCode, DataSourceError, DataSourceErrorCode,
        DegenerateDistanceError, EmptyGraphError, EmptyGraphErrorCode, GeometryError,
        GeometryErrorCode, GraphError, GraphErrorCode, Result, SweepError, SweepErrorCode,
        TrialError,
    },
    geometry::{DEFAULT_SCALE, Point, PointSampler, UniformPoints, generate_points, triangulate},
    graph::{CoordinateGraph, Edge, Graph, GraphBuilder, Node},
    metrics::{
        GraphMetrics, ShortestPathMatrix, all_pairs_shortest_paths, average_edge_length,
        average_shortest_path, total_effective_resistance,
    },
    percolation::{
        CurvePoint, RemovalComparison, compare_removal, percolation_curve,
        percolation_order_parameter, remove_random_edges,
    },
    report::{Bounds, Layout, PlotRenderer, ReportEntry, ReportSink},
    sweep::{
        DEFAULT_ITERATIONS, DEFAULT_MAX_NODES, DEFAULT_MIN_NODES, ExecutionStrategy,
        FailurePolicy, Sweep, SweepBuilder, SweepReport, TrialResult, linspace, run_sweep,
        trial_seed,
    },
};
