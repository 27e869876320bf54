//! Error types for the percolate core library.
//!
//! Every fallible stage of the pipeline has its own error enum. The
//! [`AnalysisError`] umbrella covers a single analysis step, [`TrialError`]
//! pins such a failure to its place in a sweep, and [`SweepError`] covers sweep
//! configuration and fail-fast aborts. Each enum carries a stable
//! machine-readable code for logs.

use std::fmt;

use thiserror::Error;

use crate::sweep::ExecutionStrategy;

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident
                    $( { $($fields:tt)* } )?
                    $( ( $($tuple:tt)* ) )?
                    => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(
                        Self::$ErrVariant $( { $($fields)* } )? $( ( $($tuple)* ) )?
                            => $CodeTy::$CodeVariant,
                    )+
                }
            }
        }
    };
}

/// Degenerate or insufficient point input.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GeometryError {
    /// A triangulation needs at least three points.
    #[error("triangulation needs at least 3 points (got {count})")]
    TooFewPoints {
        /// Number of points supplied.
        count: usize,
    },
    /// All points lie on one line, so no triangle exists.
    #[error("all {count} points are collinear; no triangle can be formed")]
    Collinear {
        /// Number of points supplied.
        count: usize,
    },
    /// A coordinate could not be inserted into the triangulation.
    #[error("point {index} at ({x}, {y}) cannot be triangulated")]
    InvalidCoordinate {
        /// Position of the point in the input slice.
        index: usize,
        /// Horizontal coordinate.
        x: f64,
        /// Vertical coordinate.
        y: f64,
    },
    /// The node count range is empty.
    #[error("node count range is empty: min {min} exceeds max {max}")]
    InvalidNodeRange {
        /// Lower bound supplied by the caller.
        min: usize,
        /// Upper bound supplied by the caller.
        max: usize,
    },
    /// The sampling square has no area.
    #[error("scale must be finite and positive (got {scale})")]
    InvalidScale {
        /// Side length supplied by the caller.
        scale: f64,
    },
}

define_error_codes! {
    /// Stable codes describing [`GeometryError`] variants.
    enum GeometryErrorCode for GeometryError {
        /// A triangulation needs at least three points.
        TooFewPoints => TooFewPoints { .. } => "GEOMETRY_TOO_FEW_POINTS",
        /// All points lie on one line.
        Collinear => Collinear { .. } => "GEOMETRY_COLLINEAR",
        /// A coordinate could not be triangulated.
        InvalidCoordinate => InvalidCoordinate { .. } => "GEOMETRY_INVALID_COORDINATE",
        /// The node count range is empty.
        InvalidNodeRange => InvalidNodeRange { .. } => "GEOMETRY_INVALID_NODE_RANGE",
        /// The sampling square has no area.
        InvalidScale => InvalidScale { .. } => "GEOMETRY_INVALID_SCALE",
    }
}

/// A graph lacked the nodes or edges an operation requires.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum EmptyGraphError {
    /// The graph has no nodes.
    #[error("graph has no nodes")]
    NoNodes,
    /// The graph has no edges.
    #[error("graph has no edges")]
    NoEdges,
    /// Fewer than two nodes, so no node pair exists.
    #[error("graph has {nodes} node(s); at least 2 are needed to form a pair")]
    NoNodePairs {
        /// Number of nodes in the graph.
        nodes: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`EmptyGraphError`] variants.
    enum EmptyGraphErrorCode for EmptyGraphError {
        /// The graph has no nodes.
        NoNodes => NoNodes => "EMPTY_GRAPH_NO_NODES",
        /// The graph has no edges.
        NoEdges => NoEdges => "EMPTY_GRAPH_NO_EDGES",
        /// Fewer than two nodes.
        NoNodePairs => NoNodePairs { .. } => "EMPTY_GRAPH_NO_NODE_PAIRS",
    }
}

/// Two distinct nodes are at shortest-path distance zero.
///
/// This only happens when the input contains coincident nodes joined by a
/// zero-length edge.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
#[error("nodes {left} and {right} are at distance zero; the input has coincident points")]
pub struct DegenerateDistanceError {
    /// Smaller node index of the pair.
    pub left: usize,
    /// Larger node index of the pair.
    pub right: usize,
}

/// Invalid edge insertion into a [`crate::GraphBuilder`].
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GraphError {
    /// An edge referenced a node that does not exist.
    #[error("edge references node {node}, but node_count is {node_count}")]
    NodeOutOfBounds {
        /// The invalid node index.
        node: usize,
        /// Number of nodes in the graph.
        node_count: usize,
    },
    /// An edge joined a node to itself.
    #[error("self-loop on node {node} is not allowed")]
    SelfLoop {
        /// The node the loop was attached to.
        node: usize,
    },
    /// An edge weight was negative or not finite.
    #[error("edge ({left}, {right}) has invalid weight {weight}")]
    InvalidWeight {
        /// First endpoint.
        left: usize,
        /// Second endpoint.
        right: usize,
        /// The rejected weight.
        weight: f64,
    },
}

define_error_codes! {
    /// Stable codes describing [`GraphError`] variants.
    enum GraphErrorCode for GraphError {
        /// An edge referenced a node that does not exist.
        NodeOutOfBounds => NodeOutOfBounds { .. } => "GRAPH_NODE_OUT_OF_BOUNDS",
        /// An edge joined a node to itself.
        SelfLoop => SelfLoop { .. } => "GRAPH_SELF_LOOP",
        /// An edge weight was negative or not finite.
        InvalidWeight => InvalidWeight { .. } => "GRAPH_INVALID_WEIGHT",
    }
}

/// Failure of a single analysis step: triangulation, graph construction,
/// normalization, metric computation or edge removal.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum AnalysisError {
    /// Point input could not be triangulated.
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    /// The graph could not be constructed.
    #[error(transparent)]
    Graph(#[from] GraphError),
    /// The graph lacked required nodes or edges.
    #[error(transparent)]
    EmptyGraph(#[from] EmptyGraphError),
    /// Two distinct nodes are at distance zero.
    #[error(transparent)]
    DegenerateDistance(#[from] DegenerateDistanceError),
    /// Shortest paths were requested over a disconnected graph.
    #[error("graph has {components} connected components; shortest paths need a connected graph")]
    Disconnected {
        /// Number of connected components found.
        components: usize,
    },
    /// The removal probability was outside `[0, 1]`.
    #[error("removal probability must lie in [0, 1] (got {p})")]
    InvalidProbability {
        /// The rejected probability.
        p: f64,
    },
}

define_error_codes! {
    /// Stable codes describing [`AnalysisError`] variants.
    enum AnalysisErrorCode for AnalysisError {
        /// Point input could not be triangulated.
        Geometry => Geometry(..) => "ANALYSIS_GEOMETRY",
        /// The graph could not be constructed.
        Graph => Graph(..) => "ANALYSIS_GRAPH",
        /// The graph lacked required nodes or edges.
        EmptyGraph => EmptyGraph(..) => "ANALYSIS_EMPTY_GRAPH",
        /// Two distinct nodes are at distance zero.
        DegenerateDistance => DegenerateDistance(..) => "ANALYSIS_DEGENERATE_DISTANCE",
        /// Shortest paths were requested over a disconnected graph.
        Disconnected => Disconnected { .. } => "ANALYSIS_DISCONNECTED",
        /// The removal probability was outside `[0, 1]`.
        InvalidProbability => InvalidProbability { .. } => "ANALYSIS_INVALID_PROBABILITY",
    }
}

impl AnalysisError {
    /// Returns the most specific code available: the wrapped error's code for
    /// wrapping variants, otherwise this error's own code.
    #[must_use]
    pub const fn detail_code(&self) -> &'static str {
        match self {
            Self::Geometry(error) => error.code().as_str(),
            Self::Graph(error) => error.code().as_str(),
            Self::EmptyGraph(error) => error.code().as_str(),
            Self::DegenerateDistance(_) => "DEGENERATE_DISTANCE",
            Self::Disconnected { .. } | Self::InvalidProbability { .. } => self.code().as_str(),
        }
    }
}

/// A single sweep trial failed.
///
/// Carries the iteration, the removal probability and the trial seed so the
/// failure can be reproduced in isolation.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("trial failed at iteration {iteration}, p = {p} (seed {seed}): {error}")]
pub struct TrialError {
    /// Zero-based iteration index.
    pub iteration: usize,
    /// Position of `p` in the sweep's probability list.
    pub p_index: usize,
    /// Removal probability of the failed trial.
    pub p: f64,
    /// Seed of the trial's random source.
    pub seed: u64,
    /// The underlying analysis failure.
    #[source]
    pub error: AnalysisError,
}

/// Error returned when configuring or running a sweep.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SweepError {
    /// A sweep needs at least one iteration.
    #[error("iterations must be at least 1 (got {got})")]
    InvalidIterations {
        /// The rejected iteration count.
        got: usize,
    },
    /// A sweep needs at least one removal probability.
    #[error("at least one removal probability is required")]
    EmptyProbabilities,
    /// A removal probability was outside `[0, 1]`.
    #[error("removal probability #{index} must lie in [0, 1] (got {p})")]
    InvalidProbability {
        /// Position of the probability in the list.
        index: usize,
        /// The rejected probability.
        p: f64,
    },
    /// The point sampling configuration is invalid.
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    /// The requested execution strategy is not compiled into this build.
    #[error("the requested execution strategy {requested:?} is not available in this build")]
    BackendUnavailable {
        /// Strategy that could not be satisfied.
        requested: ExecutionStrategy,
    },
    /// A trial failed under the fail-fast policy.
    #[error(transparent)]
    Trial(#[from] TrialError),
}

define_error_codes! {
    /// Stable codes describing [`SweepError`] variants.
    enum SweepErrorCode for SweepError {
        /// A sweep needs at least one iteration.
        InvalidIterations => InvalidIterations { .. } => "SWEEP_INVALID_ITERATIONS",
        /// A sweep needs at least one removal probability.
        EmptyProbabilities => EmptyProbabilities => "SWEEP_EMPTY_PROBABILITIES",
        /// A removal probability was outside `[0, 1]`.
        InvalidProbability => InvalidProbability { .. } => "SWEEP_INVALID_PROBABILITY",
        /// The point sampling configuration is invalid.
        Geometry => Geometry(..) => "SWEEP_GEOMETRY",
        /// The requested execution strategy is unavailable.
        BackendUnavailable => BackendUnavailable { .. } => "SWEEP_BACKEND_UNAVAILABLE",
        /// A trial failed under the fail-fast policy.
        TrialFailure => Trial(..) => "SWEEP_TRIAL_FAILURE",
    }
}

impl SweepError {
    /// Retrieve the inner [`AnalysisErrorCode`] when a trial failed.
    #[must_use]
    pub const fn trial_code(&self) -> Option<AnalysisErrorCode> {
        match self {
            Self::Trial(trial) => Some(trial.error.code()),
            _ => None,
        }
    }
}

/// An error produced by [`crate::CoordinateSource`] implementations.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum DataSourceError {
    /// Requested row was outside the source's bounds.
    #[error("row {index} is out of bounds")]
    OutOfBounds {
        /// The requested row.
        index: usize,
    },
    /// A row contained a NaN or infinite coordinate.
    #[error("row {row} contains a non-finite coordinate")]
    NonFiniteCoordinate {
        /// The offending row.
        row: usize,
    },
    /// The source contained no rows.
    #[error("data source contains no rows")]
    EmptyData,
}

define_error_codes! {
    /// Stable codes describing [`DataSourceError`] variants.
    enum DataSourceErrorCode for DataSourceError {
        /// Requested row was outside the source's bounds.
        OutOfBounds => OutOfBounds { .. } => "DATA_SOURCE_OUT_OF_BOUNDS",
        /// A row contained a NaN or infinite coordinate.
        NonFiniteCoordinate => NonFiniteCoordinate { .. } => "DATA_SOURCE_NON_FINITE_COORDINATE",
        /// The source contained no rows.
        EmptyData => EmptyData => "DATA_SOURCE_EMPTY",
    }
}

/// Convenient alias for results of single analysis steps.
pub type Result<T> = core::result::Result<T, AnalysisError>;
