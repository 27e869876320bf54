//! Command-line interface orchestration for percolation analyses.
//!
//! `sweep` runs the seeded Monte-Carlo study on random Delaunay graphs;
//! `empirical` measures graphs digitized as coordinate-pair tables and
//! compares them with a thinned Delaunay graph over the same nodes.

mod commands;
mod output;

pub use commands::{
    Artifacts, Cli, CliError, Command, CommandOutcome, DatasetSummary, EmpiricalCommand,
    EmpiricalSummary, OutputArgs, StrategyArg, SweepCommand, SweepSummary, run_cli,
};
pub use output::{TableFormat, render_outcome};
