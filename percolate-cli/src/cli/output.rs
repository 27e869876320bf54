//! Table rendering for command outcomes.

use std::io::{self, Write};

use clap::ValueEnum;
use percolate_core::{RemovalComparison, SweepReport, TrialError, TrialResult};
use serde_json::json;

use super::commands::{Artifacts, CommandOutcome, DatasetSummary};

/// Format of the table printed on stdout.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, ValueEnum)]
pub enum TableFormat {
    /// Aligned columns for people.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Writes `outcome` to `writer` in `format`.
///
/// Text output ends with the written report paths; JSON output is limited to
/// one object per trial or dataset so it can be streamed into other tools.
///
/// # Errors
/// Returns [`io::Error`] if writing to `writer` or serializing a row fails.
///
/// # Examples
/// ```
/// use percolate_cli::cli::{Artifacts, CommandOutcome, SweepSummary, TableFormat, render_outcome};
/// use percolate_core::run_sweep;
///
/// let report = run_sweep(1, &[0.0], (20, 20), 9)?;
/// let outcome = CommandOutcome::Sweep(SweepSummary { report, artifacts: Artifacts::default() });
/// let mut buffer = Vec::new();
/// render_outcome(&outcome, TableFormat::Json, &mut buffer)?;
/// let line = String::from_utf8(buffer)?;
/// assert!(line.contains("\"percolation_order_parameter\":1.0"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn render_outcome(
    outcome: &CommandOutcome,
    format: TableFormat,
    mut writer: impl Write,
) -> io::Result<()> {
    match (outcome, format) {
        (CommandOutcome::Sweep(summary), TableFormat::Text) => {
            write_sweep_text(&summary.report, &mut writer)?;
            write_artifacts(&summary.artifacts, &mut writer)
        }
        (CommandOutcome::Sweep(summary), TableFormat::Json) => {
            write_sweep_json(&summary.report, &mut writer)
        }
        (CommandOutcome::Empirical(summary), TableFormat::Text) => {
            for dataset in &summary.datasets {
                write_dataset_text(dataset, &mut writer)?;
            }
            write_artifacts(&summary.artifacts, &mut writer)
        }
        (CommandOutcome::Empirical(summary), TableFormat::Json) => {
            for dataset in &summary.datasets {
                serde_json::to_writer(&mut writer, &dataset_json(dataset))?;
                writeln!(writer)?;
            }
            Ok(())
        }
    }
}

fn write_sweep_text(report: &SweepReport, writer: &mut impl Write) -> io::Result<()> {
    writeln!(
        writer,
        "{:>9} {:>7} {:>6} {:>6} {:>12} {:>14} {:>12} {:>8}",
        "iteration", "p", "nodes", "edges", "resistance", "shortest_path", "edge_length", "order"
    )?;
    for outcome in report.outcomes() {
        match outcome {
            Ok(trial) => write_trial_row(trial, writer)?,
            Err(failure) => write_failure_row(failure, writer)?,
        }
    }
    writeln!(
        writer,
        "trials: {}, succeeded: {}, failed: {}",
        report.len(),
        report.success_count(),
        report.failure_count()
    )
}

fn write_trial_row(trial: &TrialResult, writer: &mut impl Write) -> io::Result<()> {
    writeln!(
        writer,
        "{:>9} {:>7.4} {:>6} {:>6} {:>12.4} {:>14.4} {:>12.4} {:>8.4}",
        trial.iteration,
        trial.p,
        trial.component_nodes,
        trial.component_edges,
        trial.total_effective_resistance,
        trial.average_shortest_path,
        trial.average_edge_length,
        trial.percolation_order_parameter,
    )
}

fn write_failure_row(failure: &TrialError, writer: &mut impl Write) -> io::Result<()> {
    writeln!(
        writer,
        "{:>9} {:>7.4} failed [{}] {} (seed {})",
        failure.iteration,
        failure.p,
        failure.error.detail_code(),
        failure.error,
        failure.seed,
    )
}

fn write_sweep_json(report: &SweepReport, writer: &mut impl Write) -> io::Result<()> {
    for outcome in report.outcomes() {
        match outcome {
            Ok(trial) => serde_json::to_writer(&mut *writer, trial)?,
            Err(failure) => serde_json::to_writer(
                &mut *writer,
                &json!({
                    "iteration": failure.iteration,
                    "p_index": failure.p_index,
                    "p": failure.p,
                    "seed": failure.seed,
                    "code": failure.error.detail_code(),
                    "error": failure.error.to_string(),
                }),
            )?,
        }
        writeln!(writer)?;
    }
    Ok(())
}

fn write_dataset_text(dataset: &DatasetSummary, writer: &mut impl Write) -> io::Result<()> {
    let metrics = &dataset.metrics;
    writeln!(writer, "dataset: {}", dataset.name)?;
    writeln!(
        writer,
        "  rows: {} (skipped self-loops: {}, non-finite: {})",
        dataset.rows, dataset.skipped_self_loops, dataset.skipped_non_finite
    )?;
    writeln!(writer, "  nodes: {}", metrics.node_count)?;
    writeln!(writer, "  edges: {}", metrics.edge_count)?;
    writeln!(writer, "  average shortest path: {}", metrics.average_shortest_path)?;
    writeln!(writer, "  average edge length: {}", metrics.average_edge_length)?;
    writeln!(
        writer,
        "  total effective resistance: {}",
        metrics.total_effective_resistance
    )?;
    let Some(comparison) = &dataset.comparison else {
        return writeln!(writer, "  percolation threshold: n/a (component not triangulable)");
    };
    writeln!(
        writer,
        "  edges before/after removal: {} / {}",
        comparison.edges_before, comparison.edges_after
    )?;
    writeln!(
        writer,
        "  components before/after removal: {} / {}",
        comparison.components_before, comparison.components_after
    )?;
    writeln!(
        writer,
        "  percolation threshold: {}",
        comparison.largest_ratio()
    )
}

fn dataset_json(dataset: &DatasetSummary) -> serde_json::Value {
    json!({
        "name": dataset.name,
        "rows": dataset.rows,
        "skipped_self_loops": dataset.skipped_self_loops,
        "skipped_non_finite": dataset.skipped_non_finite,
        "metrics": dataset.metrics,
        "comparison": dataset.comparison,
        "percolation_threshold": dataset.comparison.as_ref().map(RemovalComparison::largest_ratio),
    })
}

fn write_artifacts(artifacts: &Artifacts, writer: &mut impl Write) -> io::Result<()> {
    if let Some(document) = &artifacts.document {
        writeln!(writer, "report: {}", document.display())?;
    }
    if !artifacts.figures.is_empty() {
        writeln!(writer, "figures: {}", artifacts.figures.len())?;
    }
    Ok(())
}
