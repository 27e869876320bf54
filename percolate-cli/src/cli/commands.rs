//! Command implementations and argument parsing for the percolate CLI.

use std::{
    collections::HashSet,
    fs, io,
    path::{Path, PathBuf},
};

use clap::{Args, Parser, Subcommand, ValueEnum};
use percolate_core::{
    AnalysisError, CoordinateSource, DEFAULT_ITERATIONS, DEFAULT_MAX_NODES, DEFAULT_MIN_NODES,
    DEFAULT_SCALE, DataSourceError, ExecutionStrategy, FailurePolicy, Graph, GraphMetrics, Layout,
    Node, PlotRenderer, Point, RemovalComparison, ReportEntry, ReportSink, Sweep, SweepBuilder,
    SweepError, SweepReport, TrialError, compare_removal, largest_component, linspace,
    remove_random_edges, trial_seed, triangulate,
};
use percolate_providers_tabular::{CoordinateTable, TabularError};
use rand::{Rng, SeedableRng, rngs::SmallRng};
use thiserror::Error;
use tracing::{Span, field, info, instrument, warn};

use super::output::TableFormat;
use crate::{
    markdown::{MarkdownReport, ReportError},
    plot::{RenderError, SvgGraphRenderer, render_sweep_chart},
};

const DEFAULT_P_START: f64 = 0.5;
const DEFAULT_P_END: f64 = 0.9;
const DEFAULT_P_STEPS: usize = 10;
const DEFAULT_REMOVAL_PROBABILITY: f64 = 0.9;
const REPORT_FILE: &str = "report.md";
const CHART_FILE: &str = "metrics.svg";

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "percolate",
    about = "Measure spatial proximity graphs and their robustness to random edge removal."
)]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Sweep removal probabilities over random Delaunay graphs.
    Sweep(SweepCommand),
    /// Analyse graphs digitized as `(x1, y1, x2, y2)` tables.
    Empirical(EmpiricalCommand),
}

/// Options accepted by the `sweep` command.
#[derive(Debug, Args, Clone)]
pub struct SweepCommand {
    /// Independent repetitions of the whole probability list.
    #[arg(long, default_value_t = DEFAULT_ITERATIONS)]
    pub iterations: usize,

    /// Explicit comma-separated removal probabilities; replaces the range.
    #[arg(long = "p-values", value_delimiter = ',')]
    pub p_values: Vec<f64>,

    /// First probability of the evenly spaced range.
    #[arg(long, default_value_t = DEFAULT_P_START)]
    pub p_start: f64,

    /// Last probability of the evenly spaced range.
    #[arg(long, default_value_t = DEFAULT_P_END)]
    pub p_end: f64,

    /// Number of probabilities in the range.
    #[arg(long, default_value_t = DEFAULT_P_STEPS)]
    pub p_steps: usize,

    /// Smallest number of sampled points per trial.
    #[arg(long, default_value_t = DEFAULT_MIN_NODES)]
    pub min_nodes: usize,

    /// Largest number of sampled points per trial.
    #[arg(long, default_value_t = DEFAULT_MAX_NODES)]
    pub max_nodes: usize,

    /// Side length of the sampling square.
    #[arg(long, default_value_t = DEFAULT_SCALE)]
    pub scale: f64,

    /// Base seed every trial seed is derived from.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// How trials are scheduled.
    #[arg(long, value_enum, default_value_t = StrategyArg::Auto)]
    pub strategy: StrategyArg,

    /// Abort on the first failed trial instead of recording it.
    #[arg(long)]
    pub fail_fast: bool,

    /// Report and table options.
    #[command(flatten)]
    pub output: OutputArgs,
}

impl SweepCommand {
    /// Explicit probabilities when given, otherwise the evenly spaced range.
    #[must_use]
    pub fn probabilities(&self) -> Vec<f64> {
        if self.p_values.is_empty() {
            linspace(self.p_start, self.p_end, self.p_steps)
        } else {
            self.p_values.clone()
        }
    }
}

/// Options accepted by the `empirical` command.
#[derive(Debug, Args, Clone)]
pub struct EmpiricalCommand {
    /// Coordinate tables: `.parquet` files or delimited text.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Override name for the dataset (single input only; defaults to the file stem).
    #[arg(long)]
    pub name: Option<String>,

    /// Probability of removing each edge of the re-triangulated graph.
    #[arg(long = "removal-p", default_value_t = DEFAULT_REMOVAL_PROBABILITY)]
    pub removal_p: f64,

    /// Base seed for the edge removal of every dataset.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Report and table options.
    #[command(flatten)]
    pub output: OutputArgs,
}

/// Output options shared by every command.
#[derive(Debug, Args, Clone, Default)]
pub struct OutputArgs {
    /// Directory receiving the Markdown report and SVG figures.
    #[arg(long = "output-dir")]
    pub output_dir: Option<PathBuf>,

    /// Format of the table printed on stdout.
    #[arg(long, value_enum, default_value_t = TableFormat::Text)]
    pub format: TableFormat,
}

/// Trial scheduling choices.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, ValueEnum)]
pub enum StrategyArg {
    /// Parallel when available, otherwise sequential.
    #[default]
    Auto,
    /// One trial at a time on the calling thread.
    Sequential,
    /// Trials spread over the rayon pool.
    Parallel,
}

impl From<StrategyArg> for ExecutionStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Auto => Self::Auto,
            StrategyArg::Sequential => Self::Sequential,
            StrategyArg::Parallel => Self::Parallel,
        }
    }
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Sweep configuration or a fail-fast trial failed.
    #[error(transparent)]
    Sweep(#[from] SweepError),
    /// A coordinate table could not be loaded.
    #[error(transparent)]
    Tabular(#[from] TabularError),
    /// A loaded table could not be turned into a graph.
    #[error("dataset `{name}` could not be read: {source}")]
    DataSource {
        /// Dataset name.
        name: String,
        /// Underlying failure.
        #[source]
        source: DataSourceError,
    },
    /// A dataset's graph could not be measured.
    #[error("dataset `{name}` could not be analysed: {source}")]
    Analysis {
        /// Dataset name.
        name: String,
        /// Underlying failure.
        #[source]
        source: AnalysisError,
    },
    /// A reported trial could not be rebuilt for drawing.
    #[error("trial (iteration {iteration}, p index {p_index}) could not be rebuilt: {source}")]
    Replay {
        /// Iteration of the trial.
        iteration: usize,
        /// Probability index of the trial.
        p_index: usize,
        /// Underlying failure.
        #[source]
        source: AnalysisError,
    },
    /// `--name` was combined with several inputs.
    #[error("`--name` applies to a single input but {count} were given")]
    AmbiguousName {
        /// Number of inputs.
        count: usize,
    },
    /// The output directory could not be created.
    #[error("failed to create output directory `{path}`: {source}")]
    OutputDir {
        /// Requested directory.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// A figure could not be drawn.
    #[error(transparent)]
    Render(#[from] RenderError),
    /// The report document could not be written.
    #[error(transparent)]
    Report(#[from] ReportError),
}

impl CliError {
    /// Most specific stable code for the failure.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Sweep(SweepError::Trial(trial)) => trial.error.detail_code(),
            Self::Sweep(error) => error.code().as_str(),
            Self::Tabular(error) => error.code(),
            Self::DataSource { source, .. } => source.code().as_str(),
            Self::Analysis { source, .. } | Self::Replay { source, .. } => source.detail_code(),
            Self::AmbiguousName { .. } => "CLI_AMBIGUOUS_NAME",
            Self::OutputDir { .. } => "CLI_OUTPUT_DIR",
            Self::Render(_) => "CLI_RENDER",
            Self::Report(_) => "CLI_REPORT",
        }
    }
}

/// Files written next to the printed table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Artifacts {
    /// Markdown report, when an output directory was given.
    pub document: Option<PathBuf>,
    /// SVG figures in report order.
    pub figures: Vec<PathBuf>,
}

/// Outcome of the `sweep` command.
#[derive(Debug, Clone)]
pub struct SweepSummary {
    /// Every trial outcome in sweep order.
    pub report: SweepReport,
    /// Report files.
    pub artifacts: Artifacts,
}

/// Measurements of one empirical dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSummary {
    /// Dataset name.
    pub name: String,
    /// Rows in the table.
    pub rows: usize,
    /// Rows whose endpoints coincide.
    pub skipped_self_loops: usize,
    /// Rows with NaN or infinite values.
    pub skipped_non_finite: usize,
    /// Metrics of the largest component.
    pub metrics: GraphMetrics,
    /// Component structure of the re-triangulated graph before and after
    /// edge removal; `None` when the component cannot be triangulated.
    pub comparison: Option<RemovalComparison>,
}

/// Outcome of the `empirical` command.
#[derive(Debug, Clone)]
pub struct EmpiricalSummary {
    /// One entry per input, in argument order.
    pub datasets: Vec<DatasetSummary>,
    /// Report files.
    pub artifacts: Artifacts,
}

/// Outcome of any command.
#[derive(Debug, Clone)]
pub enum CommandOutcome {
    /// `sweep` finished.
    Sweep(SweepSummary),
    /// `empirical` finished.
    Empirical(EmpiricalSummary),
}

impl CommandOutcome {
    /// Number of recorded trial failures.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        match self {
            Self::Sweep(summary) => summary.report.failure_count(),
            Self::Empirical(_) => 0,
        }
    }

    /// Files written by the command.
    #[must_use]
    pub const fn artifacts(&self) -> &Artifacts {
        match self {
            Self::Sweep(summary) => &summary.artifacts,
            Self::Empirical(summary) => &summary.artifacts,
        }
    }
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when configuration, loading, analysis or report
/// writing fails. Failed sweep trials are recorded in the outcome unless
/// `--fail-fast` is set.
///
/// # Examples
/// ```
/// use clap::Parser;
/// use percolate_cli::cli::{Cli, CommandOutcome, run_cli};
///
/// let cli = Cli::parse_from([
///     "percolate", "sweep", "--iterations", "1", "--p-values", "0", "--min-nodes", "20",
///     "--max-nodes", "20", "--strategy", "sequential",
/// ]);
/// let CommandOutcome::Sweep(summary) = run_cli(cli)? else {
///     unreachable!("sweep command");
/// };
/// assert_eq!(summary.report.success_count(), 1);
/// assert!(summary.artifacts.document.is_none());
/// # Ok::<(), percolate_cli::cli::CliError>(())
/// ```
#[instrument(name = "cli.run", err, skip(cli), fields(command = field::Empty))]
pub fn run_cli(cli: Cli) -> Result<CommandOutcome, CliError> {
    let span = Span::current();
    match cli.command {
        Command::Sweep(command) => {
            span.record("command", field::display("sweep"));
            run_sweep_command(command).map(CommandOutcome::Sweep)
        }
        Command::Empirical(command) => {
            span.record("command", field::display("empirical"));
            run_empirical_command(command).map(CommandOutcome::Empirical)
        }
    }
}

#[instrument(
    name = "cli.sweep",
    err,
    skip(command),
    fields(
        iterations = command.iterations,
        p_values = field::Empty,
        strategy = ?command.strategy,
        fail_fast = command.fail_fast,
    ),
)]
pub(super) fn run_sweep_command(command: SweepCommand) -> Result<SweepSummary, CliError> {
    let p_values = command.probabilities();
    Span::current().record("p_values", p_values.len());
    let policy = if command.fail_fast {
        FailurePolicy::FailFast
    } else {
        FailurePolicy::BestEffort
    };
    let sweep = SweepBuilder::new()
        .with_iterations(command.iterations)
        .with_p_values(p_values)
        .with_node_range(command.min_nodes, command.max_nodes)
        .with_scale(command.scale)
        .with_seed(command.seed)
        .with_failure_policy(policy)
        .with_execution_strategy(command.strategy.into())
        .build()?;
    let report = sweep.run()?;
    let artifacts = match &command.output.output_dir {
        Some(dir) => write_sweep_artifacts(&sweep, &report, dir)?,
        None => Artifacts::default(),
    };
    info!(
        trials = report.len(),
        failed = report.failure_count(),
        figures = artifacts.figures.len(),
        "sweep command completed"
    );
    Ok(SweepSummary { report, artifacts })
}

fn write_sweep_artifacts(
    sweep: &Sweep,
    report: &SweepReport,
    dir: &Path,
) -> Result<Artifacts, CliError> {
    create_output_dir(dir)?;
    let renderer = SvgGraphRenderer::new(dir);
    let mut document = MarkdownReport::new(dir.join(REPORT_FILE), "Graph Analysis");
    let mut figures = Vec::new();
    for outcome in report.outcomes() {
        let entry = match outcome {
            Ok(trial) => {
                let entry = ReportEntry::for_trial(trial);
                match sweep.replay_trial(trial.iteration, trial.p_index) {
                    Some(replayed) => {
                        let graph = replayed.map_err(|source| CliError::Replay {
                            iteration: trial.iteration,
                            p_index: trial.p_index,
                            source,
                        })?;
                        let name = format!("i{}_p{}", trial.iteration, trial.p_index);
                        let image =
                            renderer.render(&name, &graph, &Layout::from_positions(&graph))?;
                        let entry = entry.with_image(&image);
                        figures.push(image);
                        entry
                    }
                    None => entry,
                }
            }
            Err(failure) => failure_entry(failure),
        };
        document.record(&entry)?;
    }
    if report.success_count() > 0 {
        let chart = render_sweep_chart(report, &dir.join(CHART_FILE))?;
        document.record(&ReportEntry::new("Metrics vs p").with_image(&chart))?;
        figures.push(chart);
    }
    Ok(Artifacts {
        document: Some(document.finish()?),
        figures,
    })
}

fn failure_entry(failure: &TrialError) -> ReportEntry {
    ReportEntry::new(format!(
        "Failed trial (iteration {}, p = {})",
        failure.iteration, failure.p
    ))
    .with_paragraph(format!("Error: {}", failure.error))
    .with_paragraph(format!("Code: {}", failure.error.detail_code()))
    .with_paragraph(format!("Seed: {}", failure.seed))
}

#[instrument(
    name = "cli.empirical",
    err,
    skip(command),
    fields(
        inputs = command.paths.len(),
        removal_p = command.removal_p,
        override_name = field::Empty,
    ),
)]
pub(super) fn run_empirical_command(
    command: EmpiricalCommand,
) -> Result<EmpiricalSummary, CliError> {
    let EmpiricalCommand {
        paths,
        name,
        removal_p,
        seed,
        output,
    } = command;
    Span::current().record(
        "override_name",
        field::display(name.as_deref().unwrap_or("<derived>")),
    );
    if name.is_some() && paths.len() > 1 {
        return Err(CliError::AmbiguousName { count: paths.len() });
    }

    let mut sink = match &output.output_dir {
        Some(dir) => {
            create_output_dir(dir)?;
            Some((
                SvgGraphRenderer::new(dir),
                MarkdownReport::new(dir.join(REPORT_FILE), "Empirical Graph Analysis"),
            ))
        }
        None => None,
    };
    let mut datasets = Vec::with_capacity(paths.len());
    let mut figures = Vec::new();
    let mut figure_paths = HashSet::new();
    for (index, path) in paths.iter().enumerate() {
        let table = load_table(path, name.as_deref())?;
        let mut rng = SmallRng::seed_from_u64(trial_seed(seed, index, 0));
        let AnalysedDataset { summary, component } = analyse_dataset(&table, removal_p, &mut rng)?;
        if let Some((renderer, document)) = sink.as_mut() {
            let figure = figure_name(renderer, &summary.name, index, &mut figure_paths);
            let image =
                renderer.render(&figure, &component, &Layout::from_positions(&component))?;
            let entry = ReportEntry::for_dataset(
                &summary.name,
                &summary.metrics,
                summary.comparison.as_ref(),
            )
            .with_image(&image);
            document.record(&entry)?;
            figures.push(image);
        }
        datasets.push(summary);
    }
    let document = sink
        .map(|(_, document)| document.finish())
        .transpose()?;
    info!(datasets = datasets.len(), "empirical command completed");
    Ok(EmpiricalSummary {
        datasets,
        artifacts: Artifacts { document, figures },
    })
}

/// Picks a figure name whose file is not yet used by an earlier dataset,
/// suffixing repeated names with the input index.
fn figure_name(
    renderer: &SvgGraphRenderer,
    name: &str,
    index: usize,
    used: &mut HashSet<PathBuf>,
) -> String {
    let mut candidate = name.to_owned();
    let mut suffix = index;
    while !used.insert(renderer.path_for(&candidate)) {
        candidate = format!("{name}_{suffix}");
        suffix += 1;
    }
    candidate
}

fn load_table(path: &Path, name: Option<&str>) -> Result<CoordinateTable, CliError> {
    let table = CoordinateTable::from_path(path)?;
    Ok(match name {
        Some(name) => table.with_name(name),
        None => table,
    })
}

struct AnalysedDataset {
    summary: DatasetSummary,
    component: Graph,
}

#[instrument(
    name = "cli.analyse_dataset",
    err,
    skip(table, rng),
    fields(name = table.name(), rows = table.len()),
)]
fn analyse_dataset<R: Rng + ?Sized>(
    table: &CoordinateTable,
    removal_p: f64,
    rng: &mut R,
) -> Result<AnalysedDataset, CliError> {
    let name = table.name().to_owned();
    let built = Graph::from_source(table).map_err(|source| CliError::DataSource {
        name: name.clone(),
        source,
    })?;
    let (component, metrics, comparison) =
        measure(&built.graph, removal_p, rng).map_err(|source| CliError::Analysis {
            name: name.clone(),
            source,
        })?;
    Ok(AnalysedDataset {
        summary: DatasetSummary {
            name,
            rows: table.len(),
            skipped_self_loops: built.skipped_self_loops,
            skipped_non_finite: built.skipped_non_finite,
            metrics,
            comparison,
        },
        component,
    })
}

/// Measures the largest component, then thins a Delaunay graph over the
/// same node positions and compares its components before and after.
/// Components that cannot be triangulated get no comparison.
fn measure<R: Rng + ?Sized>(
    graph: &Graph,
    removal_p: f64,
    rng: &mut R,
) -> Result<(Graph, GraphMetrics, Option<RemovalComparison>), AnalysisError> {
    let component = largest_component(graph)?.into_owned();
    let metrics = GraphMetrics::compute(&component)?;
    let positions: Vec<Point> = component.nodes().iter().map(Node::position).collect();
    let triangles = match triangulate(&positions) {
        Ok(triangles) => triangles,
        Err(error) => {
            warn!(
                code = error.code().as_str(),
                %error,
                "component cannot be triangulated; skipping edge removal comparison"
            );
            return Ok((component, metrics, None));
        }
    };
    let delaunay = Graph::from_triangulation(&positions, &triangles)?;
    let thinned = remove_random_edges(&delaunay, removal_p, rng)?;
    let comparison = compare_removal(&delaunay, &thinned)?;
    Ok((component, metrics, Some(comparison)))
}

fn create_output_dir(dir: &Path) -> Result<(), CliError> {
    fs::create_dir_all(dir).map_err(|source| CliError::OutputDir {
        path: dir.to_path_buf(),
        source,
    })
}
