//! SVG figures: graph drawings and metrics-vs-p charts.

use std::{
    collections::BTreeSet,
    io,
    ops::Range,
    path::{Path, PathBuf},
};

use percolate_core::{Bounds, Graph, Layout, PlotRenderer, SweepReport, TrialResult};
use plotters::{coord::Shift, drawing::DrawingAreaErrorKind, prelude::*};
use thiserror::Error;
use tracing::{debug, instrument};

type DrawResult = Result<(), DrawingAreaErrorKind<io::Error>>;

const GRAPH_SIZE: (u32, u32) = (800, 800);
const CHART_SIZE: (u32, u32) = (1200, 1000);
const PADDING: f64 = 0.05;

/// Errors raised while producing figures.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The graph has no nodes to place.
    #[error("graph `{name}` has no nodes to draw")]
    EmptyLayout {
        /// Name of the graph.
        name: String,
    },
    /// The sweep has no successful trials to chart.
    #[error("sweep report has no successful trials to chart")]
    NoResults,
    /// The drawing backend failed.
    #[error("failed to draw `{path}`: {message}")]
    Drawing {
        /// Destination of the figure.
        path: PathBuf,
        /// Backend error message.
        message: String,
    },
}

impl RenderError {
    fn drawing(path: &Path, source: &DrawingAreaErrorKind<io::Error>) -> Self {
        Self::Drawing {
            path: path.to_path_buf(),
            message: source.to_string(),
        }
    }
}

/// Draws graphs as SVG files named `graph_<name>.svg` in one directory.
#[derive(Clone, Debug)]
pub struct SvgGraphRenderer {
    dir: PathBuf,
    size: (u32, u32),
}

impl SvgGraphRenderer {
    /// Creates a renderer writing into `dir`, which must exist.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            size: GRAPH_SIZE,
        }
    }

    /// Overrides the image size in pixels.
    #[must_use]
    pub const fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    /// Path the drawing of `name` is written to.
    #[must_use]
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("graph_{}.svg", file_safe(name)))
    }
}

impl PlotRenderer for SvgGraphRenderer {
    type Error = RenderError;

    #[instrument(name = "cli.render_graph", err, skip(self, graph, layout), fields(nodes = graph.node_count()))]
    fn render(&self, name: &str, graph: &Graph, layout: &Layout) -> Result<PathBuf, Self::Error> {
        let bounds = layout
            .bounds()
            .ok_or_else(|| RenderError::EmptyLayout {
                name: name.to_owned(),
            })?
            .padded(PADDING);
        let path = self.path_for(name);
        draw_graph(&path, self.size, name, graph, layout, bounds)
            .map_err(|source| RenderError::drawing(&path, &source))?;
        debug!(path = %path.display(), "graph drawn");
        Ok(path)
    }
}

fn draw_graph(
    path: &Path,
    size: (u32, u32),
    caption: &str,
    graph: &Graph,
    layout: &Layout,
    bounds: Bounds,
) -> DrawResult {
    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 20))
        .margin(10)
        .build_cartesian_2d(bounds.min_x..bounds.max_x, bounds.min_y..bounds.max_y)?;

    chart.draw_series(graph.edges().iter().filter_map(|edge| {
        let a = layout.position(edge.source())?;
        let b = layout.position(edge.target())?;
        Some(PathElement::new(
            vec![(a.x, a.y), (b.x, b.y)],
            BLACK.mix(0.6).stroke_width(1),
        ))
    }))?;
    chart.draw_series(
        layout
            .positions()
            .iter()
            .map(|point| Circle::new((point.x, point.y), 3, BLUE.filled())),
    )?;
    root.present()
}

/// One measured quantity charted against `p`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SweepMetric {
    /// Harmonic effective resistance proxy.
    TotalEffectiveResistance,
    /// Mean all-pairs shortest path length.
    AverageShortestPath,
    /// Mean edge weight.
    AverageEdgeLength,
    /// Share of nodes in the largest component.
    PercolationOrderParameter,
}

impl SweepMetric {
    /// Every charted metric, in panel order.
    pub const ALL: [Self; 4] = [
        Self::TotalEffectiveResistance,
        Self::AverageShortestPath,
        Self::AverageEdgeLength,
        Self::PercolationOrderParameter,
    ];

    /// Axis and panel label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::TotalEffectiveResistance => "total effective resistance",
            Self::AverageShortestPath => "average shortest path",
            Self::AverageEdgeLength => "average edge length",
            Self::PercolationOrderParameter => "percolation order parameter",
        }
    }

    /// Reads the metric from a trial.
    #[must_use]
    pub const fn value(self, trial: &TrialResult) -> f64 {
        match self {
            Self::TotalEffectiveResistance => trial.total_effective_resistance,
            Self::AverageShortestPath => trial.average_shortest_path,
            Self::AverageEdgeLength => trial.average_edge_length,
            Self::PercolationOrderParameter => trial.percolation_order_parameter,
        }
    }
}

/// Draws a 2×2 chart of every [`SweepMetric`] against `p`, one series per
/// iteration, and writes it to `path`.
///
/// # Errors
/// Returns [`RenderError::NoResults`] when no trial succeeded and
/// [`RenderError::Drawing`] when the SVG cannot be written.
#[instrument(name = "cli.render_sweep_chart", err, skip(report), fields(path = %path.display()))]
pub fn render_sweep_chart(report: &SweepReport, path: &Path) -> Result<PathBuf, RenderError> {
    if report.success_count() == 0 {
        return Err(RenderError::NoResults);
    }
    draw_sweep_chart(report, path).map_err(|source| RenderError::drawing(path, &source))?;
    Ok(path.to_path_buf())
}

fn draw_sweep_chart(report: &SweepReport, path: &Path) -> DrawResult {
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((2, 2));
    let iterations: BTreeSet<usize> = report.results().map(|trial| trial.iteration).collect();
    for (panel, metric) in panels.iter().zip(SweepMetric::ALL) {
        draw_metric_panel(panel, report, &iterations, metric)?;
    }
    root.present()
}

fn draw_metric_panel(
    panel: &DrawingArea<SVGBackend<'_>, Shift>,
    report: &SweepReport,
    iterations: &BTreeSet<usize>,
    metric: SweepMetric,
) -> DrawResult {
    let (x_range, y_range) = metric_ranges(report, metric);
    let mut chart = ChartBuilder::on(panel)
        .caption(format!("{} vs p", metric.label()), ("sans-serif", 18))
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)?;
    chart
        .configure_mesh()
        .x_desc("p")
        .y_desc(metric.label())
        .draw()?;

    for &iteration in iterations {
        let color = Palette99::pick(iteration);
        let points: Vec<(f64, f64)> = report
            .results_for_iteration(iteration)
            .map(|trial| (trial.p, metric.value(trial)))
            .collect();
        chart.draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(1)))?;
        chart.draw_series(
            points
                .iter()
                .map(|&point| Circle::new(point, 2, color.filled())),
        )?;
    }
    Ok(())
}

fn metric_ranges(report: &SweepReport, metric: SweepMetric) -> (Range<f64>, Range<f64>) {
    let bounds = report
        .results()
        .fold(None::<Bounds>, |bounds, trial| {
            let (x, y) = (trial.p, metric.value(trial));
            Some(match bounds {
                None => Bounds {
                    min_x: x,
                    max_x: x,
                    min_y: y,
                    max_y: y,
                },
                Some(b) => Bounds {
                    min_x: b.min_x.min(x),
                    max_x: b.max_x.max(x),
                    min_y: b.min_y.min(y),
                    max_y: b.max_y.max(y),
                },
            })
        })
        .map_or(
            Bounds {
                min_x: 0.0,
                max_x: 1.0,
                min_y: 0.0,
                max_y: 1.0,
            },
            |bounds| bounds.padded(PADDING),
        );
    (bounds.min_x..bounds.max_x, bounds.min_y..bounds.max_y)
}

/// Replaces characters that are unsafe in file names.
fn file_safe(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
