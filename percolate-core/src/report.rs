//! Reporting seams: plain report entries, a plot layout, and the traits the
//! output layer implements.
//!
//! Nothing here touches the filesystem. Callers hand [`ReportEntry`] values
//! to a [`ReportSink`] and graphs to a [`PlotRenderer`].

use std::path::{Path, PathBuf};

use crate::{
    geometry::Point,
    graph::Graph,
    metrics::GraphMetrics,
    percolation::RemovalComparison,
    sweep::TrialResult,
};

/// One section of a report: a heading, an optional figure and text lines.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReportEntry {
    /// Section heading.
    pub heading: String,
    /// Figure shown under the heading.
    pub image: Option<PathBuf>,
    /// Text lines, one paragraph each.
    pub paragraphs: Vec<String>,
}

impl ReportEntry {
    /// Creates an entry with a heading and nothing else.
    #[must_use]
    pub fn new(heading: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            ..Self::default()
        }
    }

    /// Attaches a figure.
    #[must_use]
    pub fn with_image(mut self, image: impl AsRef<Path>) -> Self {
        self.image = Some(image.as_ref().to_path_buf());
        self
    }

    /// Appends a paragraph.
    #[must_use]
    pub fn with_paragraph(mut self, paragraph: impl Into<String>) -> Self {
        self.paragraphs.push(paragraph.into());
        self
    }

    /// Section describing one sweep trial.
    ///
    /// # Examples
    /// ```
    /// use percolate_core::{ReportEntry, run_sweep};
    ///
    /// let report = run_sweep(1, &[0.0], (20, 20), 1)?;
    /// let trial = report.results().next().expect("one trial");
    /// let entry = ReportEntry::for_trial(trial);
    /// assert!(entry.heading.starts_with("Graph with"));
    /// assert_eq!(entry.paragraphs.len(), 5);
    /// # Ok::<(), percolate_core::SweepError>(())
    /// ```
    #[must_use]
    pub fn for_trial(trial: &TrialResult) -> Self {
        Self::new(format!(
            "Graph with {} nodes (iteration {}, p = {})",
            trial.component_nodes, trial.iteration, trial.p
        ))
        .with_paragraph(format!("Number of nodes: {}", trial.component_nodes))
        .with_paragraph(format!(
            "Average shortest path: {}",
            trial.average_shortest_path
        ))
        .with_paragraph(format!("Average edge length: {}", trial.average_edge_length))
        .with_paragraph(format!(
            "Total effective resistance: {}",
            trial.total_effective_resistance
        ))
        .with_paragraph(format!(
            "Percolation order parameter: {}",
            trial.percolation_order_parameter
        ))
    }

    /// Section describing an empirical dataset and, when available, its
    /// edge removal comparison.
    #[must_use]
    pub fn for_dataset(
        name: &str,
        metrics: &GraphMetrics,
        comparison: Option<&RemovalComparison>,
    ) -> Self {
        let entry = Self::new(format!("Dataset: {name}"))
            .with_paragraph(format!("Number of nodes: {}", metrics.node_count))
            .with_paragraph(format!(
                "Average shortest path: {}",
                metrics.average_shortest_path
            ))
            .with_paragraph(format!("Average edge length: {}", metrics.average_edge_length))
            .with_paragraph(format!(
                "Total effective resistance: {}",
                metrics.total_effective_resistance
            ));
        match comparison {
            Some(comparison) => entry
                .with_paragraph(format!(
                    "Edges before/after removal: {} / {}",
                    comparison.edges_before, comparison.edges_after
                ))
                .with_paragraph(format!(
                    "Connected components before/after removal: {} / {}",
                    comparison.components_before, comparison.components_after
                ))
                .with_paragraph(format!(
                    "Percolation threshold: {}",
                    comparison.largest_ratio()
                )),
            None => entry,
        }
    }
}

/// Destination for report entries, such as a document writer.
pub trait ReportSink {
    /// Error raised while writing.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Appends an entry.
    ///
    /// # Errors
    /// Implementations return their own error when the entry cannot be
    /// recorded.
    fn record(&mut self, entry: &ReportEntry) -> Result<(), Self::Error>;

    /// Flushes and closes the sink, returning where the report was written.
    ///
    /// # Errors
    /// Implementations return their own error when the report cannot be
    /// completed.
    fn finish(self) -> Result<PathBuf, Self::Error>;
}

/// Axis-aligned bounding box of a layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    /// Smallest horizontal coordinate.
    pub min_x: f64,
    /// Largest horizontal coordinate.
    pub max_x: f64,
    /// Smallest vertical coordinate.
    pub min_y: f64,
    /// Largest vertical coordinate.
    pub max_y: f64,
}

impl Bounds {
    /// Returns bounds grown by `fraction` of each side, with a unit span on
    /// axes that have none.
    #[must_use]
    pub fn padded(&self, fraction: f64) -> Self {
        let pad = |low: f64, high: f64| {
            let span = high - low;
            if span > 0.0 {
                (low - span * fraction, high + span * fraction)
            } else {
                (low - 0.5, high + 0.5)
            }
        };
        let (min_x, max_x) = pad(self.min_x, self.max_x);
        let (min_y, max_y) = pad(self.min_y, self.max_y);
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }
}

/// Drawing position for every node of a graph.
///
/// # Examples
/// ```
/// use percolate_core::{GraphBuilder, Layout, Point};
///
/// let graph = GraphBuilder::new(vec![Point::new(1.0, 5.0), Point::new(-2.0, 3.0)]).build();
/// let layout = Layout::from_positions(&graph);
/// let bounds = layout.bounds().expect("two nodes");
/// assert_eq!((bounds.min_x, bounds.max_x), (-2.0, 1.0));
/// assert_eq!((bounds.min_y, bounds.max_y), (3.0, 5.0));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    positions: Vec<Point>,
}

impl Layout {
    /// Places every node at its own coordinates.
    #[must_use]
    pub fn from_positions(graph: &Graph) -> Self {
        Self {
            positions: graph.nodes().iter().map(|node| node.position()).collect(),
        }
    }

    /// Position of node `index`.
    #[must_use]
    pub fn position(&self, index: usize) -> Option<Point> {
        self.positions.get(index).copied()
    }

    /// Positions in node order.
    #[must_use]
    #[rustfmt::skip]
    pub fn positions(&self) -> &[Point] { &self.positions }

    /// Bounding box of all positions, `None` for an empty layout.
    #[must_use]
    pub fn bounds(&self) -> Option<Bounds> {
        let first = self.positions.first()?;
        let start = Bounds {
            min_x: first.x,
            max_x: first.x,
            min_y: first.y,
            max_y: first.y,
        };
        Some(self.positions.iter().fold(start, |bounds, point| Bounds {
            min_x: bounds.min_x.min(point.x),
            max_x: bounds.max_x.max(point.x),
            min_y: bounds.min_y.min(point.y),
            max_y: bounds.max_y.max(point.y),
        }))
    }
}

/// Renders a graph drawing to an image.
pub trait PlotRenderer {
    /// Error raised while rendering.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Draws `graph` using `layout` and returns the written image path.
    ///
    /// # Errors
    /// Implementations return their own error when the image cannot be
    /// produced.
    fn render(&self, name: &str, graph: &Graph, layout: &Layout) -> Result<PathBuf, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::graph::GraphBuilder;

    #[test]
    fn entry_builder_collects_parts() {
        let entry = ReportEntry::new("Heading")
            .with_image("graph.svg")
            .with_paragraph("one")
            .with_paragraph("two");
        assert_eq!(entry.heading, "Heading");
        assert_eq!(entry.image.as_deref(), Some(Path::new("graph.svg")));
        assert_eq!(entry.paragraphs, vec!["one", "two"]);
    }

    #[test]
    fn dataset_entry_includes_threshold_only_with_comparison() {
        let metrics = GraphMetrics {
            node_count: 10,
            edge_count: 12,
            total_effective_resistance: 4.0,
            average_shortest_path: 2.5,
            average_edge_length: 1.5,
        };
        let bare = ReportEntry::for_dataset("img1", &metrics, None);
        assert_eq!(bare.heading, "Dataset: img1");
        assert_eq!(bare.paragraphs.len(), 4);

        let comparison = RemovalComparison {
            edges_before: 20,
            edges_after: 2,
            components_before: 1,
            components_after: 8,
            largest_before: 10,
            largest_after: 3,
        };
        let full = ReportEntry::for_dataset("img1", &metrics, Some(&comparison));
        assert_eq!(full.paragraphs.len(), 7);
        assert_eq!(
            full.paragraphs.last().map(String::as_str),
            Some("Percolation threshold: 0.3")
        );
    }

    #[test]
    fn empty_layout_has_no_bounds() {
        let graph = GraphBuilder::new(Vec::new()).build();
        assert_eq!(Layout::from_positions(&graph).bounds(), None);
    }

    #[test]
    fn padding_handles_degenerate_axes() {
        let bounds = Bounds {
            min_x: 0.0,
            max_x: 10.0,
            min_y: 2.0,
            max_y: 2.0,
        }
        .padded(0.1);
        assert_eq!((bounds.min_x, bounds.max_x), (-1.0, 11.0));
        assert_eq!((bounds.min_y, bounds.max_y), (1.5, 2.5));
    }
}
