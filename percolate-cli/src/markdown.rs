//! Markdown document sink for analysis reports.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use percolate_core::{ReportEntry, ReportSink};
use thiserror::Error;
use tracing::info;

/// Errors raised while writing a report document.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The document could not be written.
    #[error("failed to write report `{path}`: {source}")]
    Write {
        /// Destination of the document.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
}

/// Collects report entries and writes them as one Markdown document.
///
/// Each entry becomes a second-level section: its heading, an optional image
/// and one paragraph per line of text. Image links are written relative to
/// the document's directory when possible.
///
/// # Examples
/// ```
/// use percolate_cli::markdown::MarkdownReport;
/// use percolate_core::{ReportEntry, ReportSink};
///
/// let dir = tempfile::tempdir()?;
/// let mut report = MarkdownReport::new(dir.path().join("report.md"), "Graph Analysis");
/// report.record(&ReportEntry::new("Sheet: roads").with_paragraph("Number of nodes: 4"))?;
/// let path = report.finish()?;
/// let text = std::fs::read_to_string(path)?;
/// assert!(text.starts_with("# Graph Analysis"));
/// assert!(text.contains("## Sheet: roads"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct MarkdownReport {
    path: PathBuf,
    title: String,
    body: String,
    sections: usize,
}

impl MarkdownReport {
    /// Creates an empty report that [`ReportSink::finish`] writes to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, title: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
            body: String::new(),
            sections: 0,
        }
    }

    /// Number of recorded sections.
    #[must_use]
    #[rustfmt::skip]
    pub const fn sections(&self) -> usize { self.sections }

    fn image_link<'a>(&self, image: &'a Path) -> &'a Path {
        self.path
            .parent()
            .and_then(|dir| image.strip_prefix(dir).ok())
            .unwrap_or(image)
    }
}

impl ReportSink for MarkdownReport {
    type Error = ReportError;

    fn record(&mut self, entry: &ReportEntry) -> Result<(), Self::Error> {
        self.body.push_str(&format!("## {}\n\n", entry.heading));
        if let Some(image) = &entry.image {
            let link = self.image_link(image).display().to_string();
            self.body
                .push_str(&format!("![{}]({})\n\n", entry.heading, link));
        }
        for paragraph in &entry.paragraphs {
            self.body.push_str(paragraph);
            self.body.push_str("\n\n");
        }
        self.sections += 1;
        Ok(())
    }

    fn finish(self) -> Result<PathBuf, Self::Error> {
        let document = format!("# {}\n\n{}", self.title, self.body);
        fs::write(&self.path, document).map_err(|source| ReportError::Write {
            path: self.path.clone(),
            source,
        })?;
        info!(path = %self.path.display(), sections = self.sections, "report written");
        Ok(self.path)
    }
}
