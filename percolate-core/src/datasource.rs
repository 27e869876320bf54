//! Tabular coordinate input for empirical graphs.

use crate::{error::DataSourceError, geometry::Point};

/// One input row `(x1, y1, x2, y2)`: an edge between two digitized points.
///
/// # Examples
/// ```
/// use percolate_core::{CoordinatePair, Point};
///
/// let pair = CoordinatePair::new(0.0, 0.0, 3.0, 4.0);
/// assert_eq!(pair.from(), Point::new(0.0, 0.0));
/// assert_eq!(pair.length(), 5.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoordinatePair {
    from: Point,
    to: Point,
}

impl CoordinatePair {
    /// Creates a pair from the four row values.
    #[must_use]
    pub const fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            from: Point::new(x1, y1),
            to: Point::new(x2, y2),
        }
    }

    /// First endpoint.
    #[must_use]
    #[rustfmt::skip]
    pub const fn from(&self) -> Point { self.from }

    /// Second endpoint.
    #[must_use]
    #[rustfmt::skip]
    pub const fn to(&self) -> Point { self.to }

    /// Euclidean distance between the endpoints.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.from.distance(self.to)
    }

    /// Returns `true` when all four values are finite.
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        self.from.is_finite() && self.to.is_finite()
    }
}

/// Abstraction over a named table of coordinate pairs.
///
/// The name identifies the dataset (a sheet or file) in logs and reports.
///
/// # Examples
/// ```
/// use percolate_core::{CoordinatePair, CoordinateSource, DataSourceError};
///
/// struct Rows(Vec<CoordinatePair>);
///
/// impl CoordinateSource for Rows {
///     fn name(&self) -> &str { "rows" }
///     fn len(&self) -> usize { self.0.len() }
///     fn pair(&self, index: usize) -> Result<CoordinatePair, DataSourceError> {
///         self.0.get(index).copied().ok_or(DataSourceError::OutOfBounds { index })
///     }
/// }
///
/// let rows = Rows(vec![CoordinatePair::new(0.0, 0.0, 1.0, 0.0)]);
/// assert_eq!(rows.pairs()?.len(), 1);
/// assert!(matches!(rows.pair(4), Err(DataSourceError::OutOfBounds { index: 4 })));
/// # Ok::<(), DataSourceError>(())
/// ```
pub trait CoordinateSource {
    /// Returns a human-readable dataset name.
    fn name(&self) -> &str;

    /// Returns the number of rows.
    fn len(&self) -> usize;

    /// Returns whether the source has no rows.
    #[must_use]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the row at `index`.
    ///
    /// # Errors
    /// Implementations must return [`DataSourceError::OutOfBounds`] for
    /// indices `>= len()`.
    fn pair(&self, index: usize) -> Result<CoordinatePair, DataSourceError>;

    /// Collects every row in order.
    ///
    /// # Errors
    /// Propagates the first error returned by [`CoordinateSource::pair`].
    fn pairs(&self) -> Result<Vec<CoordinatePair>, DataSourceError> {
        (0..self.len()).map(|index| self.pair(index)).collect()
    }
}
