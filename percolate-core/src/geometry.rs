//! Point generation and Delaunay triangulation.
//!
//! Synthetic trials draw a random point set inside a square and triangulate
//! it; the triangle sides become the edges of a planar proximity graph.

use rand::Rng;
use spade::{DelaunayTriangulation, HasPosition, Point2, Triangulation};
use tracing::{debug, instrument};

use crate::error::GeometryError;

/// Side length of the default sampling square.
pub const DEFAULT_SCALE: f64 = 1200.0;

/// A point in the plane.
///
/// # Examples
/// ```
/// use percolate_core::Point;
///
/// let origin = Point::new(0.0, 0.0);
/// assert_eq!(origin.distance(Point::new(3.0, 4.0)), 5.0);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Creates a point from its coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Returns `true` when both coordinates are finite.
    #[must_use]
    pub const fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// Draws a node count uniformly from `[min_count, max_count]`, then that many
/// points uniformly from `[0, scale) × [0, scale)`.
///
/// # Errors
/// Returns [`GeometryError::InvalidNodeRange`] when `min_count > max_count`
/// and [`GeometryError::InvalidScale`] when `scale` is not finite and positive.
///
/// # Examples
/// ```
/// use percolate_core::generate_points;
/// use rand::{SeedableRng, rngs::SmallRng};
///
/// let mut rng = SmallRng::seed_from_u64(7);
/// let points = generate_points(10, 20, 100.0, &mut rng)?;
/// assert!((10..=20).contains(&points.len()));
/// assert!(points.iter().all(|p| (0.0..100.0).contains(&p.x) && (0.0..100.0).contains(&p.y)));
/// # Ok::<(), percolate_core::GeometryError>(())
/// ```
pub fn generate_points<R: Rng + ?Sized>(
    min_count: usize,
    max_count: usize,
    scale: f64,
    rng: &mut R,
) -> Result<Vec<Point>, GeometryError> {
    validate_node_range(min_count, max_count)?;
    validate_scale(scale)?;
    let count = rng.gen_range(min_count..=max_count);
    let points = (0..count)
        .map(|_| {
            let x = rng.r#gen::<f64>() * scale;
            let y = rng.r#gen::<f64>() * scale;
            Point::new(x, y)
        })
        .collect();
    Ok(points)
}

pub(crate) const fn validate_node_range(min: usize, max: usize) -> Result<(), GeometryError> {
    if min > max {
        return Err(GeometryError::InvalidNodeRange { min, max });
    }
    Ok(())
}

pub(crate) fn validate_scale(scale: f64) -> Result<(), GeometryError> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(GeometryError::InvalidScale { scale });
    }
    Ok(())
}

#[derive(Clone, Copy, Debug)]
struct Site {
    index: usize,
    position: Point2<f64>,
}

impl HasPosition for Site {
    type Scalar = f64;

    fn position(&self) -> Point2<f64> {
        self.position
    }
}

/// Computes the Delaunay triangulation of `points`.
///
/// Each triangle is returned as three indices into `points`. A point that
/// coincides with an earlier one is not inserted and so appears in no
/// triangle.
///
/// # Errors
/// Returns [`GeometryError::TooFewPoints`] for fewer than three points,
/// [`GeometryError::InvalidCoordinate`] for coordinates that cannot be
/// triangulated (NaN, infinite or out of range), and
/// [`GeometryError::Collinear`] when no triangle can be formed.
///
/// # Examples
/// ```
/// use percolate_core::{Point, triangulate};
///
/// let square = [
///     Point::new(0.0, 0.0),
///     Point::new(0.0, 1.0),
///     Point::new(1.0, 0.0),
///     Point::new(1.0, 1.0),
/// ];
/// let triangles = triangulate(&square)?;
/// assert_eq!(triangles.len(), 2);
/// # Ok::<(), percolate_core::GeometryError>(())
/// ```
#[instrument(name = "core.triangulate", err, skip(points), fields(points = points.len()))]
pub fn triangulate(points: &[Point]) -> Result<Vec<[usize; 3]>, GeometryError> {
    if points.len() < 3 {
        return Err(GeometryError::TooFewPoints {
            count: points.len(),
        });
    }

    let mut triangulation: DelaunayTriangulation<Site> = DelaunayTriangulation::new();
    for (index, point) in points.iter().enumerate() {
        let position = Point2::new(point.x, point.y);
        let invalid = || GeometryError::InvalidCoordinate {
            index,
            x: point.x,
            y: point.y,
        };
        if !point.is_finite() {
            return Err(invalid());
        }
        if triangulation.locate_vertex(position).is_some() {
            debug!(index, "skipping coincident point");
            continue;
        }
        triangulation
            .insert(Site { index, position })
            .map_err(|_| invalid())?;
    }

    let triangles: Vec<[usize; 3]> = triangulation
        .inner_faces()
        .map(|face| face.vertices().map(|vertex| vertex.data().index))
        .collect();
    if triangles.is_empty() {
        return Err(GeometryError::Collinear {
            count: points.len(),
        });
    }
    debug!(triangles = triangles.len(), "triangulation complete");
    Ok(triangles)
}

/// Source of point sets for sweep trials.
///
/// The sweep calls [`PointSampler::sample`] once per trial with that trial's
/// private random source.
pub trait PointSampler {
    /// Draws the point set for one trial of `iteration`.
    ///
    /// # Errors
    /// Returns a [`GeometryError`] when no valid point set can be produced.
    fn sample<R: Rng + ?Sized>(
        &self,
        iteration: usize,
        rng: &mut R,
    ) -> Result<Vec<Point>, GeometryError>;
}

/// Uniform point sets with a random size, as drawn by [`generate_points`].
///
/// # Examples
/// ```
/// use percolate_core::{PointSampler, UniformPoints};
/// use rand::{SeedableRng, rngs::SmallRng};
///
/// let sampler = UniformPoints::new(5, 5, 10.0)?;
/// let points = sampler.sample(0, &mut SmallRng::seed_from_u64(1))?;
/// assert_eq!(points.len(), 5);
/// # Ok::<(), percolate_core::GeometryError>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UniformPoints {
    min_count: usize,
    max_count: usize,
    scale: f64,
}

impl UniformPoints {
    /// Creates a validated sampler.
    ///
    /// # Errors
    /// Returns [`GeometryError::InvalidNodeRange`] or
    /// [`GeometryError::InvalidScale`] for unusable parameters.
    pub fn new(min_count: usize, max_count: usize, scale: f64) -> Result<Self, GeometryError> {
        validate_node_range(min_count, max_count)?;
        validate_scale(scale)?;
        Ok(Self {
            min_count,
            max_count,
            scale,
        })
    }

    /// Smallest node count drawn.
    #[must_use]
    #[rustfmt::skip]
    pub const fn min_count(&self) -> usize { self.min_count }

    /// Largest node count drawn.
    #[must_use]
    #[rustfmt::skip]
    pub const fn max_count(&self) -> usize { self.max_count }

    /// Side length of the sampling square.
    #[must_use]
    #[rustfmt::skip]
    pub const fn scale(&self) -> f64 { self.scale }
}

impl PointSampler for UniformPoints {
    fn sample<R: Rng + ?Sized>(
        &self,
        _iteration: usize,
        rng: &mut R,
    ) -> Result<Vec<Point>, GeometryError> {
        generate_points(self.min_count, self.max_count, self.scale, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::{SeedableRng, rngs::SmallRng};
    use rstest::rstest;

    fn unit_square() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
        ]
    }

    #[test]
    fn generate_points_is_reproducible() {
        let first = generate_points(20, 40, DEFAULT_SCALE, &mut SmallRng::seed_from_u64(11))
            .expect("valid parameters");
        let second = generate_points(20, 40, DEFAULT_SCALE, &mut SmallRng::seed_from_u64(11))
            .expect("valid parameters");
        assert_eq!(first, second);
    }

    #[test]
    fn generate_points_honours_fixed_count() {
        let points = generate_points(8, 8, 1.0, &mut SmallRng::seed_from_u64(3))
            .expect("valid parameters");
        assert_eq!(points.len(), 8);
    }

    #[rstest]
    #[case(5, 4, 1.0, GeometryError::InvalidNodeRange { min: 5, max: 4 })]
    #[case(1, 4, 0.0, GeometryError::InvalidScale { scale: 0.0 })]
    #[case(1, 4, -3.0, GeometryError::InvalidScale { scale: -3.0 })]
    fn generate_points_rejects_invalid_parameters(
        #[case] min: usize,
        #[case] max: usize,
        #[case] scale: f64,
        #[case] expected: GeometryError,
    ) {
        let err = generate_points(min, max, scale, &mut SmallRng::seed_from_u64(0))
            .expect_err("parameters must be rejected");
        assert_eq!(err, expected);
    }

    #[test]
    fn generate_points_rejects_nan_scale() {
        let err = generate_points(1, 2, f64::NAN, &mut SmallRng::seed_from_u64(0))
            .expect_err("NaN scale must be rejected");
        assert!(matches!(err, GeometryError::InvalidScale { .. }));
    }

    #[test]
    fn triangulate_unit_square_yields_two_triangles() {
        let triangles = triangulate(&unit_square()).expect("square triangulates");
        assert_eq!(triangles.len(), 2);
        for triangle in &triangles {
            let mut sorted = *triangle;
            sorted.sort_unstable();
            assert!(sorted.windows(2).all(|pair| pair[0] < pair[1]));
            assert!(sorted.iter().all(|&index| index < 4));
        }
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(2)]
    fn triangulate_rejects_too_few_points(#[case] count: usize) {
        let points = unit_square().into_iter().take(count).collect::<Vec<_>>();
        let err = triangulate(&points).expect_err("too few points");
        assert_eq!(err, GeometryError::TooFewPoints { count });
    }

    #[test]
    fn triangulate_rejects_collinear_points() {
        let line = (0..5)
            .map(|i| Point::new(f64::from(i), 2.0 * f64::from(i)))
            .collect::<Vec<_>>();
        let err = triangulate(&line).expect_err("collinear input");
        assert_eq!(err, GeometryError::Collinear { count: 5 });
    }

    #[test]
    fn triangulate_rejects_non_finite_coordinates() {
        let mut points = unit_square();
        points[2] = Point::new(f64::NAN, 0.5);
        let err = triangulate(&points).expect_err("NaN coordinate");
        assert!(matches!(err, GeometryError::InvalidCoordinate { index: 2, .. }));
    }

    #[test]
    fn triangulate_skips_coincident_points() {
        let mut points = unit_square();
        points.push(Point::new(1.0, 1.0));
        let triangles = triangulate(&points).expect("duplicates are tolerated");
        assert_eq!(triangles.len(), 2);
        assert!(triangles.iter().flatten().all(|&index| index != 4));
    }

    #[test]
    fn uniform_points_validates_on_construction() {
        assert!(UniformPoints::new(3, 2, 1.0).is_err());
        let sampler = UniformPoints::new(3, 6, 2.0).expect("valid sampler");
        assert_eq!(sampler.min_count(), 3);
        assert_eq!(sampler.max_count(), 6);
        assert_eq!(sampler.scale(), 2.0);
    }
}
