use percolate_core::{
    CoordinatePair, CoordinateSource, DataSourceError, GeometryError, Point, PointSampler,
    UniformPoints,
};
use rand::Rng;

/// In-memory coordinate table.
#[derive(Clone)]
pub struct Rows {
    pairs: Vec<CoordinatePair>,
}

impl Rows {
    #[must_use]
    pub fn new(pairs: Vec<CoordinatePair>) -> Self {
        Self { pairs }
    }
}

impl CoordinateSource for Rows {
    fn name(&self) -> &str {
        "rows"
    }

    fn len(&self) -> usize {
        self.pairs.len()
    }

    fn pair(&self, index: usize) -> Result<CoordinatePair, DataSourceError> {
        self.pairs
            .get(index)
            .copied()
            .ok_or(DataSourceError::OutOfBounds { index })
    }
}

/// Uniform sampler that returns only two points for one chosen iteration.
pub struct FaultySampler {
    inner: UniformPoints,
    bad_iteration: usize,
}

impl FaultySampler {
    #[must_use]
    pub fn new(bad_iteration: usize) -> Self {
        Self {
            inner: UniformPoints::new(30, 40, 1200.0).expect("valid sampler"),
            bad_iteration,
        }
    }
}

impl PointSampler for FaultySampler {
    fn sample<R: Rng + ?Sized>(
        &self,
        iteration: usize,
        rng: &mut R,
    ) -> Result<Vec<Point>, GeometryError> {
        let mut points = self.inner.sample(iteration, rng)?;
        if iteration == self.bad_iteration {
            points.truncate(2);
        }
        Ok(points)
    }
}

/// The unit square's corners.
#[must_use]
pub fn unit_square() -> Vec<Point> {
    vec![
        Point::new(0.0, 0.0),
        Point::new(0.0, 1.0),
        Point::new(1.0, 0.0),
        Point::new(1.0, 1.0),
    ]
}
