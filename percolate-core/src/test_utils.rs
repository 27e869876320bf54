//! Shared test utilities for `percolate-core`.

use percolate_test_support::profile::ProptestRunProfile;
use proptest::{prelude::*, test_runner::Config as ProptestConfig};

use crate::geometry::Point;

/// Builds a proptest configuration from the shared run profile, so every
/// property suite honours `PROPTEST_CASES` and `PERCOLATE_PBT_FORK`.
#[must_use]
pub(crate) fn suite_proptest_config(default_cases: u32) -> ProptestConfig {
    let profile = ProptestRunProfile::load(default_cases, false);
    ProptestConfig {
        cases: profile.cases(),
        fork: profile.fork(),
        ..ProptestConfig::default()
    }
}

/// Point sets of `min..=max` points on an integer lattice inside
/// `[0, 100)²`. Duplicates are possible.
pub(crate) fn lattice_points(min: usize, max: usize) -> impl Strategy<Value = Vec<Point>> {
    prop::collection::vec((0_u8..100, 0_u8..100), min..=max).prop_map(|coords| {
        coords
            .into_iter()
            .map(|(x, y)| Point::new(f64::from(x), f64::from(y)))
            .collect()
    })
}
