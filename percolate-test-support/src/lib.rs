//! Shared test utilities used across percolate crates.

pub mod profile;
pub mod recording;
