//! Benchmark support crate for percolate.
//!
//! Provides seeded synthetic graphs and parameter labels used by the
//! Criterion benchmarks for shortest paths, edge removal and full sweeps.

pub mod error;
pub mod params;
pub mod source;
